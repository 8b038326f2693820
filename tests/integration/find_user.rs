//! Primary search, cardinality rules and hydration.

use crate::common::fixtures::{self, ASMITH_DN, JDOE_DN};
use crate::common::{InMemoryDirectory, TestUser};
use ldap_user_manager::{Criteria, FieldValue, LdapError, LdapManager};

fn manager(directory: InMemoryDirectory) -> LdapManager<InMemoryDirectory, TestUser> {
    crate::common::init_logging();
    LdapManager::builder(directory, fixtures::people_config_without_relations())
        .factory(TestUser::default)
        .setters(TestUser::setters())
        .build()
        .expect("valid manager")
}

#[tokio::test]
async fn test_single_match_is_hydrated() {
    let directory =
        InMemoryDirectory::new().with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()]);
    let manager = manager(directory);

    let user = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(user.username, "jdoe");
    assert_eq!(user.email.as_deref(), Some("jdoe@example.com"));
    assert_eq!(
        user.names,
        Some(FieldValue::Multi(vec!["John Doe".to_string(), "Johnny Doe".to_string()]))
    );
    assert_eq!(user.dn.as_deref(), Some(JDOE_DN));
    assert_eq!(user.password.as_deref(), Some(""));
    assert!(user.enabled);
}

#[tokio::test]
async fn test_missing_attribute_leaves_field_untouched() {
    let directory = InMemoryDirectory::new()
        .with_response(fixtures::user_filter("asmith"), vec![fixtures::asmith()]);
    let manager = manager(directory);

    let user = manager.find_user_by_username("asmith").await.unwrap().unwrap();

    assert_eq!(user.email, None);
    assert_eq!(user.names, Some(FieldValue::Single("Alice Smith".to_string())));
    assert_eq!(user.dn.as_deref(), Some(ASMITH_DN));
}

#[tokio::test]
async fn test_no_match_is_none() {
    let manager = manager(InMemoryDirectory::new());

    let user = manager.find_user_by_username("nobody").await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_two_matches_are_ambiguous() {
    let directory = InMemoryDirectory::new().with_response(
        fixtures::user_filter("jdoe"),
        vec![fixtures::jdoe(), fixtures::asmith()],
    );
    let manager = manager(directory);

    let err = manager.find_user_by_username("jdoe").await.unwrap_err();
    match err {
        LdapError::AmbiguousResult { filter, count } => {
            assert_eq!(count, 2);
            assert_eq!(filter, fixtures::user_filter("jdoe"));
        }
        other => panic!("Expected AmbiguousResult, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_uses_configured_base_and_attributes() {
    let manager = manager(InMemoryDirectory::new());

    manager.find_user_by_username("jdoe").await.unwrap();

    let searches = manager.driver().searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].base_dn, "ou=people,dc=example,dc=com");
    assert_eq!(searches[0].filter, fixtures::user_filter("jdoe"));
    assert_eq!(searches[0].attributes, vec!["uid", "mail", "cn"]);
}

#[tokio::test]
async fn test_username_is_escaped() {
    let manager = manager(InMemoryDirectory::new());

    manager.find_user_by_username("j*doe)(uid=*").await.unwrap();

    assert_eq!(
        manager.driver().filters(),
        vec![fixtures::user_filter(r"j\2adoe\29\28uid=\2a")]
    );
}

#[tokio::test]
async fn test_find_by_arbitrary_criteria() {
    let filter = "(&(objectClass=inetOrgPerson)(mail=jdoe@example.com))";
    let directory = InMemoryDirectory::new().with_response(filter, vec![fixtures::jdoe()]);
    let manager = manager(directory);

    let user = manager
        .find_user_by(&Criteria::single("mail", "jdoe@example.com"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.username, "jdoe");
}

#[tokio::test]
async fn test_driver_failure_is_propagated() {
    let manager = manager(InMemoryDirectory::offline());

    let err = manager.find_user_by_username("jdoe").await.unwrap_err();
    assert!(err.is_driver_error());
    assert!(err.to_string().contains("directory unavailable"));
}

#[tokio::test]
async fn test_each_lookup_gets_a_fresh_user() {
    let directory =
        InMemoryDirectory::new().with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()]);
    let manager = manager(directory);

    let first = manager.find_user_by_username("jdoe").await.unwrap().unwrap();
    let second = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(first, second);
    assert!(first.roles.is_empty());
}
