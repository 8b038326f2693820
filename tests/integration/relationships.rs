//! Role and manages lookups by DN.

use crate::common::fixtures::{self, JDOE_DN};
use crate::common::{InMemoryDirectory, PlainUser, TestUser};
use ldap_user_manager::{DirectoryEntry, LdapManager};

fn manager(directory: InMemoryDirectory) -> LdapManager<InMemoryDirectory, TestUser> {
    crate::common::init_logging();
    LdapManager::builder(directory, fixtures::people_config())
        .factory(TestUser::default)
        .setters(TestUser::setters())
        .build()
        .expect("valid manager")
}

fn directory_with_groups() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()])
        .with_response(
            fixtures::role_filter(JDOE_DN),
            vec![fixtures::group("Admins"), fixtures::group("Staff")],
        )
}

#[tokio::test]
async fn test_roles_follow_search_order() {
    let manager = manager(directory_with_groups());

    let user = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(user.roles, vec!["ROLE_ADMINS", "ROLE_STAFF"]);
}

#[tokio::test]
async fn test_role_names_are_slugified() {
    let directory = InMemoryDirectory::new()
        .with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()])
        .with_response(
            fixtures::role_filter(JDOE_DN),
            vec![fixtures::group("Domain Admins"), fixtures::group("__ops--team__")],
        );
    let manager = manager(directory);

    let user = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(user.roles, vec!["ROLE_DOMAIN_ADMINS", "ROLE_OPS_TEAM"]);
}

#[tokio::test]
async fn test_lookups_run_in_order_with_entry_dn() {
    let manager = manager(directory_with_groups());

    manager.find_user_by_username("jdoe").await.unwrap();

    let searches = manager.driver().searches();
    assert_eq!(searches.len(), 3);
    assert_eq!(searches[1].base_dn, "ou=groups,dc=example,dc=com");
    assert_eq!(searches[1].filter, fixtures::role_filter(JDOE_DN));
    assert_eq!(searches[1].attributes, vec!["cn"]);
    assert_eq!(searches[2].base_dn, "ou=people,dc=example,dc=com");
    assert_eq!(searches[2].filter, fixtures::manages_filter(JDOE_DN));
    assert_eq!(searches[2].attributes, vec!["uid"]);
}

#[tokio::test]
async fn test_manages_list_is_set() {
    let directory = InMemoryDirectory::new()
        .with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()])
        .with_response(
            fixtures::manages_filter(JDOE_DN),
            vec![
                DirectoryEntry::new("uid=asmith,ou=people,dc=example,dc=com")
                    .with_attribute("uid", vec!["asmith"]),
                DirectoryEntry::new("uid=bjones,ou=people,dc=example,dc=com")
                    .with_attribute("uid", vec!["bjones"]),
            ],
        );
    let manager = manager(directory);

    let user = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(user.manages, vec!["asmith", "bjones"]);
    assert!(user.roles.is_empty());
}

#[tokio::test]
async fn test_no_relation_config_means_single_search() {
    let directory =
        InMemoryDirectory::new().with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()]);
    let manager = LdapManager::builder(directory, fixtures::people_config_without_relations())
        .factory(TestUser::default)
        .setters(TestUser::setters())
        .build()
        .unwrap();

    manager.find_user_by_username("jdoe").await.unwrap();

    assert_eq!(manager.driver().searches().len(), 1);
}

#[tokio::test]
async fn test_dn_with_metacharacters_is_escaped() {
    let dn = "cn=Doe\\, John (IT),ou=people,dc=example,dc=com";
    let escaped = r"cn=Doe\5c, John \28IT\29,ou=people,dc=example,dc=com";
    let directory = InMemoryDirectory::new()
        .with_response(
            fixtures::user_filter("jdoe"),
            vec![DirectoryEntry::new(dn).with_attribute("uid", vec!["jdoe"])],
        )
        .with_response(fixtures::role_filter(escaped), vec![fixtures::group("Staff")]);
    let manager = manager(directory);

    let user = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(user.roles, vec!["ROLE_STAFF"]);
    assert_eq!(user.dn.as_deref(), Some(dn));
}

#[tokio::test]
async fn test_user_without_capabilities_still_gets_roles() {
    let manager = LdapManager::builder(directory_with_groups(), fixtures::people_config())
        .factory(PlainUser::default)
        .field("setUsername", |user: &mut PlainUser, value| user.username = value.join(" "))
        .field("setEmail", |_: &mut PlainUser, _| {})
        .field("setNames", |_: &mut PlainUser, _| {})
        .build()
        .unwrap();

    let user = manager.find_user_by_username("jdoe").await.unwrap().unwrap();

    assert_eq!(user.username, "jdoe");
    assert_eq!(user.password.as_deref(), Some(""));
    assert_eq!(user.roles, vec!["ROLE_ADMINS", "ROLE_STAFF"]);
}

#[tokio::test]
async fn test_roles_for_username() {
    let manager = manager(directory_with_groups());

    let roles = manager.roles_for_username("jdoe").await.unwrap();
    assert_eq!(
        roles,
        Some(vec!["ROLE_ADMINS".to_string(), "ROLE_STAFF".to_string()])
    );

    let unknown = manager.roles_for_username("nobody").await.unwrap();
    assert_eq!(unknown, None);
}

#[tokio::test]
async fn test_roles_for_username_without_role_config() {
    let directory =
        InMemoryDirectory::new().with_response(fixtures::user_filter("jdoe"), vec![fixtures::jdoe()]);
    let manager = LdapManager::builder(directory, fixtures::people_config_without_relations())
        .factory(TestUser::default)
        .setters(TestUser::setters())
        .build()
        .unwrap();

    let roles = manager.roles_for_username("jdoe").await.unwrap();
    assert_eq!(roles, Some(Vec::new()));
}
