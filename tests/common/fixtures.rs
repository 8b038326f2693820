//! Fixtures for configuration and directory entries.

use ldap_user_manager::{DirectoryEntry, LdapConfig};
use serde_json::Value;
use std::path::PathBuf;

pub const JDOE_DN: &str = "uid=jdoe,ou=people,dc=example,dc=com";
pub const ASMITH_DN: &str = "uid=asmith,ou=people,dc=example,dc=com";

/// Load a JSON fixture from `tests/fixtures`.
pub fn load_fixture(path: &str) -> Value {
    let fixture_path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", path]
        .iter()
        .collect();
    let content = std::fs::read_to_string(&fixture_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", fixture_path.display()));

    serde_json::from_str(&content)
        .unwrap_or_else(|_| panic!("Failed to parse JSON fixture: {}", fixture_path.display()))
}

/// People configuration with role and manages lookups.
pub fn people_config() -> LdapConfig {
    serde_json::from_value(load_fixture("config/people.json")).expect("valid config fixture")
}

/// People configuration without any relationship lookup.
pub fn people_config_without_relations() -> LdapConfig {
    LdapConfig {
        role: None,
        manages: None,
        ..people_config()
    }
}

pub fn entry(name: &str) -> DirectoryEntry {
    serde_json::from_value(load_fixture(&format!("entries/{}.json", name)))
        .expect("valid entry fixture")
}

pub fn jdoe() -> DirectoryEntry {
    entry("jdoe")
}

pub fn asmith() -> DirectoryEntry {
    entry("asmith")
}

/// Primary search filter for `uid=<username>` under the people config.
pub fn user_filter(escaped_username: &str) -> String {
    format!("(&(objectClass=inetOrgPerson)(uid={}))", escaped_username)
}

/// Role search filter for a user DN under the people config.
pub fn role_filter(escaped_dn: &str) -> String {
    format!("(&(objectClass=groupOfNames)(member={}))", escaped_dn)
}

/// Manages search filter for a user DN under the people config.
pub fn manages_filter(escaped_dn: &str) -> String {
    format!("(&(manager={}))", escaped_dn)
}

pub fn group(name: &str) -> DirectoryEntry {
    DirectoryEntry::new(format!("cn={},ou=groups,dc=example,dc=com", name))
        .with_attribute("cn", vec![name])
}
