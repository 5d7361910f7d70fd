use crate::config::RegistryConfig;
use crate::registry::InMemoryScopeRegistry;

/// Two websites: `base` (id 1) with store `default` (1), and `eu` (id 2) with
/// stores `en` (5, the website default) and `de` (6).
pub fn multi_store_registry() -> InMemoryScopeRegistry {
    let config: RegistryConfig = serde_yaml::from_str(
        r#"
default_website: base
websites:
    - {id: 1, code: base, default_store: default}
    - {id: 2, code: eu, default_store: en}
stores:
    - {id: 1, code: default, website: base}
    - {id: 5, code: en, website: eu}
    - {id: 6, code: de, website: eu}
"#,
    )
    .unwrap();
    InMemoryScopeRegistry::from_config(&config).unwrap()
}

/// Single-store mode with store `main` (3) on website `base` (1).
pub fn single_store_registry() -> InMemoryScopeRegistry {
    let config: RegistryConfig = serde_yaml::from_str(
        r#"
single_store_mode: true
websites:
    - {id: 1, code: base}
stores:
    - {id: 3, code: main, website: base}
"#,
    )
    .unwrap();
    InMemoryScopeRegistry::from_config(&config).unwrap()
}
