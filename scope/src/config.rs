use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Id 0 is reserved for the default scope")]
    ReservedId,

    #[error("Empty code")]
    EmptyCode,

    #[error("Duplicate website: {0}")]
    DuplicateWebsite(String),

    #[error("Duplicate store: {0}")]
    DuplicateStore(String),

    #[error("Store {store} references unknown website: {website}")]
    UnknownWebsite { store: String, website: String },

    #[error("Default store {store} of website {website} is not one of its stores")]
    InvalidDefaultStore { website: String, store: String },

    #[error("Unknown default website: {0}")]
    UnknownDefaultWebsite(String),
}

/// Websites and stores known to the in-memory registry.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RegistryConfig {
    /// Honored only while exactly one store is configured
    #[serde(default)]
    pub single_store_mode: bool,
    /// Code of the website whose default store is the default store view.
    /// Falls back to the website with the lowest id.
    pub default_website: Option<String>,
    #[serde(default)]
    pub websites: Vec<WebsiteConfig>,
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WebsiteConfig {
    pub id: u32,
    pub code: String,
    pub name: Option<String>,
    /// Store code
    pub default_store: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub id: u32,
    pub code: String,
    pub name: Option<String>,
    /// Website code
    pub website: String,
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut website_ids = HashSet::new();
        let mut website_codes = HashSet::new();
        for website in &self.websites {
            if website.id == 0 {
                return Err(ValidationError::ReservedId);
            }
            if website.code.is_empty() {
                return Err(ValidationError::EmptyCode);
            }
            if !website_ids.insert(website.id) || !website_codes.insert(website.code.as_str()) {
                return Err(ValidationError::DuplicateWebsite(website.code.clone()));
            }
        }

        let mut store_ids = HashSet::new();
        let mut store_codes = HashSet::new();
        for store in &self.stores {
            if store.id == 0 {
                return Err(ValidationError::ReservedId);
            }
            if store.code.is_empty() {
                return Err(ValidationError::EmptyCode);
            }
            if !store_ids.insert(store.id) || !store_codes.insert(store.code.as_str()) {
                return Err(ValidationError::DuplicateStore(store.code.clone()));
            }
            if !website_codes.contains(store.website.as_str()) {
                return Err(ValidationError::UnknownWebsite {
                    store: store.code.clone(),
                    website: store.website.clone(),
                });
            }
        }

        for website in &self.websites {
            if let Some(default_store) = &website.default_store
                && !self
                    .stores
                    .iter()
                    .any(|s| &s.code == default_store && s.website == website.code)
            {
                return Err(ValidationError::InvalidDefaultStore {
                    website: website.code.clone(),
                    store: default_store.clone(),
                });
            }
        }

        if let Some(default_website) = &self.default_website
            && !website_codes.contains(default_website.as_str())
        {
            return Err(ValidationError::UnknownDefaultWebsite(
                default_website.clone(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
single_store_mode: false
default_website: base
websites:
    - id: 1
      code: base
      name: Main Website
      default_store: default
    - id: 2
      code: eu
      default_store: en
stores:
    - id: 1
      code: default
      name: Default Store View
      website: base
    - id: 5
      code: en
      website: eu
    - id: 6
      code: de
      website: eu
"#;

    #[test]
    fn test_parse_valid_config() {
        let config: RegistryConfig = serde_yaml::from_str(YAML).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.websites.len(), 2);
        assert_eq!(config.stores.len(), 3);
        assert_eq!(config.websites[1].name, None);
        assert_eq!(config.stores[1].website, "eu");
    }

    #[test]
    fn test_empty_config() {
        let config: RegistryConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.single_store_mode);
    }

    #[test]
    fn test_validation_errors() {
        let base_config: RegistryConfig = serde_yaml::from_str(YAML).unwrap();

        let mut config = base_config.clone();
        config.stores[0].id = 0;
        assert_eq!(config.validate(), Err(ValidationError::ReservedId));

        let mut config = base_config.clone();
        config.websites[1].code = "".into();
        assert_eq!(config.validate(), Err(ValidationError::EmptyCode));

        let mut config = base_config.clone();
        config.websites[1].id = 1;
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateWebsite("eu".into()))
        );

        let mut config = base_config.clone();
        config.stores[2].code = "en".into();
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateStore("en".into()))
        );

        let mut config = base_config.clone();
        config.stores[2].website = "us".into();
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnknownWebsite {
                store: "de".into(),
                website: "us".into()
            })
        );

        let mut config = base_config.clone();
        config.websites[0].default_store = Some("de".into());
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidDefaultStore {
                website: "base".into(),
                store: "de".into()
            })
        );

        let mut config = base_config;
        config.default_website = Some("admin".into());
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnknownDefaultWebsite("admin".into()))
        );
    }
}
