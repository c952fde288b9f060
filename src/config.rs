use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::common::{error::OfferError, utils};

const DEFAULT_COMMUNITY_URL: &str = "https://steamcommunity.com/";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    // Absolute URL, checked by new() and restore()
    pub community_url: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl ManagerConfig {
    pub fn new(community_url: impl AsRef<str>) -> Result<Self, OfferError> {
        Ok(Self {
            community_url: Url::parse(community_url.as_ref())?.to_string(),
            language: None,
        })
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn restore(path: impl AsRef<Path>) -> Result<Self, OfferError> {
        let json = utils::restore(&path)?;
        let config: ManagerConfig = serde_json::from_str(&json)?;
        Url::parse(&config.community_url)?;
        debug!(
            "Restored ManagerConfig from {} - community {}",
            path.as_ref().display(),
            config.community_url
        );
        Ok(config)
    }

    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), OfferError> {
        let json = serde_json::to_string_pretty(self)?;
        utils::persist(json, path)
    }

    // Url::join would drop any path prefix on the configured base
    pub(crate) fn community_endpoint(&self, path: &str) -> Result<Url, OfferError> {
        let base = self.community_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            community_url: DEFAULT_COMMUNITY_URL.to_string(),
            language: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.community_url, "https://steamcommunity.com/");
        assert_eq!(config.language, None);

        let url = config.community_endpoint("tradeoffer/new/send").unwrap();
        assert_eq!(url.as_str(), "https://steamcommunity.com/tradeoffer/new/send");
        assert_eq!(ManagerConfig::new(DEFAULT_COMMUNITY_URL).unwrap(), config);
    }

    #[test]
    fn test_invalid_community_url() {
        assert!(matches!(
            ManagerConfig::new("not a url"),
            Err(OfferError::UrlParse(_))
        ));

        let path = std::env::temp_dir().join(format!("{}-config.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"community_url": "::nope", "language": null}"#).unwrap();
        let result = ManagerConfig::restore(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(OfferError::UrlParse(_))));
    }

    #[test]
    fn test_community_endpoint_keeps_prefix() {
        let config = ManagerConfig::new("http://localhost:8080/community/").unwrap();
        let url = config.community_endpoint("tradeoffer/new/send").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/community/tradeoffer/new/send"
        );
    }

    #[test]
    fn test_persist_restore() {
        let path = std::env::temp_dir().join(format!("{}-config.json", uuid::Uuid::new_v4()));
        let config = ManagerConfig::default().language("english");
        config.persist(&path).unwrap();

        let restored = ManagerConfig::restore(&path).unwrap();
        assert_eq!(restored, config);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_restore_missing_file() {
        let result = ManagerConfig::restore("/nonexistent/tradeoffer-config.json");
        assert!(matches!(result, Err(OfferError::Io(_))));
    }
}
