//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Name of the configuration file in the site root
pub const CONFIG_FILE: &str = "_config.yml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,
    pub permalink: String,

    // Directory
    pub source_dir: String,
    pub posts_dir: String,
    pub public_dir: String,
    pub category_dir: String,

    // Feed
    pub feed_limit: usize,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            permalink: ":year/:month/:day/:slug/".to_string(),

            source_dir: "source".to_string(),
            posts_dir: "_posts".to_string(),
            public_dir: "public".to_string(),
            category_dir: "categories".to_string(),

            feed_limit: 20,

            highlight: HighlightConfig::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject settings the generator cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.permalink.contains(":slug") && !self.permalink.contains(":title") {
            return Err(ConfigError::Validation(format!(
                "permalink `{}` must contain :slug or :title",
                self.permalink
            )));
        }
        if self.feed_limit == 0 {
            return Err(ConfigError::Validation(
                "feed_limit must be greater than zero".to_string(),
            ));
        }
        if self.category_dir.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "category_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: false,
            theme: "InspiredGitHub".to_string(),
        }
    }
}
