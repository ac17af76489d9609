//! folio: a small static blog builder
//!
//! Reads Markdown posts named `YYYY-MM-DD-slug.md`, each starting with a
//! YAML front-matter block, and renders them into a static site with an
//! index, per-post pages, category listings, an Atom feed and a search index.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod templates;

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;

/// A site rooted at a directory containing `_config.yml`
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Directory holding the posts
    pub posts_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Open the site in `base_dir`, falling back to defaults when there is no config file
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, ConfigError> {
        let base_dir = base_dir.as_ref();
        let base_dir = if base_dir.is_absolute() {
            normalize(base_dir)
        } else {
            let cwd = std::env::current_dir()
                .map_err(|e| ConfigError::Io(base_dir.to_path_buf(), e))?;
            normalize(&cwd.join(base_dir))
        };
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", config::CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };
        config.validate()?;

        let source_dir = normalize(&base_dir.join(&config.source_dir));
        let posts_dir = normalize(&source_dir.join(&config.posts_dir));
        let public_dir = normalize(&base_dir.join(&config.public_dir));
        check_public_dir(&config.public_dir, &base_dir, &source_dir, &public_dir)?;

        Ok(Self {
            config,
            base_dir,
            source_dir,
            posts_dir,
            public_dir,
        })
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self).map(|_| ())
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post dated today
    pub fn new_post(&self, title: &str) -> Result<PathBuf> {
        commands::new::create_post(self, title, None)
    }
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// `generate` and `clean` delete the public directory, so it must be a
/// dedicated directory under the site root that shares nothing with the sources
fn check_public_dir(
    configured: &str,
    base_dir: &Path,
    source_dir: &Path,
    public_dir: &Path,
) -> Result<(), ConfigError> {
    let reason = if public_dir == base_dir {
        Some("is the site root")
    } else if !public_dir.starts_with(base_dir) {
        Some("is outside the site root")
    } else if public_dir.starts_with(source_dir) || source_dir.starts_with(public_dir) {
        Some("overlaps source_dir")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::Validation(format!(
            "public_dir `{}` {}",
            configured, reason
        ))),
        None => Ok(()),
    }
}
