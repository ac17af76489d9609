//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::{SiteConfig, CONFIG_FILE};

const DEFAULT_CONFIG: &str = r#"# Folio configuration

# Site
title: Folio
subtitle: ''
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /
permalink: :year/:month/:day/:slug/

# Directory
source_dir: source
posts_dir: _posts
public_dir: public
category_dir: categories

# Feed
feed_limit: 20

# Code highlighting
highlight:
  enable: true
  line_number: false
  theme: InspiredGitHub
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    let config: SiteConfig = serde_yaml::from_str(DEFAULT_CONFIG)?;
    fs::create_dir_all(
        target_dir
            .join(&config.source_dir)
            .join(&config.posts_dir),
    )?;
    fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::info!("Wrote {:?}", config_path);

    Ok(())
}
