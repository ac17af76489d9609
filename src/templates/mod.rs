//! Built-in page templates using the Tera template engine
//!
//! The default layout is embedded in the binary, so a site needs nothing
//! but its posts and an optional `_config.yml`.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::helpers::url_for;

/// Template renderer with the embedded default theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self, BuildError> {
        let mut tera = Tera::default();

        // Markdown output is already HTML; templates escape text fields explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("_post_list.html", include_str!("default/_post_list.html")),
            ("index.html", include_str!("default/index.html")),
            ("post.html", include_str!("default/post.html")),
            ("category.html", include_str!("default/category.html")),
        ])
        .map_err(|source| BuildError::Template {
            name: "default theme".to_string(),
            source,
        })?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, BuildError> {
        self.tera
            .render(template_name, context)
            .map_err(|source| BuildError::Template {
                name: template_name.to_string(),
                source,
            })
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a `YYYY-MM-DD` date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    // "LL" is the long form, e.g. "May 12, 2017"
    if format == "LL" {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Ok(tera::Value::String(date.format("%B %d, %Y").to_string()));
        }
    }

    Ok(tera::Value::String(s))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub home: String,
    pub feed_url: String,
}

impl ConfigData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            home: url_for(config, "/"),
            feed_url: url_for(config, "atom.xml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
}

/// One line of a post listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub url: String,
    pub categories: Vec<CategoryLink>,
    pub excerpt: Option<String>,
}

/// The post shown on a single-post page
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub date: String,
    pub url: String,
    pub categories: Vec<CategoryLink>,
    /// Plain-text body, for the meta description
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}
