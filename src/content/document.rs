//! Document model and file-name identifiers

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use super::{FrontMatter, RawDocument};
use crate::error::BuildError;

lazy_static! {
    static ref FILE_STEM: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)$").unwrap();
}

/// Identifier of a post, taken from its `YYYY-MM-DD-slug` file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId {
    pub date: NaiveDate,
    pub slug: String,
}

impl DocumentId {
    /// Parse a file stem such as `2017-05-12-leibniz-equality`
    ///
    /// Returns `None` when the stem has no date prefix, the date does not
    /// exist on the calendar, or nothing slug-worthy follows it.
    pub fn from_stem(stem: &str) -> Option<Self> {
        let caps = FILE_STEM.captures(stem)?;
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;

        let slug = slug::slugify(&caps[4]);
        if slug.is_empty() {
            return None;
        }

        Some(Self { date, slug })
    }

    /// Parse the identifier from a file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(Self::from_stem)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.slug)
    }
}

/// A loaded post. The publish date is always the identifier's date.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub categories: BTreeSet<String>,
    /// Front-matter keys folio does not interpret
    pub extra: BTreeMap<String, serde_yaml::Value>,
    /// Raw Markdown body
    pub body: String,
    /// Source file path
    pub source: PathBuf,
}

impl Document {
    /// Decode the front-matter of a raw document
    pub fn from_raw(raw: RawDocument) -> Result<Self, BuildError> {
        let (fm, body) = FrontMatter::parse(&raw.text).map_err(|source| BuildError::Metadata {
            path: raw.path.clone(),
            source,
        })?;
        let body = body.to_string();

        if let Some(declared) = fm.extra.get("date").and_then(|v| v.as_str()) {
            let file_date = raw.id.date.format("%Y-%m-%d").to_string();
            if !declared.trim().starts_with(&file_date) {
                tracing::warn!(
                    "{:?}: front-matter date `{}` ignored, file name says {}",
                    raw.path,
                    declared,
                    file_date
                );
            }
        }

        Ok(Self {
            id: raw.id,
            title: fm.title,
            categories: fm.categories,
            extra: fm.extra,
            body,
            source: raw.path,
        })
    }

    /// Publish date
    pub fn date(&self) -> NaiveDate {
        self.id.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;

    fn raw(name: &str, text: &str) -> RawDocument {
        let path = PathBuf::from(name);
        RawDocument {
            id: DocumentId::from_path(&path).unwrap(),
            path,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_parse_stem() {
        let id = DocumentId::from_stem("2017-05-12-leibniz-equality").unwrap();
        assert_eq!(id.date, NaiveDate::from_ymd_opt(2017, 5, 12).unwrap());
        assert_eq!(id.slug, "leibniz-equality");
        assert_eq!(id.to_string(), "2017-05-12-leibniz-equality");
    }

    #[test]
    fn test_slug_is_normalised() {
        let id = DocumentId::from_stem("2018-01-02-Why Codecs_Hurt").unwrap();
        assert_eq!(id.slug, "why-codecs-hurt");
    }

    #[test]
    fn test_reject_bad_stems() {
        assert!(DocumentId::from_stem("leibniz-equality").is_none());
        assert!(DocumentId::from_stem("2017-02-30-no-such-day").is_none());
        assert!(DocumentId::from_stem("2017-05-12-").is_none());
        assert!(DocumentId::from_stem("2017-05-12-!!!").is_none());
        assert!(DocumentId::from_stem("17-05-12-short-year").is_none());
    }

    #[test]
    fn test_ids_order_by_date_then_slug() {
        let a = DocumentId::from_stem("2020-01-01-b").unwrap();
        let b = DocumentId::from_stem("2020-01-02-a").unwrap();
        let c = DocumentId::from_stem("2020-01-02-b").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_document_from_raw() {
        let doc = Document::from_raw(raw(
            "2017-05-12-leibniz.md",
            "---\ntitle: Leibniz Equality\ncategories: [purescript, types]\n---\nBody text\n",
        ))
        .unwrap();
        assert_eq!(doc.title, "Leibniz Equality");
        assert_eq!(doc.date(), NaiveDate::from_ymd_opt(2017, 5, 12).unwrap());
        assert!(doc.categories.contains("purescript"));
        assert_eq!(doc.body, "Body text\n");
    }

    #[test]
    fn test_front_matter_date_does_not_override_file_name() {
        let doc = Document::from_raw(raw(
            "2017-05-12-leibniz.md",
            "---\ntitle: Leibniz\ndate: 2001-01-01\n---\n",
        ))
        .unwrap();
        assert_eq!(doc.date(), NaiveDate::from_ymd_opt(2017, 5, 12).unwrap());
        assert!(doc.extra.contains_key("date"));
    }

    #[test]
    fn test_document_without_title() {
        let err = Document::from_raw(raw("2017-05-12-untitled.md", "---\ncategories: x\n---\n"))
            .unwrap_err();
        match err {
            BuildError::Metadata { path, source } => {
                assert_eq!(path, PathBuf::from("2017-05-12-untitled.md"));
                assert!(matches!(source, MetadataError::MissingField("title")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
