//! Front-matter parsing

use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::MetadataError;

const DELIMITER: &str = "---";

/// Why a text has no usable front-matter block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// The text does not start with a `---` line
    Missing,
    /// The opening `---` is never closed
    Unterminated,
}

/// Split `---`-delimited front-matter from the body.
/// Returns `(block, body)`; neither contains the delimiter lines.
pub fn split_block(content: &str) -> Result<(&str, &str), BlockError> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content.strip_prefix(DELIMITER).ok_or(BlockError::Missing)?;
    let rest = if let Some(rest) = rest.strip_prefix("\r\n") {
        rest
    } else if let Some(rest) = rest.strip_prefix('\n') {
        rest
    } else if rest.is_empty() {
        return Err(BlockError::Unterminated);
    } else {
        // `----` or `---title`
        return Err(BlockError::Missing);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let block = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(BlockError::Unterminated)
}

/// Accepts both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[derive(Deserialize)]
struct Categories(#[serde(deserialize_with = "string_or_vec")] Vec<String>);

/// Decoded front-matter of a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub categories: BTreeSet<String>,
    /// Keys folio does not interpret, kept as written
    pub extra: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), MetadataError> {
        let (block, body) = split_block(content).map_err(|_| MetadataError::MissingBlock)?;
        Ok((Self::decode(block)?, body))
    }

    /// Decode the YAML between the delimiters
    pub fn decode(block: &str) -> Result<Self, MetadataError> {
        let mut fields: BTreeMap<String, Value> = if block.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(block)?
        };

        let title = match fields.remove("title") {
            None | Some(Value::Null) => return Err(MetadataError::MissingField("title")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(MetadataError::MissingField("title"))
            }
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => {
                return Err(MetadataError::InvalidField {
                    field: "title",
                    message: format!("expected a string, found {}", describe(&other)),
                })
            }
        };

        let categories = match fields.remove("categories") {
            None => BTreeSet::new(),
            Some(value) => {
                let Categories(list) =
                    serde_yaml::from_value(value).map_err(|e| MetadataError::InvalidField {
                        field: "categories",
                        message: e.to_string(),
                    })?;
                list.into_iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            }
        };

        Ok(Self {
            title,
            categories,
            extra: fields,
        })
    }

    /// Encode back into a delimited block that [`FrontMatter::parse`] accepts
    pub fn to_block(&self) -> Result<String, MetadataError> {
        let mut map = Mapping::new();
        map.insert(Value::from("title"), Value::from(self.title.as_str()));
        if !self.categories.is_empty() {
            let list = self
                .categories
                .iter()
                .map(|c| Value::from(c.as_str()))
                .collect();
            map.insert(Value::from("categories"), Value::Sequence(list));
        }
        for (key, value) in &self.extra {
            map.insert(Value::from(key.as_str()), value.clone());
        }

        let yaml = serde_yaml::to_string(&map)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Simulating GADTs with Leibniz Equality
categories:
  - purescript
  - types
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Simulating GADTs with Leibniz Equality");
        assert_eq!(
            fm.categories.iter().collect::<Vec<_>>(),
            vec!["purescript", "types"]
        );
        assert!(fm.extra.is_empty());
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_parse_single_string_category() {
        let content = "---\ntitle: Codecs\ncategories: Notes\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.categories.len(), 1);
        assert!(fm.categories.contains("Notes"));
    }

    #[test]
    fn test_duplicate_categories_collapse() {
        let content = "---\ntitle: T\ncategories: [haskell, haskell, ' haskell ']\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.categories.len(), 1);
    }

    #[test]
    fn test_missing_title() {
        let content = "---\ncategories: [a]\n---\nbody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, MetadataError::MissingField("title")));

        let err = FrontMatter::parse("---\ntitle: ''\n---\n").unwrap_err();
        assert!(matches!(err, MetadataError::MissingField("title")));

        let err = FrontMatter::parse("---\n---\nbody").unwrap_err();
        assert!(matches!(err, MetadataError::MissingField("title")));
    }

    #[test]
    fn test_malformed_fields() {
        let err = FrontMatter::parse("---\ntitle: [a, b]\n---\n").unwrap_err();
        assert!(matches!(
            err,
            MetadataError::InvalidField { field: "title", .. }
        ));

        let err = FrontMatter::parse("---\ntitle: T\ncategories: {a: 1}\n---\n").unwrap_err();
        assert!(matches!(
            err,
            MetadataError::InvalidField {
                field: "categories",
                ..
            }
        ));

        let err = FrontMatter::parse("---\n- just\n- a list\n---\n").unwrap_err();
        assert!(matches!(err, MetadataError::Syntax(_)));
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let content = "---\ntitle: T\nauthor: someone\nseries:\n  name: codecs\n  part: 2\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.extra.get("author").and_then(|v| v.as_str()),
            Some("someone")
        );
        assert!(fm.extra.get("series").map(|v| v.is_mapping()).unwrap_or(false));
    }

    #[test]
    fn test_round_trip() {
        let content = r#"---
title: "Leibniz: a value-level proof"
categories: [purescript, haskell]
draft: false
series:
  name: gadts
  part: 1
---
body
"#;
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let block = fm.to_block().unwrap();
        let (again, rest) = FrontMatter::parse(&block).unwrap();
        assert_eq!(fm, again);
        assert_eq!(rest, "");
    }

    #[test]
    fn test_round_trip_edge_cases() {
        let cases = [
            "title: '  Padded title  '",
            "title: 'yes'",
            "title: yes",
            "title: 'null'",
            "title: '~'",
            "title: '123'",
            "title: '- starts like a list: with colon # and hash'",
            "title: \"Quotes ' and \\\" inside\"",
            "title: Single\ncategories: purescript",
            "title: Empty\ncategories: []",
            "title: Nulled\ncategories: ~",
            "title: Spaced\ncategories: ['  types  ', 'null', 'yes']",
            "title: Dated\ndate: 2017-05-12\ndraft: false",
            "title: Nested\nseries:\n  name: gadts\n  parts: [1, 2]\n  meta:\n    tags: [a, ~]",
        ];

        for yaml in cases {
            let content = format!("---\n{yaml}\n---\nbody\n");
            let (fm, _) = FrontMatter::parse(&content)
                .unwrap_or_else(|e| panic!("{yaml:?} failed to parse: {e}"));
            let block = fm.to_block().unwrap();
            let (again, rest) = FrontMatter::parse(&block)
                .unwrap_or_else(|e| panic!("{yaml:?} re-encoded as {block:?}: {e}"));
            assert_eq!(fm, again, "{yaml:?} re-encoded as {block:?}");
            assert_eq!(rest, "");
            assert_eq!(again.to_block().unwrap(), block);
        }
    }

    #[test]
    fn test_round_trip_keeps_title_text() {
        let (fm, _) = FrontMatter::parse("---\ntitle: '  Padded  '\n---\n").unwrap();
        assert_eq!(fm.title, "Padded");
        let (fm, _) = FrontMatter::parse("---\ntitle: 'null'\n---\n").unwrap();
        assert_eq!(fm.title, "null");
        let (fm, _) = FrontMatter::parse("---\ntitle: Empty\ncategories: []\n---\n").unwrap();
        assert!(fm.categories.is_empty());
        assert!(!fm.to_block().unwrap().contains("categories"));
    }

    #[test]
    fn test_split_block() {
        let (block, body) = split_block("---\ntitle: a\n---\nbody\n").unwrap();
        assert_eq!(block, "title: a\n");
        assert_eq!(body, "body\n");

        let (block, body) = split_block("---\r\ntitle: a\r\n---\r\n\r\nbody").unwrap();
        assert_eq!(block, "title: a\r\n");
        assert_eq!(body, "body");

        let (block, body) = split_block("---\ntitle: a\n---").unwrap();
        assert_eq!(block, "title: a\n");
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_block_errors() {
        assert_eq!(split_block("title: a\n"), Err(BlockError::Missing));
        assert_eq!(split_block("----\ntitle: a\n----\n"), Err(BlockError::Missing));
        assert_eq!(split_block("---\ntitle: a\n"), Err(BlockError::Unterminated));
        assert_eq!(split_block("---"), Err(BlockError::Unterminated));
    }

    #[test]
    fn test_horizontal_rule_in_body_is_kept() {
        let (_, body) = split_block("---\ntitle: a\n---\nabove\n\n---\n\nbelow\n").unwrap();
        assert!(body.contains("above"));
        assert!(body.contains("below"));
    }
}
