//! Error types for the build pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::content::DocumentId;

/// A source file could not be read or is not a valid document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error when reading `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{path}`: file name must look like YYYY-MM-DD-slug.md")]
    InvalidFileName { path: PathBuf },

    #[error("`{path}`: document must begin with `---`")]
    MissingDelimiter { path: PathBuf },

    #[error("`{path}`: front-matter block has no closing `---`")]
    UnterminatedFrontMatter { path: PathBuf },
}

/// Front-matter is malformed or lacks a required key
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no `---` delimited front-matter block")]
    MissingBlock,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("front-matter is not a YAML mapping")]
    Syntax(#[from] serde_yaml::Error),
}

/// Two documents map to the same output path
#[derive(Debug, Error)]
#[error("duplicate identifier `{id}` in `{first}` and `{second}`")]
pub struct DuplicateIdentifierError {
    pub id: DocumentId,
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Any failure that aborts a build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("`{path}`: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    #[error(transparent)]
    DuplicateIdentifier(#[from] DuplicateIdentifierError),

    #[error("template `{name}` failed to render")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("two outputs would be written to `{0}`")]
    OutputCollision(PathBuf),

    #[error("failed to serialize search index")]
    SearchIndex(#[from] serde_json::Error),

    #[error("IO error when writing `{0}`")]
    Write(PathBuf, #[source] std::io::Error),
}
