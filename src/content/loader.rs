//! Content loader - reads posts from the posts directory

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{split_block, BlockError, Document, DocumentId};
use crate::error::{BuildError, LoadError};

/// A post file that has been read and structurally checked, not yet decoded
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    pub id: DocumentId,
    pub text: String,
}

/// Loads content from the posts directory
pub struct ContentLoader {
    posts_dir: PathBuf,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new<P: Into<PathBuf>>(posts_dir: P) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }

    /// Lazily read every post file, in file-name order.
    ///
    /// Each call walks the directory again. A missing directory yields nothing.
    pub fn documents(&self) -> impl Iterator<Item = Result<RawDocument, LoadError>> + '_ {
        let walk = if self.posts_dir.is_dir() {
            Some(
                WalkDir::new(&self.posts_dir)
                    .follow_links(true)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|e| e.depth() == 0 || !is_hidden(e)),
            )
        } else {
            tracing::warn!("Posts directory {:?} does not exist", self.posts_dir);
            None
        };

        walk.into_iter().flatten().filter_map(move |entry| match entry {
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.posts_dir.clone());
                Some(Err(LoadError::Io {
                    path,
                    source: err.into(),
                }))
            }
            Ok(entry) if entry.file_type().is_file() && is_markdown_file(entry.path()) => {
                Some(load_raw(entry.path()))
            }
            Ok(_) => None,
        })
    }

    /// Load and decode every post, stopping at the first failure
    pub fn load_documents(&self) -> Result<Vec<Document>, BuildError> {
        let documents = self
            .documents()
            .map(|raw| Document::from_raw(raw?))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Loaded {} documents from {:?}", documents.len(), self.posts_dir);
        Ok(documents)
    }
}

/// Read a single post file and check its structure
fn load_raw(path: &Path) -> Result<RawDocument, LoadError> {
    let id = DocumentId::from_path(path).ok_or_else(|| LoadError::InvalidFileName {
        path: path.to_path_buf(),
    })?;

    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(e) = split_block(&text) {
        let path = path.to_path_buf();
        return Err(match e {
            BlockError::Missing => LoadError::MissingDelimiter { path },
            BlockError::Unterminated => LoadError::UnterminatedFrontMatter { path },
        });
    }

    Ok(RawDocument {
        path: path.to_path_buf(),
        id,
        text,
    })
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
