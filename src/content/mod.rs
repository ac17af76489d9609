//! Content module - loads documents, parses front-matter and renders Markdown

mod document;
mod frontmatter;
pub mod loader;
mod markdown;

pub use document::{Document, DocumentId};
pub use frontmatter::{split_block, BlockError, FrontMatter};
pub use loader::{ContentLoader, RawDocument};
pub use markdown::MarkdownRenderer;
