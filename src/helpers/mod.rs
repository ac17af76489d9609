//! Helper functions shared by the renderer, the generator and templates

mod html;
mod url;

pub use html::*;
pub use url::*;
