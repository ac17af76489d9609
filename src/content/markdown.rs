//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::escape_html;

const MORE_MARKER: &str = "<!-- more -->";

/// Markdown renderer with syntax highlighting.
///
/// Rendering holds no mutable state, so the same input always produces
/// the same HTML.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // YAML metadata blocks are handled by FrontMatter, not here
        let parser = Parser::new_ext(markdown, markdown_options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        if !self.highlight {
            return plain_code_block(code, lang);
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme_set.themes.get(&self.theme_name) else {
            tracing::warn!("Unknown highlight theme `{}`", self.theme_name);
            return plain_code_block(code, lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    self.add_line_numbers(&highlighted, lang)
                } else {
                    format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
                }
            }
            Err(e) => {
                tracing::warn!("Failed to highlight {} block: {}", lang, e);
                plain_code_block(code, lang)
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }

    /// Split on the first `<!-- more -->` that stands on its own as an HTML block.
    /// A marker inside code or inline in a paragraph is left alone.
    /// Returns the excerpt (if marked) and the full text without the marker.
    pub fn split_excerpt(content: &str) -> (Option<String>, String) {
        let marker = Parser::new_ext(content, markdown_options())
            .into_offset_iter()
            .find_map(|(event, range)| match event {
                Event::Html(html) if html.trim() == MORE_MARKER => Some(range),
                _ => None,
            });

        match marker {
            Some(range) => {
                let excerpt = content[..range.start].trim().to_string();
                let remaining = content[range.end..].trim().to_string();
                let full = format!("{}\n\n{}", excerpt, remaining);
                (Some(excerpt), full)
            }
            None => (None, content.to_string()),
        }
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        escape_html(code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = MarkdownRenderer::new();
        let body = "## Leibniz\n\n```haskell\nnewtype Leibniz a b = Leibniz (forall f. f a -> f b)\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\nA footnote[^1].\n\n[^1]: here\n";
        let first = renderer.render(body);
        let second = renderer.render(body);
        assert_eq!(first, second);

        let other = MarkdownRenderer::new();
        assert_eq!(first, other.render(body));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_render_code_block_with_line_numbers() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            line_number: true,
            ..Default::default()
        });
        let html = renderer.render("```purescript\na = 1\nb = 2\n```");
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_render_without_highlighting_escapes() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            enable: false,
            ..Default::default()
        });
        let html = renderer.render("```\nif a < b && c\n```");
        assert!(html.contains(r#"<pre><code class="language-text">"#));
        assert!(html.contains("a &lt; b &amp;&amp; c"));
    }

    #[test]
    fn test_indented_code_block() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            enable: false,
            ..Default::default()
        });
        let html = renderer.render("para\n\n    indented <code>\n");
        assert!(html.contains("indented &lt;code&gt;"));
    }

    #[test]
    fn test_split_excerpt() {
        let content = "This is excerpt.\n<!-- more -->\nThis is more content.";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(excerpt, Some("This is excerpt.".to_string()));
        assert!(full.contains("This is excerpt."));
        assert!(full.contains("This is more content."));
        assert!(!full.contains(MORE_MARKER));

        let (excerpt, full) = MarkdownRenderer::split_excerpt("no marker");
        assert_eq!(excerpt, None);
        assert_eq!(full, "no marker");
    }

    #[test]
    fn test_split_excerpt_ignores_marker_in_code() {
        let content = "Intro.\n\n```html\n<!-- more -->\n```\n\nOutro.";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(excerpt, None);
        assert_eq!(full, content);

        let content = "Use `<!-- more -->` to cut.\n\nText.\n\n<!-- more -->\n\nRest.";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(
            excerpt,
            Some("Use `<!-- more -->` to cut.\n\nText.".to_string())
        );
        assert!(full.ends_with("Text.\n\nRest."));
        assert!(full.contains("`<!-- more -->`"));
    }

    #[test]
    fn test_split_excerpt_ignores_indented_marker() {
        let content = "Intro.\n\n    <!-- more -->\n\nOutro.";
        let (excerpt, _) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(excerpt, None);
    }
}
