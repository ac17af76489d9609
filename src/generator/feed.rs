//! Atom feed generation

use crate::config::SiteConfig;
use crate::helpers::{absolutize_links, escape_xml, full_url_for, strip_invalid_xml_chars};
use crate::templates::EntryData;

/// A post as it appears in the feed
pub struct FeedItem<'a> {
    pub entry: &'a EntryData,
    /// Excerpt if the post has one, otherwise the full HTML
    pub content: &'a str,
}

/// Render an Atom feed of the newest `config.feed_limit` posts.
/// `items` must already be ordered newest first.
pub fn atom(config: &SiteConfig, items: &[FeedItem<'_>]) -> String {
    let site_url = full_url_for(config, "/");
    // Derived from the content so that rebuilding unchanged posts yields the same feed
    let updated = items
        .first()
        .map(|item| timestamp(&item.entry.date))
        .unwrap_or_else(|| timestamp("1970-01-01"));

    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    feed.push('\n');
    feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
    feed.push('\n');
    feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
    if !config.subtitle.is_empty() {
        feed.push_str(&format!(
            "  <subtitle>{}</subtitle>\n",
            escape_xml(&config.subtitle)
        ));
    }
    feed.push_str(&format!(
        "  <link href=\"{}\" rel=\"self\"/>\n",
        full_url_for(config, "atom.xml")
    ));
    feed.push_str(&format!("  <link href=\"{}\"/>\n", site_url));
    feed.push_str(&format!("  <updated>{}</updated>\n", updated));
    feed.push_str(&format!("  <id>{}</id>\n", site_url));
    feed.push_str(&format!(
        "  <author><name>{}</name></author>\n",
        escape_xml(&config.author)
    ));

    for item in items.iter().take(config.feed_limit) {
        let entry = item.entry;
        // entry.url already carries the site root
        let link = format!("{}{}", config.url.trim_end_matches('/'), entry.url);
        feed.push_str("  <entry>\n");
        feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&entry.title)));
        feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
        feed.push_str(&format!("    <id>{}</id>\n", link));
        feed.push_str(&format!(
            "    <published>{}</published>\n",
            timestamp(&entry.date)
        ));
        feed.push_str(&format!(
            "    <updated>{}</updated>\n",
            timestamp(&entry.date)
        ));
        for category in &entry.categories {
            feed.push_str(&format!(
                "    <category term=\"{}\"/>\n",
                escape_xml(&category.name)
            ));
        }
        let content = strip_invalid_xml_chars(&absolutize_links(item.content, config));
        feed.push_str(&format!(
            "    <content type=\"html\"><![CDATA[{}]]></content>\n",
            content.replace("]]>", "]]]]><![CDATA[>")
        ));
        feed.push_str("  </entry>\n");
    }

    feed.push_str("</feed>\n");
    feed
}

fn timestamp(date: &str) -> String {
    format!("{}T00:00:00Z", date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::CategoryLink;

    fn entry(title: &str, date: &str, url: &str) -> EntryData {
        EntryData {
            id: format!("{}-x", date),
            title: title.to_string(),
            date: date.to_string(),
            url: url.to_string(),
            categories: vec![CategoryLink {
                name: "types".to_string(),
                url: "/categories/types/".to_string(),
            }],
            excerpt: None,
        }
    }

    #[test]
    fn test_atom_feed() {
        let config = SiteConfig {
            url: "https://blog.example.org".to_string(),
            ..Default::default()
        };
        let newer = entry("Codecs & Classes", "2019-02-01", "/2019/02/01/codecs/");
        let older = entry("Leibniz", "2017-05-12", "/2017/05/12/leibniz/");
        let items = vec![
            FeedItem {
                entry: &newer,
                content: r#"<img src="/a.png">"#,
            },
            FeedItem {
                entry: &older,
                content: "<p>]]></p>",
            },
        ];

        let xml = atom(&config, &items);
        assert!(xml.contains("<updated>2019-02-01T00:00:00Z</updated>"));
        assert!(xml.contains("<title>Codecs &amp; Classes</title>"));
        assert!(xml.contains(r#"<link href="https://blog.example.org/2019/02/01/codecs/"/>"#));
        assert!(xml.contains(r#"<img src="https://blog.example.org/a.png">"#));
        assert!(xml.contains("]]]]><![CDATA[>"));
        assert!(xml.contains(r#"<category term="types"/>"#));
    }

    #[test]
    fn test_feed_limit() {
        let config = SiteConfig {
            feed_limit: 1,
            ..Default::default()
        };
        let a = entry("A", "2019-02-01", "/a/");
        let b = entry("B", "2018-02-01", "/b/");
        let items = vec![
            FeedItem {
                entry: &a,
                content: "",
            },
            FeedItem {
                entry: &b,
                content: "",
            },
        ];
        let xml = atom(&config, &items);
        assert_eq!(xml.matches("<entry>").count(), 1);
    }

    #[test]
    fn test_empty_feed() {
        let xml = atom(&SiteConfig::default(), &[]);
        assert!(xml.contains("<updated>1970-01-01T00:00:00Z</updated>"));
        assert!(!xml.contains("<entry>"));
    }
}
