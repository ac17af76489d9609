//! List site content

use anyhow::Result;
use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::content::ContentLoader;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let stdout = io::stdout();
    write_listing(site, content_type, &mut stdout.lock())
}

/// Write the listing for `content_type` to `out`
pub fn write_listing<W: Write>(site: &Site, content_type: &str, out: &mut W) -> Result<()> {
    let loader = ContentLoader::new(&site.posts_dir);

    match content_type {
        "post" | "posts" => {
            let mut posts = loader.load_documents()?;
            posts.sort_by(|a, b| {
                b.date()
                    .cmp(&a.date())
                    .then_with(|| a.id.slug.cmp(&b.id.slug))
            });
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    post.date().format("%Y-%m-%d"),
                    post.title,
                    post.source
                        .strip_prefix(&site.posts_dir)
                        .unwrap_or(&post.source)
                        .display()
                )?;
            }
        }
        "category" | "categories" => {
            let posts = loader.load_documents()?;
            let mut categories: BTreeMap<String, usize> = BTreeMap::new();
            for post in &posts {
                for cat in &post.categories {
                    *categories.entry(cat.clone()).or_insert(0) += 1;
                }
            }
            writeln!(out, "Categories ({}):", categories.len())?;
            let mut categories: Vec<_> = categories.into_iter().collect();
            // Most used first, then by name
            categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (cat, count) in categories {
                writeln!(out, "  {} ({})", cat, count)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }

    Ok(())
}
