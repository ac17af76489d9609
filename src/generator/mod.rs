//! Generator module - assembles the site in memory, then writes it out
//!
//! Assembly validates identifiers, orders posts newest first and renders
//! every output file. Nothing touches the output directory until assembly
//! has succeeded, so a failed build leaves no partial site behind.

mod feed;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;

use crate::config::SiteConfig;
use crate::content::{Document, DocumentId, MarkdownRenderer};
use crate::error::{BuildError, DuplicateIdentifierError};
use crate::helpers::{decode_entities, strip_html, url_for};
use crate::templates::{CategoryLink, ConfigData, EntryData, NavPost, PostData, TemplateRenderer};
use crate::Site;

/// A rendered post page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub id: DocumentId,
    /// Path relative to the output directory
    pub path: PathBuf,
    pub html: String,
}

/// A rendered category listing
#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub name: String,
    pub path: PathBuf,
    pub entries: Vec<EntryData>,
    pub html: String,
}

/// Everything one build produces
#[derive(Debug, Clone)]
pub struct SitePlan {
    /// Index listing, newest first
    pub entries: Vec<EntryData>,
    pub index_html: String,
    pub pages: Vec<RenderedPage>,
    pub categories: Vec<CategoryPage>,
    pub atom: String,
    pub search: String,
}

impl SitePlan {
    /// Every output file as (path relative to the output directory, contents)
    pub fn files(&self) -> Vec<(PathBuf, &str)> {
        let mut files = vec![(PathBuf::from("index.html"), self.index_html.as_str())];
        files.extend(self.pages.iter().map(|p| (p.path.clone(), p.html.as_str())));
        files.extend(
            self.categories
                .iter()
                .map(|c| (c.path.clone(), c.html.as_str())),
        );
        files.push((PathBuf::from("atom.xml"), self.atom.as_str()));
        files.push((PathBuf::from("search.json"), self.search.as_str()));
        files
    }
}

#[derive(Serialize)]
struct SearchEntry<'a> {
    title: &'a str,
    url: &'a str,
    date: &'a str,
    categories: Vec<&'a str>,
    content: String,
}

/// A post after Markdown rendering, before it goes into a template
struct Prepared {
    document: Document,
    path: PathBuf,
    entry: EntryData,
    content: String,
}

/// Static site generator
pub struct Generator {
    site: Site,
    renderer: MarkdownRenderer,
    templates: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self, BuildError> {
        Ok(Self {
            site: site.clone(),
            renderer: MarkdownRenderer::with_options(&site.config.highlight),
            templates: TemplateRenderer::new()?,
        })
    }

    /// Assemble the site and write it to the public directory
    pub fn generate(&self, documents: Vec<Document>) -> Result<SitePlan, BuildError> {
        let plan = self.assemble(documents)?;
        self.write(&plan)?;
        Ok(plan)
    }

    /// Validate, order and render all documents without touching the disk
    pub fn assemble(&self, mut documents: Vec<Document>) -> Result<SitePlan, BuildError> {
        let config = &self.site.config;
        check_unique(config, &documents)?;

        // Newest first; slug breaks ties so the order is total
        documents.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| a.id.slug.cmp(&b.id.slug))
        });

        let prepared: Vec<Prepared> = documents
            .into_iter()
            .map(|document| self.prepare(document))
            .collect();
        let entries: Vec<EntryData> = prepared.iter().map(|p| p.entry.clone()).collect();
        let config_data = ConfigData::from_config(config);

        let mut context = Context::new();
        context.insert("config", &config_data);
        context.insert("entries", &entries);
        let index_html = self.templates.render("index.html", &context)?;

        let pages = self.render_posts(&prepared, &config_data)?;
        let categories = self.render_categories(&entries, &config_data)?;
        let atom = feed::atom(config, &prepared_for_feed(&prepared));
        let search = self.search_index(&prepared)?;

        let plan = SitePlan {
            entries,
            index_html,
            pages,
            categories,
            atom,
            search,
        };
        check_output_paths(&plan)?;

        tracing::info!(
            "Assembled {} posts in {} categories",
            plan.pages.len(),
            plan.categories.len()
        );

        Ok(plan)
    }

    /// Replace the public directory with the files of `plan`
    pub fn write(&self, plan: &SitePlan) -> Result<(), BuildError> {
        let public_dir = &self.site.public_dir;
        if public_dir.exists() {
            fs::remove_dir_all(public_dir).map_err(|e| BuildError::Write(public_dir.clone(), e))?;
        }
        fs::create_dir_all(public_dir).map_err(|e| BuildError::Write(public_dir.clone(), e))?;

        for (relative, contents) in plan.files() {
            let output_path = public_dir.join(relative);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| BuildError::Write(parent.to_path_buf(), e))?;
            }
            fs::write(&output_path, contents)
                .map_err(|e| BuildError::Write(output_path.clone(), e))?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        Ok(())
    }

    fn prepare(&self, document: Document) -> Prepared {
        let config = &self.site.config;
        let permalink = permalink(config, &document.id);

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(&document.body);
        let content = self.renderer.render(&full_md);
        let excerpt = excerpt_md.map(|e| self.renderer.render(&e));

        let entry = EntryData {
            id: document.id.to_string(),
            title: document.title.clone(),
            date: document.date().format("%Y-%m-%d").to_string(),
            url: url_for(config, &permalink),
            categories: document
                .categories
                .iter()
                .map(|name| category_link(config, name))
                .collect(),
            excerpt,
        };

        Prepared {
            path: output_path(&permalink),
            document,
            entry,
            content,
        }
    }

    /// Render individual post pages
    fn render_posts(
        &self,
        posts: &[Prepared],
        config_data: &ConfigData,
    ) -> Result<Vec<RenderedPage>, BuildError> {
        let nav = |i: usize| {
            posts.get(i).map(|p| NavPost {
                title: p.entry.title.clone(),
                url: p.entry.url.clone(),
            })
        };

        posts
            .iter()
            .enumerate()
            .map(|(i, post)| -> Result<RenderedPage, BuildError> {
                let post_data = PostData {
                    title: post.entry.title.clone(),
                    date: post.entry.date.clone(),
                    url: post.entry.url.clone(),
                    categories: post.entry.categories.clone(),
                    summary: decode_entities(strip_html(&post.content).trim()),
                };

                // Older post is "prev", newer is "next"
                let prev_post = nav(i + 1);
                let next_post = if i > 0 { nav(i - 1) } else { None };

                let mut context = Context::new();
                context.insert("config", config_data);
                context.insert("post", &post_data);
                context.insert("content", &post.content);
                context.insert("prev_post", &prev_post);
                context.insert("next_post", &next_post);

                Ok(RenderedPage {
                    id: post.document.id.clone(),
                    path: post.path.clone(),
                    html: self.templates.render("post.html", &context)?,
                })
            })
            .collect()
    }

    /// Render one listing per category
    fn render_categories(
        &self,
        entries: &[EntryData],
        config_data: &ConfigData,
    ) -> Result<Vec<CategoryPage>, BuildError> {
        let category_dir = self.site.config.category_dir.trim_matches('/');

        // Keyed by slug, so names that differ only in case or punctuation share a page
        let mut by_slug: BTreeMap<String, (String, Vec<EntryData>)> = BTreeMap::new();
        for entry in entries {
            for category in &entry.categories {
                let slug = slug::slugify(&category.name);
                if slug.is_empty() {
                    continue;
                }
                let (_, listed) = by_slug
                    .entry(slug)
                    .or_insert_with(|| (category.name.clone(), Vec::new()));
                // "Types" and "types" on one post still list it once
                if listed.last().map(|e| e.id != entry.id).unwrap_or(true) {
                    listed.push(entry.clone());
                }
            }
        }

        by_slug
            .into_iter()
            .map(|(slug, (name, entries))| -> Result<CategoryPage, BuildError> {
                let mut context = Context::new();
                context.insert("config", config_data);
                context.insert("category", &CategoryLink {
                    name: name.clone(),
                    url: url_for(&self.site.config, &format!("{}/{}/", category_dir, slug)),
                });
                context.insert("entries", &entries);

                Ok(CategoryPage {
                    html: self.templates.render("category.html", &context)?,
                    path: Path::new(category_dir).join(&slug).join("index.html"),
                    name,
                    entries,
                })
            })
            .collect()
    }

    /// Build the JSON search index
    fn search_index(&self, posts: &[Prepared]) -> Result<String, BuildError> {
        let search_data: Vec<SearchEntry> = posts
            .iter()
            .map(|p| SearchEntry {
                title: &p.entry.title,
                url: &p.entry.url,
                date: &p.entry.date,
                categories: p.document.categories.iter().map(String::as_str).collect(),
                content: strip_html(&p.content),
            })
            .collect();

        Ok(serde_json::to_string_pretty(&search_data)?)
    }
}

fn prepared_for_feed(posts: &[Prepared]) -> Vec<feed::FeedItem<'_>> {
    posts
        .iter()
        .map(|p| feed::FeedItem {
            entry: &p.entry,
            content: p.entry.excerpt.as_deref().unwrap_or(&p.content),
        })
        .collect()
}

/// Fail if two documents would be written to the same place
fn check_unique(config: &SiteConfig, documents: &[Document]) -> Result<(), DuplicateIdentifierError> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(documents.len());
    for document in documents {
        let path = permalink(config, &document.id);
        if let Some(first) = seen.insert(path, &document.source) {
            return Err(DuplicateIdentifierError {
                id: document.id.clone(),
                first: first.to_path_buf(),
                second: document.source.clone(),
            });
        }
    }
    Ok(())
}

/// Fail if a post page lands on the index, the feed, the search index or a category page
fn check_output_paths(plan: &SitePlan) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for (path, _) in plan.files() {
        if !seen.insert(path.clone()) {
            return Err(BuildError::OutputCollision(path));
        }
    }
    Ok(())
}

/// Expand the permalink pattern for a post (relative to the site root)
pub fn permalink(config: &SiteConfig, id: &DocumentId) -> String {
    let date = id.date;
    config
        .permalink
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":slug", &id.slug)
        .replace(":title", &id.slug)
        .trim_start_matches('/')
        .to_string()
}

/// Map a permalink to the file that serves it
fn output_path(permalink: &str) -> PathBuf {
    let trimmed = permalink.trim_matches('/');
    if trimmed.ends_with(".html") {
        PathBuf::from(trimmed)
    } else {
        Path::new(trimmed).join("index.html")
    }
}

fn category_link(config: &SiteConfig, name: &str) -> CategoryLink {
    let slug = slug::slugify(name);
    let url = if slug.is_empty() {
        String::new()
    } else {
        url_for(
            config,
            &format!("{}/{}/", config.category_dir.trim_matches('/'), slug),
        )
    };
    CategoryLink {
        name: name.to_string(),
        url,
    }
}
