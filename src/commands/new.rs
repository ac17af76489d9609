//! Create a new post

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Site;

/// Scaffold `<date>-<slug>.md` in the posts directory, dated today unless `date` is given
pub fn create_post(site: &Site, title: &str, date: Option<NaiveDate>) -> Result<PathBuf> {
    let title = title.trim();
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let file_path = site
        .posts_dir
        .join(format!("{}-{}.md", date.format("%Y-%m-%d"), slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        title: title.to_string(),
        ..Default::default()
    };
    let content = format!("{}\n", front_matter.to_block()?);

    fs::create_dir_all(&site.posts_dir)?;
    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
