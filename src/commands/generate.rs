//! Generate static files

use anyhow::Result;
use std::time::Instant;

use crate::content::ContentLoader;
use crate::generator::{Generator, SitePlan};
use crate::Site;

/// Load every post, assemble the site and write it out
pub fn run(site: &Site) -> Result<SitePlan> {
    let start = Instant::now();

    let loader = ContentLoader::new(&site.posts_dir);
    let documents = loader.load_documents()?;
    tracing::info!("Loaded {} posts", documents.len());

    let generator = Generator::new(site)?;
    let plan = generator.generate(documents)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} files in {:.2}s",
        plan.files().len(),
        duration.as_secs_f64()
    );

    Ok(plan)
}
