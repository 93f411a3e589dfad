use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use scraper::Html;
use tracing::info;

use crate::extract::{ExtractConfig, discover_characters};
use crate::fetch::{BASE_URL, PageFetcher};

pub mod crawl;
pub mod download;
pub mod import;
pub mod parse;
pub mod status;

/// Resolves the character list for a run: either the single character the
/// caller named, or the full roster discovered from the landing page.
///
/// Zero discovered characters is fatal; the roster body is saved next to
/// the run's output so the page structure can be inspected.
fn resolve_characters(
    config: &ExtractConfig,
    fetcher: &mut PageFetcher,
    requested: Option<String>,
    debug_dir: &Path,
) -> Result<Vec<String>> {
    if let Some(character) = requested {
        return Ok(vec![character]);
    }

    info!(url = BASE_URL, "fetching roster page");
    let body = fetcher.get(BASE_URL)?;
    let document = Html::parse_document(&body);

    let characters = discover_characters(config, &document);
    if characters.is_empty() {
        let debug_path = debug_dir.join("roster_debug.html");
        crate::util::ensure_directory(debug_dir)?;
        fs::write(&debug_path, &body)
            .with_context(|| format!("failed to write {}", debug_path.display()))?;
        bail!(
            "no characters found on the roster page; body saved to {} for inspection",
            debug_path.display()
        );
    }

    info!(count = characters.len(), "discovered characters");
    Ok(characters)
}
