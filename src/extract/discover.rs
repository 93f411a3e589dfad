use std::collections::HashSet;

use scraper::Html;
use tracing::debug;

use super::ExtractConfig;

/// Extracts the character roster from the game's landing page.
///
/// Every roster selector contributes to one candidate pool, in order; the
/// last configured selector is a generic fallback that matches any
/// character-space link, so a wiki redesign that drops the grid classes
/// still yields candidates. Identifiers keep first-seen order, deduped.
///
/// An empty result is the caller's signal to dump the page body for
/// diagnosis and abort: silent zero-character success would only surface
/// later as an empty crawl.
pub fn discover_characters(config: &ExtractConfig, document: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut characters = Vec::new();

    for selector in &config.roster_selectors {
        for anchor in document.select(selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if config.is_excluded_path(href) {
                continue;
            }
            let Some(captures) = config.character_path_regex.captures(href) else {
                continue;
            };

            let slug = captures[1].to_string();
            if slug.is_empty() {
                continue;
            }
            if seen.insert(slug.clone()) {
                debug!(character = %slug, href, "found character link");
                characters.push(slug);
            }
        }
    }

    characters
}
