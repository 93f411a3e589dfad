use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use scraper::Html;
use tracing::{info, warn};

use crate::cli::CrawlArgs;
use crate::commands::resolve_characters;
use crate::extract::{ExtractConfig, extract_tables};
use crate::fetch::{PageFetcher, frame_data_url};
use crate::model::TableRecord;
use crate::util::write_json_pretty;

pub fn run(args: CrawlArgs) -> Result<()> {
    let config = ExtractConfig::default();
    let mut fetcher = PageFetcher::new(Duration::from_millis(args.request_delay_ms))?;

    let debug_dir = args
        .output
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let characters = resolve_characters(&config, &mut fetcher, args.character, &debug_dir)?;

    let mut records: Vec<TableRecord> = Vec::new();
    let mut skipped = 0_usize;

    for character in &characters {
        let url = frame_data_url(character);
        let body = match fetcher.get(&url) {
            Ok(body) => body,
            Err(err) => {
                warn!(character, error = %err, "failed to fetch frame data page, skipping");
                skipped += 1;
                continue;
            }
        };

        let document = Html::parse_document(&body);
        let tables = extract_tables(&config, character, &document)?;
        info!(character, tables = tables.len(), "crawled character");
        records.extend(tables);
    }

    write_json_pretty(&args.output, &records)?;
    info!(
        output = %args.output.display(),
        characters = characters.len() - skipped,
        skipped,
        tables = records.len(),
        "crawl complete"
    );

    Ok(())
}
