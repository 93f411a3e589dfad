use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::DownloadArgs;
use crate::commands::resolve_characters;
use crate::extract::ExtractConfig;
use crate::fetch::{PageFetcher, frame_data_url};
use crate::model::{DownloadManifest, DownloadedPage};
use crate::util::{ensure_directory, file_slug, now_utc_string, sha256_hex, write_json_pretty};

pub fn run(args: DownloadArgs) -> Result<()> {
    let config = ExtractConfig::default();
    let mut fetcher = PageFetcher::new(Duration::from_millis(args.request_delay_ms))?;

    ensure_directory(&args.output_dir)?;
    let characters = resolve_characters(&config, &mut fetcher, args.character, &args.output_dir)?;

    let mut pages: Vec<DownloadedPage> = Vec::new();
    for character in &characters {
        let url = frame_data_url(character);
        info!(character, url = %url, "downloading frame data page");

        let body = match fetcher.get(&url) {
            Ok(body) => body,
            Err(err) => {
                warn!(character, error = %err, "failed to download frame data page, skipping");
                continue;
            }
        };

        let filename = format!("{}_frame_data.html", file_slug(character));
        let path = args.output_dir.join(&filename);
        fs::write(&path, &body).with_context(|| format!("failed to write {}", path.display()))?;

        pages.push(DownloadedPage {
            character: character.clone(),
            filename,
            sha256: sha256_hex(body.as_bytes()),
            fetched_at: now_utc_string(),
        });
    }

    let manifest = DownloadManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        page_count: pages.len(),
        pages,
    };
    let manifest_path = args.output_dir.join("download_manifest.json");
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        output_dir = %args.output_dir.display(),
        pages = manifest.page_count,
        "download complete"
    );

    Ok(())
}
