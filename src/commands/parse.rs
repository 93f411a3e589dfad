use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{info, warn};

use crate::cleanup::CleanupClient;
use crate::cli::ParseArgs;
use crate::extract::{ExtractConfig, extract_tables};
use crate::model::{AllData, CharacterData, TableType};
use crate::util::{ensure_directory, file_slug, title_case, write_json_pretty};

pub fn run(args: ParseArgs) -> Result<()> {
    let config = ExtractConfig::default();
    let cleanup = match args.openai_api_key {
        Some(api_key) => Some(CleanupClient::new(api_key)?),
        None => None,
    };

    let intermediate_dir = args
        .output_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("intermediate");
    ensure_directory(&intermediate_dir)?;

    let mut all_data = AllData {
        characters: Vec::new(),
    };

    let reparse = !args.characters.is_empty();
    if reparse && args.output_file.exists() {
        // Keep previously parsed characters that are not being re-parsed.
        let raw = fs::read(&args.output_file)
            .with_context(|| format!("failed to read {}", args.output_file.display()))?;
        let existing: AllData = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", args.output_file.display()))?;

        let requested: Vec<String> = args.characters.iter().map(|c| c.to_lowercase()).collect();
        all_data.characters.extend(
            existing
                .characters
                .into_iter()
                .filter(|character| !requested.contains(&character.name.to_lowercase())),
        );
    }

    let mut processed = 0_usize;
    if reparse {
        for name in &args.characters {
            let slug = file_slug(name);
            let raw_path = intermediate_dir.join(format!("{slug}_raw.json"));
            let html_path = args.input_dir.join(format!("{slug}_frame_data.html"));

            let char_data = if raw_path.exists() {
                info!(character = %name, path = %raw_path.display(), "re-parsing from raw data");
                let raw = fs::read(&raw_path)
                    .with_context(|| format!("failed to read {}", raw_path.display()))?;
                serde_json::from_slice(&raw)
                    .with_context(|| format!("failed to parse {}", raw_path.display()))?
            } else if html_path.exists() {
                parse_html_file(&config, &html_path, &intermediate_dir)?
            } else {
                warn!(character = %name, "no raw or html data found for character, skipping");
                continue;
            };

            all_data
                .characters
                .push(maybe_clean(cleanup.as_ref(), char_data, &intermediate_dir)?);
            processed += 1;
        }
    } else {
        for html_path in html_files(&args.input_dir)? {
            let char_data = parse_html_file(&config, &html_path, &intermediate_dir)?;
            all_data
                .characters
                .push(maybe_clean(cleanup.as_ref(), char_data, &intermediate_dir)?);
            processed += 1;
        }
    }

    write_json_pretty(&args.output_file, &all_data)?;
    info!(
        output = %args.output_file.display(),
        processed,
        total = all_data.characters.len(),
        "parse complete"
    );

    Ok(())
}

fn html_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read directory {}", input_dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("_frame_data.html"))
        })
        .collect();
    files.sort();

    Ok(files)
}

/// Parses one downloaded page into per-type row buckets, saving the raw
/// extraction as a per-character intermediate artifact.
fn parse_html_file(
    config: &ExtractConfig,
    html_path: &Path,
    intermediate_dir: &Path,
) -> Result<CharacterData> {
    let stem = html_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let slug = stem.trim_end_matches("_frame_data").to_string();
    let display_name = title_case(&slug);

    info!(character = %display_name, path = %html_path.display(), "parsing frame data page");

    let body = fs::read_to_string(html_path)
        .with_context(|| format!("failed to read {}", html_path.display()))?;
    let document = Html::parse_document(&body);

    let mut char_data = CharacterData::empty(&display_name);
    for record in extract_tables(config, &slug, &document)? {
        match record.table_type {
            TableType::NormalMoves => char_data.normal_moves.extend(record.rows),
            TableType::SpecialMoves => char_data.special_moves.extend(record.rows),
            TableType::OverdriveMoves => char_data.overdrive_moves.extend(record.rows),
            TableType::SystemCore => char_data.system_core.extend(record.rows),
            TableType::SystemJump => char_data.system_jump.extend(record.rows),
            other => {
                // The characters-object format has no bucket for these;
                // the crawl path carries them instead.
                info!(table = %record.table_name, table_type = %other, "table has no parse bucket, skipped");
            }
        }
    }

    let raw_path = intermediate_dir.join(format!("{}_raw.json", file_slug(&display_name)));
    write_json_pretty(&raw_path, &char_data)?;

    Ok(char_data)
}

/// Runs the external cleanup when configured, always falling back to the
/// uncleaned snapshot on failure.
fn maybe_clean(
    cleanup: Option<&CleanupClient>,
    char_data: CharacterData,
    intermediate_dir: &Path,
) -> Result<CharacterData> {
    let Some(client) = cleanup else {
        return Ok(char_data);
    };

    match client.clean_character(&char_data) {
        Ok(cleaned) => {
            let cleaned_path =
                intermediate_dir.join(format!("{}_cleaned.json", file_slug(&cleaned.name)));
            write_json_pretty(&cleaned_path, &cleaned)?;
            info!(character = %cleaned.name, path = %cleaned_path.display(), "saved cleaned data");
            Ok(cleaned)
        }
        Err(err) => {
            warn!(character = %char_data.name, error = %err, "cleanup failed, keeping raw extraction");
            Ok(char_data)
        }
    }
}
