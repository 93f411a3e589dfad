use std::collections::HashMap;

use anyhow::{Result, bail};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::model::{Row, TableRecord, TableType};

mod classify;
mod discover;
mod rows;
#[cfg(test)]
mod tests;

pub use classify::{Classification, classify_table};
pub use discover::discover_characters;
pub use rows::{extract_headers, extract_rows};

/// Immutable lookup data driving classification and normalization.
///
/// Constructed once and passed into the extractor so tests can inject
/// alternate synonym or exclusion tables.
pub struct ExtractConfig {
    header_synonyms: HashMap<String, String>,
    placeholder_cells: Vec<String>,
    skip_markers: Vec<String>,
    roster_selectors: Vec<Selector>,
    character_path_regex: Regex,
    excluded_path_segments: Vec<String>,
    table_selector: Selector,
    header_cell_selector: Selector,
    row_selector: Selector,
    cell_selector: Selector,
    heading_selector: Selector,
    headline_selector: Selector,
}

/// Known header variants on hand-edited wiki pages, mapped to canonical
/// field names. Keys are already lower-cased.
const HEADER_SYNONYMS: &[(&str, &str)] = &[
    ("r.i.s.c. gain", "risc_gain"),
    ("r.i.s.c. loss", "risc_loss"),
    ("r.i.s.c gain", "risc_gain"),
    ("r.i.s.c loss", "risc_loss"),
    // One-dot-leader variants pasted from the wiki's cargo tables.
    ("r․i․s․c․ gain", "risc_gain"),
    ("r․i․s․c․ loss", "risc_loss"),
    ("risc gain", "risc_gain"),
    ("risc loss", "risc_loss"),
    ("on-block", "on_block"),
    ("on block", "on_block"),
    ("on-hit", "on_hit"),
    ("on hit", "on_hit"),
    ("counter type", "counter_type"),
    ("counter hit type", "counter_type"),
    ("ch type", "counter_type"),
    ("move name", "name"),
    ("name", "name"),
    ("input", "input"),
    ("command", "input"),
    ("startup", "startup"),
    ("start up", "startup"),
    ("active", "active"),
    ("active frames", "active"),
    ("recovery", "recovery"),
    ("rec", "recovery"),
    ("recovery frames", "recovery"),
    ("total", "total_frames"),
    ("total frames", "total_frames"),
    ("damage", "damage"),
    ("dmg", "damage"),
    ("guard", "guard"),
    ("guard type", "guard"),
    ("block type", "guard"),
    ("level", "level"),
    ("attack level", "level"),
    ("invuln", "invuln"),
    ("invulnerability", "invuln"),
    ("inv", "invuln"),
    ("proration", "proration"),
    ("tension", "tension"),
    ("tension gain", "tension_gain"),
    ("chip", "chip_damage"),
    ("chip damage", "chip_damage"),
    ("chip ratio", "chip_ratio"),
    ("wall damage", "wall_damage"),
    ("wall dmg", "wall_damage"),
    ("wall break", "wall_break"),
    ("otg ratio", "otg_ratio"),
    ("otg", "otg_ratio"),
    ("defense", "defense"),
    ("def", "defense"),
    ("guts", "guts"),
    ("weight", "weight"),
    ("prejump", "prejump"),
    ("pre-jump", "prejump"),
    ("backdash duration", "backdash_duration"),
    ("backdash invuln", "backdash_invuln"),
    ("backdash airborne", "backdash_airborne"),
    ("forward dash", "forward_dash"),
    ("unique movement options", "unique_movement_options"),
    ("jump duration", "jump_duration"),
    ("high jump duration", "high_jump_duration"),
    ("jump height", "jump_height"),
    ("high jump height", "high_jump_height"),
    ("pre-instant air dash", "pre_instant_air_dash"),
    ("air dash duration", "air_dash_duration"),
    ("air backdash duration", "air_backdash_duration"),
    ("air dash distance", "air_dash_distance"),
    ("air backdash distance", "air_backdash_distance"),
    ("movement tension gain", "movement_tension_gain"),
    ("jumping tension gain", "jumping_tension_gain"),
    ("air dash tension gain", "air_dash_tension_gain"),
    ("walk speed", "walk_speed"),
    ("run speed", "run_speed"),
    ("backwalk speed", "backwalk_speed"),
    ("dash speed", "dash_speed"),
    ("initial dash speed", "initial_dash_speed"),
    ("dash acceleration", "dash_acceleration"),
    ("friction", "friction"),
    ("notes", "notes"),
    ("properties", "properties"),
    ("attribute", "attribute"),
    ("attributes", "attributes"),
    ("cancels", "cancels"),
    ("special cancel", "special_cancel"),
    ("super cancel", "super_cancel"),
    ("chain cancel", "chain_cancel"),
    ("gatling", "gatling"),
    ("gatling options", "gatling"),
];

const SKIP_MARKERS: &[&str] = &["glossary", "what is frame data"];

/// Roster-grid anchors, most specific first; the last entry is the
/// generic any-character-link fallback.
const ROSTER_SELECTORS: &[&str] = &[
    "div.char-grid a",
    "div.add-hover-effect a",
    "div.home-card a",
    "a[href*=\"/GGST/\"]",
];

/// Non-character pages living under the same path prefix.
const EXCLUDED_PATH_SEGMENTS: &[&str] = &["Patch_Notes", "Frame_Data", "Mechanics", "HUD", "FAQ"];

pub const CHARACTER_PATH_PREFIX: &str = "/GGST/";

fn parse_selector(css: &str) -> Selector {
    // Selectors here are compile-time constants; a parse failure is a bug.
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector `{css}`: {err:?}"))
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header_synonyms: HEADER_SYNONYMS
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
            placeholder_cells: vec!["-".to_string()],
            skip_markers: SKIP_MARKERS.iter().map(|s| s.to_string()).collect(),
            roster_selectors: ROSTER_SELECTORS
                .iter()
                .map(|css| parse_selector(css))
                .collect(),
            character_path_regex: Regex::new(&format!(
                "{}([^/]+)",
                regex::escape(CHARACTER_PATH_PREFIX)
            ))
            .expect("character path regex"),
            excluded_path_segments: EXCLUDED_PATH_SEGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            table_selector: parse_selector(
                "table.wikitable, table.cargoTable, table.cargoDynamicTable",
            ),
            header_cell_selector: parse_selector("th"),
            row_selector: parse_selector("tr"),
            cell_selector: parse_selector("td"),
            heading_selector: parse_selector("h2"),
            headline_selector: parse_selector("span.mw-headline"),
        }
    }
}

impl ExtractConfig {
    /// Builds a config with a replacement synonym table, for tests.
    #[cfg(test)]
    pub fn with_header_synonyms(synonyms: &[(&str, &str)]) -> Self {
        Self {
            header_synonyms: synonyms
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Maps a raw column header onto its canonical field name.
    ///
    /// Synonym lookup first, then fallback slugification: strip periods,
    /// turn dashes and spaces into underscores, drop anything that is not
    /// alphanumeric or underscore. Idempotent over its own output.
    pub fn normalize_header(&self, raw: &str) -> String {
        let clean = raw.trim().to_lowercase();

        if let Some(canonical) = self.header_synonyms.get(&clean) {
            return canonical.clone();
        }

        clean
            .replace('.', "")
            .replace(['-', ' '], "_")
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect()
    }

    /// Trims a cell value, collapsing empty and placeholder cells to `""`.
    pub fn normalize_cell(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.placeholder_cells.iter().any(|p| p == trimmed) {
            return String::new();
        }
        trimmed.to_string()
    }

    pub fn is_excluded_path(&self, href: &str) -> bool {
        self.excluded_path_segments
            .iter()
            .any(|segment| href.contains(segment))
    }
}

/// Packages classification output and extracted rows into a [`TableRecord`].
///
/// Qualifies the table name as `"{character}.{slug}"`, synthesizing a name
/// from the type and row count when classification produced none.
pub fn assemble(
    character: &str,
    table_type: TableType,
    table_name: Option<String>,
    headers: Vec<String>,
    rows: Vec<Row>,
) -> Result<TableRecord> {
    if character.is_empty() {
        bail!("cannot assemble a table record without a character");
    }

    let slug = table_name.unwrap_or_else(|| format!("{}_{}", table_type, rows.len()));

    Ok(TableRecord {
        character: character.to_string(),
        table_name: format!("{character}.{slug}"),
        table_type,
        headers,
        rows,
    })
}

/// Runs the full classify/extract/assemble pass over one frame-data page.
pub fn extract_tables(
    config: &ExtractConfig,
    character: &str,
    document: &Html,
) -> Result<Vec<TableRecord>> {
    let mut records = Vec::new();

    let tables: Vec<_> = document.select(&config.table_selector).collect();
    info!(character, table_count = tables.len(), "scanning tables");

    for table in tables {
        let Some(classification) = classify_table(config, document, table) else {
            debug!(character, "table excluded by skip markers");
            continue;
        };

        let headers = extract_headers(config, table);
        if headers.is_empty() {
            warn!(character, table_type = %classification.table_type, "no headers found in table, skipping");
            continue;
        }

        let rows = extract_rows(config, table, &headers, classification.table_type);
        info!(
            character,
            table_type = %classification.table_type,
            row_count = rows.len(),
            "extracted table"
        );

        records.push(assemble(
            character,
            classification.table_type,
            classification.table_name,
            headers,
            rows,
        )?);
    }

    Ok(records)
}
