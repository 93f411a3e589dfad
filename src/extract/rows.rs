use scraper::ElementRef;
use tracing::{debug, warn};

use super::ExtractConfig;
use crate::model::{Row, TableType};

/// Canonical field set every special/overdrive row is re-keyed onto.
const MOVE_FIELDS: &[&str] = &[
    "input",
    "damage",
    "guard",
    "startup",
    "active",
    "recovery",
    "on_block",
    "on_hit",
    "level",
    "counter_type",
    "invuln",
    "proration",
    "risc_gain",
    "risc_loss",
];

/// All text beneath an element, trimmed per node and space-joined, the way
/// the wiki nests formatting spans inside cells.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized headers from the table's first row, duplicates dropped
/// keeping the first occurrence (the wiki occasionally repeats a column).
pub fn extract_headers(config: &ExtractConfig, table: ElementRef<'_>) -> Vec<String> {
    let Some(header_row) = table.select(&config.row_selector).next() else {
        return Vec::new();
    };

    let mut headers: Vec<String> = Vec::new();
    for cell in header_row.select(&config.header_cell_selector) {
        let raw = element_text(cell);
        if raw.is_empty() {
            continue;
        }

        let normalized = config.normalize_header(&raw);
        if normalized.is_empty() || headers.contains(&normalized) {
            continue;
        }
        debug!(raw = %raw, normalized = %normalized, "accepted header");
        headers.push(normalized);
    }

    headers
}

/// Extracts row-aligned field maps from the table body.
///
/// Cells are matched to headers by position. A row shorter than the
/// header list gets explicit nulls for the missing trailing fields; extra
/// cells are reported, since positional alignment silently misreads them.
pub fn extract_rows(
    config: &ExtractConfig,
    table: ElementRef<'_>,
    headers: &[String],
    table_type: TableType,
) -> Vec<Row> {
    let mut rows = Vec::new();

    for (row_idx, tr) in table.select(&config.row_selector).enumerate() {
        let cells: Vec<ElementRef<'_>> = tr.select(&config.cell_selector).collect();
        if cells.is_empty() {
            // Header or spacer row.
            continue;
        }

        if cells.len() > headers.len() {
            warn!(
                row = row_idx,
                cells = cells.len(),
                headers = headers.len(),
                "row has more cells than headers; trailing cells ignored and alignment may be off"
            );
        }

        let mut row = Row::new();
        for (index, header) in headers.iter().enumerate() {
            match cells.get(index) {
                Some(cell) => {
                    row.insert(
                        header.clone(),
                        Some(config.normalize_cell(&element_text(*cell))),
                    );
                }
                None => {
                    warn!(row = row_idx, header = %header, "missing cell for header, recording null");
                    row.insert(header.clone(), None);
                }
            }
        }

        if row.values().all(|value| value.is_none()) {
            continue;
        }

        match table_type {
            TableType::SpecialMoves | TableType::OverdriveMoves => {
                if let Some(move_row) = rekey_move_row(&row, table_type) {
                    rows.push(move_row);
                } else {
                    warn!(row = row_idx, table_type = %table_type, "dropping move row without a resolvable name");
                }
            }
            _ => rows.push(row),
        }
    }

    rows
}

/// Non-empty value for a key, treating absent, null, and empty-string
/// cells alike.
fn non_empty(row: &Row, key: &str) -> Option<String> {
    row.get(key)
        .and_then(|value| value.clone())
        .filter(|value| !value.is_empty())
}

/// Re-keys a special/overdrive row onto the canonical move field set,
/// resolving the move name from the name column, then input, then command.
/// Returns `None` when no name can be resolved.
fn rekey_move_row(row: &Row, table_type: TableType) -> Option<Row> {
    let name = non_empty(row, "name")
        .or_else(|| non_empty(row, "input"))
        .or_else(|| non_empty(row, "command"))?;

    let mut keyed = Row::new();
    keyed.insert("name".to_string(), Some(name));
    for field in MOVE_FIELDS {
        let value = if *field == "input" {
            // Input stays a string for consistency with normal moves.
            Some(non_empty(row, "input").unwrap_or_default())
        } else {
            row.get(*field).cloned().flatten()
        };
        keyed.insert(field.to_string(), value);
    }

    if table_type == TableType::OverdriveMoves {
        let tension = row
            .get("tension_gain")
            .cloned()
            .flatten()
            .or_else(|| row.get("tension").cloned().flatten());
        keyed.insert("tension_gain".to_string(), tension);
    }

    Some(keyed)
}
