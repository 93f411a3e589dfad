use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::ExtractConfig;
use super::rows::element_text;
use crate::model::TableType;

/// Semantic type plus the display slug a strategy derived for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub table_type: TableType,
    pub table_name: Option<String>,
}

/// What one detection strategy had to say about a table.
enum Outcome {
    /// Confident result; the chain stops here.
    Classified(Classification),
    /// The table is not frame data at all and must not be emitted.
    Skip,
    /// No opinion; the next strategy gets a look.
    Pass,
}

/// Signals gathered once per table, shared by every strategy.
struct TableContext {
    /// Text of the nearest preceding level-2 heading.
    heading: Option<String>,
    /// Heading id of the enclosing section, when the page wraps tables
    /// in `<section>` elements.
    section_id: Option<String>,
    /// Raw header-cell texts, in source order.
    header_cells: Vec<String>,
    full_text_lower: String,
}

type Strategy = fn(&ExtractConfig, &TableContext) -> Outcome;

/// Ordered from most specific signal (explicit authoring structure) to
/// least specific (keyword sniffing); the first confident result wins, so
/// content sniffing never overrides an explicit heading.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("preceding_heading", by_preceding_heading),
    ("section_id", by_section_id),
    ("header_content", by_header_content),
    ("skip_markers", by_skip_markers),
];

/// Decides a table's semantic type and display name.
///
/// Returns `None` for tables that must be skipped entirely (glossary and
/// other non-frame-data content); everything else classifies, falling back
/// to [`TableType::Unknown`] rather than failing, so ambiguous tables are
/// preserved for manual inspection instead of dropped.
pub fn classify_table(
    config: &ExtractConfig,
    document: &Html,
    table: ElementRef<'_>,
) -> Option<Classification> {
    let ctx = build_context(config, document, table);

    for (name, strategy) in STRATEGIES {
        match strategy(config, &ctx) {
            Outcome::Classified(classification) => {
                debug!(
                    strategy = name,
                    table_type = %classification.table_type,
                    "classified table"
                );
                return Some(classification);
            }
            Outcome::Skip => return None,
            Outcome::Pass => {}
        }
    }

    // The heading-derived slug survives even when no strategy recognized
    // the type, matching how the wiki names one-off character tables.
    Some(Classification {
        table_type: TableType::Unknown,
        table_name: ctx.heading.as_deref().map(heading_slug),
    })
}

fn build_context(config: &ExtractConfig, document: &Html, table: ElementRef<'_>) -> TableContext {
    let heading = nearest_preceding(document, &config.heading_selector, table)
        .and_then(|h2| heading_text(config, h2));

    let section_id = enclosing_section_id(config, table);

    let header_cells = table
        .select(&config.header_cell_selector)
        .map(element_text)
        .collect();

    TableContext {
        heading,
        section_id,
        header_cells,
        full_text_lower: element_text(table).to_lowercase(),
    }
}

fn by_preceding_heading(_config: &ExtractConfig, ctx: &TableContext) -> Outcome {
    let Some(heading) = &ctx.heading else {
        return Outcome::Pass;
    };

    let lower = heading.to_lowercase();
    let name = Some(heading_slug(heading));

    let table_type = if lower.contains("system") {
        if lower.contains("core") || ctx.header_cell_contains("Defense") || ctx.header_cell_contains("Guts") {
            TableType::SystemCore
        } else if lower.contains("jump") || ctx.header_cell_contains("Jump Duration") {
            TableType::SystemJump
        } else {
            TableType::SystemOther
        }
    } else if lower.contains("normal") {
        TableType::NormalMoves
    } else if lower.contains("special") {
        TableType::SpecialMoves
    } else if lower.contains("overdrive") || lower.contains("super") {
        TableType::OverdriveMoves
    } else {
        return Outcome::Pass;
    };

    Outcome::Classified(Classification {
        table_type,
        table_name: name,
    })
}

fn by_section_id(_config: &ExtractConfig, ctx: &TableContext) -> Outcome {
    let Some(section_id) = ctx.section_id.as_deref() else {
        return Outcome::Pass;
    };

    let (table_type, name) = match section_id {
        "Special_Moves" => (TableType::SpecialMoves, "special_moves"),
        "Normal_Moves" => (TableType::NormalMoves, "normal_moves"),
        "Overdrives" => (TableType::OverdriveMoves, "overdrive_moves"),
        "Other" => (TableType::CharacterSpecific, "other"),
        _ => return Outcome::Pass,
    };

    Outcome::Classified(Classification {
        table_type,
        table_name: Some(name.to_string()),
    })
}

fn by_header_content(_config: &ExtractConfig, ctx: &TableContext) -> Outcome {
    let (table_type, name) = if ctx.header_cell_contains("Defense") || ctx.header_cell_contains("Guts") {
        (TableType::SystemCore, "system_core")
    } else if ctx.header_cell_contains("Jump Duration") {
        (TableType::SystemJump, "system_jump")
    } else if ctx.looks_like_move_headers() {
        (TableType::NormalMoves, "normal_moves")
    } else {
        return Outcome::Pass;
    };

    Outcome::Classified(Classification {
        table_type,
        table_name: Some(name.to_string()),
    })
}

fn by_skip_markers(config: &ExtractConfig, ctx: &TableContext) -> Outcome {
    if config
        .skip_markers
        .iter()
        .any(|marker| ctx.full_text_lower.contains(marker))
    {
        return Outcome::Skip;
    }
    Outcome::Pass
}

impl TableContext {
    fn header_cell_contains(&self, needle: &str) -> bool {
        self.header_cells.iter().any(|cell| cell.contains(needle))
    }

    fn looks_like_move_headers(&self) -> bool {
        let lowered: Vec<String> = self.header_cells.iter().map(|h| h.to_lowercase()).collect();
        let mentions = |needle: &str| lowered.iter().any(|h| h.contains(needle));

        mentions("input")
            || mentions("command")
            || mentions("move")
            || (mentions("damage") && mentions("startup"))
    }
}

fn heading_slug(heading: &str) -> String {
    heading.trim().to_lowercase().replace(' ', "_")
}

/// Heading text is only ever read from the headline span; the raw `<h2>`
/// also contains the section edit link, which must not leak into slugs.
/// A heading without the span is treated as absent.
fn heading_text(config: &ExtractConfig, h2: ElementRef<'_>) -> Option<String> {
    h2.select(&config.headline_selector).next().map(element_text)
}

/// Nearest element matching `selector` that appears before `table` in
/// document order. Linear scan; frame-data pages are small.
fn nearest_preceding<'a>(
    document: &'a Html,
    selector: &Selector,
    table: ElementRef<'a>,
) -> Option<ElementRef<'a>> {
    let mut last = None;
    for node in document.tree.root().descendants() {
        if node.id() == table.id() {
            return last;
        }
        if let Some(element) = ElementRef::wrap(node) {
            if selector.matches(&element) {
                last = Some(element);
            }
        }
    }
    None
}

/// Heading id of the `<section>` wrapping the table: the id of the
/// headline span inside the section's nearest preceding `<h2>` sibling.
fn enclosing_section_id(config: &ExtractConfig, table: ElementRef<'_>) -> Option<String> {
    let section = table
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "section")?;

    let h2 = section
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "h2")?;

    h2.select(&config.headline_selector)
        .next()
        .and_then(|span| span.value().attr("id"))
        .or_else(|| h2.value().attr("id"))
        .map(str::to_string)
}
