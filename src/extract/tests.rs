use scraper::{ElementRef, Html};

use super::*;
use crate::model::TableType;

fn first_table<'a>(config: &ExtractConfig, document: &'a Html) -> ElementRef<'a> {
    document
        .select(&config.table_selector)
        .next()
        .expect("fixture contains a table")
}

fn move_table_html(heading: &str, rows: &str) -> String {
    format!(
        r#"<html><body>
        <h2><span class="mw-headline">{heading}</span></h2>
        <table class="wikitable">
          <tr><th>Input</th><th>Damage</th><th>Guard</th><th>Startup</th></tr>
          {rows}
        </table>
        </body></html>"#
    )
}

#[test]
fn normalize_header_maps_known_synonyms() {
    let config = ExtractConfig::default();
    assert_eq!(config.normalize_header("r.i.s.c. gain"), "risc_gain");
    assert_eq!(config.normalize_header("On-Block"), "on_block");
    assert_eq!(config.normalize_header("dmg"), "damage");
    assert_eq!(config.normalize_header("rec"), "recovery");
    assert_eq!(config.normalize_header("Counter Hit Type"), "counter_type");
    assert_eq!(config.normalize_header("command"), "input");
}

#[test]
fn normalize_header_slugifies_unknown_headers() {
    let config = ExtractConfig::default();
    assert_eq!(config.normalize_header("Wall Stick Duration"), "wall_stick_duration");
    assert_eq!(config.normalize_header("R.A.M. Meter"), "ram_meter");
    assert_eq!(config.normalize_header("Servant Gauge (%)"), "servant_gauge_");
    assert_eq!(config.normalize_header("???"), "");
}

#[test]
fn normalize_header_output_is_lowercase_alnum_underscore() {
    let config = ExtractConfig::default();
    for raw in ["Weird-Header!", "A.B.C d-e", "  Spaced Out  ", "100% Burst"] {
        let normalized = config.normalize_header(raw);
        assert!(
            normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
            "`{raw}` normalized to `{normalized}`"
        );
    }
}

#[test]
fn normalize_header_is_idempotent_over_canonical_names() {
    let config = ExtractConfig::default();
    for raw in ["on block", "dmg", "r.i.s.c. loss", "jump duration"] {
        let once = config.normalize_header(raw);
        assert_eq!(config.normalize_header(&once), once);
    }
}

#[test]
fn injected_synonym_table_overrides_the_default() {
    let config = ExtractConfig::with_header_synonyms(&[("dmg", "dmg_total")]);
    assert_eq!(config.normalize_header("dmg"), "dmg_total");
    // No longer a synonym, so the fallback slugification applies.
    assert_eq!(config.normalize_header("on-block"), "on_block");
}

#[test]
fn normalize_cell_collapses_placeholders() {
    let config = ExtractConfig::default();
    assert_eq!(config.normalize_cell(""), "");
    assert_eq!(config.normalize_cell("-"), "");
    assert_eq!(config.normalize_cell("  -  "), "");
    assert_eq!(config.normalize_cell(" 28 "), "28");
    assert_eq!(config.normalize_cell("12-14"), "12-14");
    assert_eq!(config.normalize_cell("\u{00b1}0"), "\u{00b1}0");
}

#[test]
fn heading_strategy_classifies_move_tables() {
    let config = ExtractConfig::default();
    let cases = [
        ("Normal Moves", TableType::NormalMoves),
        ("Normals", TableType::NormalMoves),
        ("Special Moves", TableType::SpecialMoves),
        ("Overdrives", TableType::OverdriveMoves),
        ("Supers", TableType::OverdriveMoves),
        ("SUPER Moves", TableType::OverdriveMoves),
    ];

    for (heading, expected) in cases {
        let document = Html::parse_document(&move_table_html(heading, ""));
        let table = first_table(&config, &document);
        let classification = classify_table(&config, &document, table).expect("classified");
        assert_eq!(classification.table_type, expected, "heading `{heading}`");
    }
}

#[test]
fn heading_strategy_derives_table_name_from_heading() {
    let config = ExtractConfig::default();
    let document = Html::parse_document(&move_table_html("Normal Moves", ""));
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_name.as_deref(), Some("normal_moves"));
}

#[test]
fn section_edit_links_stay_out_of_heading_slugs() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline" id="Normal_Moves">Normal Moves</span><span class="mw-editsection">[ edit ]</span></h2>
        <table class="wikitable">
          <tr><th>Input</th></tr>
          <tr><td>5P</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::NormalMoves);
    assert_eq!(classification.table_name.as_deref(), Some("normal_moves"));
}

#[test]
fn heading_without_headline_span_is_treated_as_absent() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2>Normal Moves</h2>
        <table class="wikitable">
          <tr><th>Foo</th></tr>
          <tr><td>bar</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::Unknown);
    assert_eq!(classification.table_name, None);
}

#[test]
fn system_heading_with_defense_header_is_system_core() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline">System Data</span></h2>
        <table class="wikitable">
          <tr><th>Defense</th><th>Guts</th></tr>
          <tr><td>0.94</td><td>3</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::SystemCore);
}

#[test]
fn system_heading_variants_split_core_jump_other() {
    let config = ExtractConfig::default();
    let cases = [
        ("System Core Data", "Weight", TableType::SystemCore),
        ("System Jump Data", "Weight", TableType::SystemJump),
        ("System Data", "Jump Duration", TableType::SystemJump),
        ("System Misc", "Weight", TableType::SystemOther),
    ];

    for (heading, header, expected) in cases {
        let html = format!(
            r#"<html><body>
            <h2><span class="mw-headline">{heading}</span></h2>
            <table class="wikitable"><tr><th>{header}</th></tr><tr><td>1</td></tr></table>
            </body></html>"#
        );
        let document = Html::parse_document(&html);
        let table = first_table(&config, &document);
        let classification = classify_table(&config, &document, table).expect("classified");
        assert_eq!(classification.table_type, expected, "heading `{heading}`");
    }
}

#[test]
fn section_id_classifies_when_heading_is_inconclusive() {
    let config = ExtractConfig::default();
    let cases = [
        ("Special_Moves", TableType::SpecialMoves, "special_moves"),
        ("Normal_Moves", TableType::NormalMoves, "normal_moves"),
        ("Overdrives", TableType::OverdriveMoves, "overdrive_moves"),
        ("Other", TableType::CharacterSpecific, "other"),
    ];

    for (section_id, expected_type, expected_name) in cases {
        let html = format!(
            r#"<html><body>
            <h2><span class="mw-headline" id="{section_id}">Moves of Note</span></h2>
            <section>
            <table class="wikitable"><tr><th>Foo</th></tr><tr><td>bar</td></tr></table>
            </section>
            </body></html>"#
        );
        let document = Html::parse_document(&html);
        let table = first_table(&config, &document);
        let classification = classify_table(&config, &document, table).expect("classified");
        assert_eq!(classification.table_type, expected_type, "id `{section_id}`");
        assert_eq!(classification.table_name.as_deref(), Some(expected_name));
    }
}

#[test]
fn content_sniffing_recognizes_move_headers_without_a_heading() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <table class="wikitable">
          <tr><th>Input</th><th>Damage</th></tr>
          <tr><td>5P</td><td>28</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::NormalMoves);
    assert_eq!(classification.table_name.as_deref(), Some("normal_moves"));
}

#[test]
fn content_sniffing_requires_both_damage_and_startup() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <table class="wikitable">
          <tr><th>Damage Scaling</th><th>Startup Modifier</th></tr>
          <tr><td>80%</td><td>+2</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::NormalMoves);

    let html = r#"<html><body>
        <table class="wikitable">
          <tr><th>Damage Scaling</th><th>Level</th></tr>
          <tr><td>80%</td><td>2</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::Unknown);
}

#[test]
fn glossary_tables_are_never_yielded() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <table class="wikitable">
          <tr><th>Term</th><th>Meaning</th></tr>
          <tr><td>Frame data glossary</td><td>What is frame data anyway?</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    assert!(classify_table(&config, &document, table).is_none());

    let records = extract_tables(&config, "Sol_Badguy", &document).expect("extract");
    assert!(records.is_empty());
}

#[test]
fn unclassified_table_falls_back_to_unknown_with_heading_name() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline">Miscellaneous Data</span></h2>
        <table class="wikitable">
          <tr><th>Foo</th></tr>
          <tr><td>bar</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let classification = classify_table(&config, &document, table).expect("classified");
    assert_eq!(classification.table_type, TableType::Unknown);
    assert_eq!(
        classification.table_name.as_deref(),
        Some("miscellaneous_data")
    );
}

#[test]
fn headers_are_deduplicated_keeping_first_occurrence() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <table class="wikitable">
          <tr><th>Input</th><th>Damage</th><th>dmg</th><th>Guard</th></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    assert_eq!(extract_headers(&config, table), vec!["input", "damage", "guard"]);
}

#[test]
fn table_without_headers_is_skipped_not_an_error() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline">Normal Moves</span></h2>
        <table class="wikitable">
          <tr><td>5P</td><td>28</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let records = extract_tables(&config, "Sol_Badguy", &document).expect("extract");
    assert!(records.is_empty());
}

#[test]
fn short_rows_record_null_for_missing_trailing_fields() {
    let config = ExtractConfig::default();
    let document = Html::parse_document(&move_table_html(
        "Normal Moves",
        "<tr><td>5P</td><td>28</td></tr>",
    ));
    let table = first_table(&config, &document);
    let headers = extract_headers(&config, table);
    let rows = extract_rows(&config, table, &headers, TableType::NormalMoves);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["input"].as_deref(), Some("5P"));
    assert_eq!(rows[0]["damage"].as_deref(), Some("28"));
    assert_eq!(rows[0]["guard"], None);
    assert_eq!(rows[0]["startup"], None);
}

#[test]
fn placeholder_cells_become_empty_strings_not_nulls() {
    let config = ExtractConfig::default();
    let document = Html::parse_document(&move_table_html(
        "Normal Moves",
        "<tr><td>5P</td><td>-</td><td>All</td><td>4</td></tr>",
    ));
    let table = first_table(&config, &document);
    let headers = extract_headers(&config, table);
    let rows = extract_rows(&config, table, &headers, TableType::NormalMoves);

    assert_eq!(rows[0]["damage"].as_deref(), Some(""));
}

#[test]
fn special_move_name_falls_back_to_input() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline">Special Moves</span></h2>
        <table class="wikitable">
          <tr><th>Name</th><th>Input</th><th>Damage</th><th>Gatling</th></tr>
          <tr><td>-</td><td>236P</td><td>40</td><td>5K</td></tr>
          <tr><td>Gun Flame</td><td>236K</td><td>45</td><td>-</td></tr>
          <tr><td>-</td><td>-</td><td>50</td><td>-</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let headers = extract_headers(&config, table);
    let rows = extract_rows(&config, table, &headers, TableType::SpecialMoves);

    // The nameless third row is dropped.
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"].as_deref(), Some("236P"));
    assert_eq!(rows[0]["input"].as_deref(), Some("236P"));
    assert_eq!(rows[1]["name"].as_deref(), Some("Gun Flame"));

    // Re-keyed rows carry exactly the canonical move field set; the
    // gatling column is discarded.
    assert!(!rows[0].contains_key("gatling"));
    assert!(rows[0].contains_key("risc_gain"));
    assert!(rows[0].contains_key("on_block"));
}

#[test]
fn overdrive_rows_carry_tension_gain() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline">Overdrives</span></h2>
        <table class="wikitable">
          <tr><th>Name</th><th>Input</th><th>Tension Gain</th></tr>
          <tr><td>Tyrant Rave</td><td>632146H</td><td>+20</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let table = first_table(&config, &document);
    let headers = extract_headers(&config, table);
    let rows = extract_rows(&config, table, &headers, TableType::OverdriveMoves);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tension_gain"].as_deref(), Some("+20"));
}

#[test]
fn assemble_qualifies_and_synthesizes_table_names() {
    let named = assemble(
        "Sol_Badguy",
        TableType::NormalMoves,
        Some("normal_moves".to_string()),
        vec!["input".to_string()],
        Vec::new(),
    )
    .expect("assemble");
    assert_eq!(named.table_name, "Sol_Badguy.normal_moves");

    let synthesized = assemble(
        "Sol_Badguy",
        TableType::Unknown,
        None,
        vec!["foo".to_string()],
        vec![Row::new(), Row::new()],
    )
    .expect("assemble");
    assert_eq!(synthesized.table_name, "Sol_Badguy.unknown_2");

    assert!(assemble("", TableType::Unknown, None, Vec::new(), Vec::new()).is_err());
}

#[test]
fn end_to_end_normal_moves_page() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <h2><span class="mw-headline">Normal Moves</span></h2>
        <table class="wikitable">
          <tr><th>Input</th><th>Damage</th><th>Guard</th><th>Startup</th><th>Active</th>
              <th>Recovery</th><th>On Block</th><th>On Hit</th><th>Level</th></tr>
          <tr><td>5P</td><td>28</td><td>All</td><td>4</td><td>3</td>
              <td>9</td><td>-2</td><td>+1</td><td>1</td></tr>
        </table>
        </body></html>"#;
    let document = Html::parse_document(html);
    let records = extract_tables(&config, "Sol_Badguy", &document).expect("extract");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.table_type, TableType::NormalMoves);
    assert_eq!(record.table_name, "Sol_Badguy.normal_moves");
    assert_eq!(
        record.headers,
        vec![
            "input", "damage", "guard", "startup", "active", "recovery", "on_block", "on_hit",
            "level"
        ]
    );

    assert_eq!(record.rows.len(), 1);
    let row = &record.rows[0];
    assert_eq!(row["input"].as_deref(), Some("5P"));
    assert_eq!(row["damage"].as_deref(), Some("28"));
    assert_eq!(row["guard"].as_deref(), Some("All"));
    assert_eq!(row["startup"].as_deref(), Some("4"));
    assert_eq!(row["active"].as_deref(), Some("3"));
    assert_eq!(row["recovery"].as_deref(), Some("9"));
    assert_eq!(row["on_block"].as_deref(), Some("-2"));
    assert_eq!(row["on_hit"].as_deref(), Some("+1"));
    assert_eq!(row["level"].as_deref(), Some("1"));
}

#[test]
fn table_with_headers_but_no_rows_is_still_emitted() {
    let config = ExtractConfig::default();
    let document = Html::parse_document(&move_table_html("Normal Moves", ""));
    let records = extract_tables(&config, "Sol_Badguy", &document).expect("extract");

    assert_eq!(records.len(), 1);
    assert!(records[0].rows.is_empty());
    assert!(!records[0].headers.is_empty());
}

#[test]
fn discovery_deduplicates_roster_links() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <div class="add-hover-effect">
          <a href="/W/GGST/Sol_Badguy/Overview">Sol</a>
          <a href="/W/GGST/Sol_Badguy/Frame_Data">Sol frame data</a>
        </div>
        </body></html>"#;
    let document = Html::parse_document(html);
    assert_eq!(discover_characters(&config, &document), vec!["Sol_Badguy"]);
}

#[test]
fn discovery_unions_grid_and_fallback_selectors() {
    let config = ExtractConfig::default();
    let html = r#"<html><body>
        <div class="home-card"><a href="/w/GGST/Ky_Kiske">Ky</a></div>
        <p><a href="/w/GGST/Testament/Overview">Testament</a></p>
        <a href="/w/GGST/Patch_Notes">Patch notes</a>
        <a href="/w/Other_Game/May">wrong game</a>
        </body></html>"#;
    let document = Html::parse_document(html);
    assert_eq!(
        discover_characters(&config, &document),
        vec!["Ky_Kiske", "Testament"]
    );
}

#[test]
fn discovery_excludes_non_character_pages() {
    let config = ExtractConfig::default();
    let html = r#"<html><body><div class="char-grid">
        <a href="/w/GGST/Mechanics">Mechanics</a>
        <a href="/w/GGST/HUD">HUD</a>
        <a href="/w/GGST/FAQ">FAQ</a>
        <a href="/w/GGST/Patch_Notes">Patch notes</a>
        </div></body></html>"#;
    let document = Html::parse_document(html);
    assert!(discover_characters(&config, &document).is_empty());
}
