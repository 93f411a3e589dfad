use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::info;

use crate::cli::ImportArgs;
use crate::model::{AllData, ImportInput, TableRecord, TableType};
use crate::util::now_utc_string;

mod convert;
mod schema;

use convert::{GatlingEntity, MoveEntity, SystemCoreEntity, SystemJumpEntity};
use schema::{configure_connection, ensure_schema, truncate_all};

/// Every table the importer owns, in truncation order.
pub fn schema_tables() -> &'static [&'static str] {
    schema::ALL_TABLES
}

#[derive(Debug, Default)]
struct ImportCounts {
    characters: usize,
    normal_moves: usize,
    special_moves: usize,
    overdrive_moves: usize,
    system_core: usize,
    system_jump: usize,
    gatling_rows: usize,
    character_specific: usize,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let raw = fs::read(&args.json_path)
        .with_context(|| format!("failed to read {}", args.json_path.display()))?;

    // Malformed input is a distinct failure from anything the database
    // layer can produce.
    let input: ImportInput = serde_json::from_slice(&raw).with_context(|| {
        format!(
            "invalid input file {}: not a table array or characters object",
            args.json_path.display()
        )
    })?;

    let mut connection = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    // One unit of work: any failure below rolls the whole import back.
    let tx = connection.transaction()?;
    truncate_all(&tx)?;

    let counts = match input {
        ImportInput::Tables(records) => import_records(&tx, &records)?,
        ImportInput::Characters(all_data) => import_characters(&tx, &all_data)?,
    };

    tx.commit().context("failed to commit import transaction")?;

    info!(
        db = %args.db_path.display(),
        characters = counts.characters,
        normal_moves = counts.normal_moves,
        special_moves = counts.special_moves,
        overdrive_moves = counts.overdrive_moves,
        system_core = counts.system_core,
        system_jump = counts.system_jump,
        gatling_rows = counts.gatling_rows,
        character_specific = counts.character_specific,
        "import complete"
    );

    Ok(())
}

fn import_records(conn: &Connection, records: &[TableRecord]) -> Result<ImportCounts> {
    let mut counts = ImportCounts::default();
    let mut characters_seen: HashSet<String> = HashSet::new();

    for record in records {
        if characters_seen.insert(record.character.clone()) {
            insert_character(conn, &record.character)?;
            counts.characters += 1;
        }

        let context = || format!("importing table {}", record.table_name);
        match record.table_type {
            TableType::SystemCore => {
                // The wiki renders system stats as one-row tables.
                if let Some(row) = record.rows.first() {
                    insert_system_core(conn, record, &convert::system_core(row))?;
                    counts.system_core += 1;
                }
            }
            TableType::SystemJump => {
                if let Some(row) = record.rows.first() {
                    insert_system_jump(conn, record, &convert::system_jump(row))?;
                    counts.system_jump += 1;
                }
            }
            TableType::NormalMoves => {
                for row in &record.rows {
                    let entity = convert::normal_move(row).with_context(context)?;
                    insert_normal_move(conn, &record.character, &record.table_name, &entity)?;
                    counts.normal_moves += 1;
                }
            }
            TableType::SpecialMoves => {
                for row in &record.rows {
                    let entity = convert::named_move(row, "special_moves").with_context(context)?;
                    insert_named_move(conn, "special_moves", record, &entity)?;
                    counts.special_moves += 1;
                }
            }
            TableType::OverdriveMoves => {
                for row in &record.rows {
                    let entity =
                        convert::named_move(row, "overdrive_moves").with_context(context)?;
                    insert_named_move(conn, "overdrive_moves", record, &entity)?;
                    counts.overdrive_moves += 1;
                }
            }
            _ if record.table_name.to_lowercase().contains("gatling") => {
                for row in &record.rows {
                    insert_gatling(conn, record, &convert::gatling(row))?;
                    counts.gatling_rows += 1;
                }
            }
            _ => {
                insert_character_specific(conn, record)?;
                counts.character_specific += 1;
            }
        }
    }

    Ok(counts)
}

fn import_characters(conn: &Connection, all_data: &AllData) -> Result<ImportCounts> {
    let mut counts = ImportCounts::default();

    for character in &all_data.characters {
        let slug = character.name.replace(' ', "_");
        insert_character(conn, &slug)?;
        counts.characters += 1;

        // Bucketed rows carry no per-table name of their own; synthesize
        // the qualified name from the bucket.
        let bucket_record = |table_type: TableType| TableRecord {
            character: slug.clone(),
            table_name: format!("{slug}.{table_type}"),
            table_type,
            headers: Vec::new(),
            rows: Vec::new(),
        };

        let normal_table_name = format!("{slug}.normal_moves");
        for row in &character.normal_moves {
            let entity = convert::normal_move(row)
                .with_context(|| format!("importing normal moves for {slug}"))?;
            insert_normal_move(conn, &slug, &normal_table_name, &entity)?;
            counts.normal_moves += 1;
        }

        let special_record = bucket_record(TableType::SpecialMoves);
        for row in &character.special_moves {
            let entity = convert::named_move(row, "special_moves")
                .with_context(|| format!("importing special moves for {slug}"))?;
            insert_named_move(conn, "special_moves", &special_record, &entity)?;
            counts.special_moves += 1;
        }

        let overdrive_record = bucket_record(TableType::OverdriveMoves);
        for row in &character.overdrive_moves {
            let entity = convert::named_move(row, "overdrive_moves")
                .with_context(|| format!("importing overdrive moves for {slug}"))?;
            insert_named_move(conn, "overdrive_moves", &overdrive_record, &entity)?;
            counts.overdrive_moves += 1;
        }

        if let Some(row) = character.system_core.first() {
            let record = bucket_record(TableType::SystemCore);
            insert_system_core(conn, &record, &convert::system_core(row))?;
            counts.system_core += 1;
        }
        if let Some(row) = character.system_jump.first() {
            let record = bucket_record(TableType::SystemJump);
            insert_system_jump(conn, &record, &convert::system_jump(row))?;
            counts.system_jump += 1;
        }
    }

    Ok(counts)
}

/// Characters are created once per slug on first encounter; table rows
/// reference them by the character string, not a foreign key.
fn insert_character(conn: &Connection, slug: &str) -> Result<()> {
    let now = now_utc_string();
    conn.execute(
        "INSERT INTO characters(name, slug, display_name, created_at, updated_at)
         VALUES (?1, ?1, ?2, ?3, ?3)",
        params![slug, slug.replace('_', " "), now],
    )
    .with_context(|| format!("failed to insert character {slug}"))?;
    Ok(())
}

fn insert_normal_move(
    conn: &Connection,
    character: &str,
    table_name: &str,
    entity: &MoveEntity,
) -> Result<()> {
    conn.execute(
        "INSERT INTO normal_moves(
           character, table_name, table_type, input, damage, guard, startup, active,
           recovery, on_block, on_hit, level, counter_type, invuln, proration,
           risc_gain, risc_loss, notes, created_at)
         VALUES (?1, ?2, 'normal_moves', ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                 ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            character,
            table_name,
            entity.input,
            entity.damage,
            entity.guard,
            entity.startup,
            entity.active,
            entity.recovery,
            entity.on_block,
            entity.on_hit,
            entity.level,
            entity.counter_type,
            entity.invuln,
            entity.proration,
            entity.risc_gain,
            entity.risc_loss,
            entity.notes,
            now_utc_string(),
        ],
    )
    .with_context(|| format!("failed to insert normal move for {character}"))?;
    Ok(())
}

fn insert_named_move(
    conn: &Connection,
    table: &str,
    record: &TableRecord,
    entity: &MoveEntity,
) -> Result<()> {
    let name = entity.name.as_deref().unwrap_or_default();
    match table {
        "special_moves" => conn.execute(
            "INSERT INTO special_moves(
               character, table_name, table_type, name, input, damage, guard, startup,
               active, recovery, on_block, on_hit, level, counter_type, invuln,
               proration, risc_gain, risc_loss, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20)",
            params![
                record.character,
                record.table_name,
                record.table_type.as_str(),
                name,
                entity.input,
                entity.damage,
                entity.guard,
                entity.startup,
                entity.active,
                entity.recovery,
                entity.on_block,
                entity.on_hit,
                entity.level,
                entity.counter_type,
                entity.invuln,
                entity.proration,
                entity.risc_gain,
                entity.risc_loss,
                entity.notes,
                now_utc_string(),
            ],
        ),
        _ => conn.execute(
            "INSERT INTO overdrive_moves(
               character, table_name, table_type, name, input, damage, guard, startup,
               active, recovery, on_block, on_hit, level, counter_type, invuln,
               proration, risc_gain, risc_loss, tension_gain, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                record.character,
                record.table_name,
                record.table_type.as_str(),
                name,
                entity.input,
                entity.damage,
                entity.guard,
                entity.startup,
                entity.active,
                entity.recovery,
                entity.on_block,
                entity.on_hit,
                entity.level,
                entity.counter_type,
                entity.invuln,
                entity.proration,
                entity.risc_gain,
                entity.risc_loss,
                entity.tension_gain,
                entity.notes,
                now_utc_string(),
            ],
        ),
    }
    .with_context(|| format!("failed to insert {table} row for {}", record.character))?;
    Ok(())
}

fn insert_system_core(
    conn: &Connection,
    record: &TableRecord,
    entity: &SystemCoreEntity,
) -> Result<()> {
    conn.execute(
        "INSERT INTO system_core_data(
           character, table_name, table_type, defense, guts, risc_gain_modifier,
           prejump, backdash_duration, backdash_invuln, backdash_airborne,
           forward_dash, unique_movement_options, movement_tension_gain, weight,
           created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            record.character,
            record.table_name,
            record.table_type.as_str(),
            entity.defense,
            entity.guts,
            entity.risc_gain_modifier,
            entity.prejump,
            entity.backdash_duration,
            entity.backdash_invuln,
            entity.backdash_airborne,
            entity.forward_dash,
            entity.unique_movement_options,
            entity.movement_tension_gain,
            entity.weight,
            now_utc_string(),
        ],
    )
    .with_context(|| format!("failed to insert system core row for {}", record.character))?;
    Ok(())
}

fn insert_system_jump(
    conn: &Connection,
    record: &TableRecord,
    entity: &SystemJumpEntity,
) -> Result<()> {
    conn.execute(
        "INSERT INTO system_jump_data(
           character, table_name, table_type, jump_duration, high_jump_duration,
           jump_height, high_jump_height, pre_instant_air_dash, air_dash_duration,
           air_backdash_duration, air_dash_distance, air_backdash_distance,
           jumping_tension_gain, air_dash_tension_gain, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            record.character,
            record.table_name,
            record.table_type.as_str(),
            entity.jump_duration,
            entity.high_jump_duration,
            entity.jump_height,
            entity.high_jump_height,
            entity.pre_instant_air_dash,
            entity.air_dash_duration,
            entity.air_backdash_duration,
            entity.air_dash_distance,
            entity.air_backdash_distance,
            entity.jumping_tension_gain,
            entity.air_dash_tension_gain,
            now_utc_string(),
        ],
    )
    .with_context(|| format!("failed to insert system jump row for {}", record.character))?;
    Ok(())
}

fn insert_gatling(conn: &Connection, record: &TableRecord, entity: &GatlingEntity) -> Result<()> {
    let as_json = |list: &[String]| serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO gatling_tables(
           character, table_name, table_type, p_moves, k_moves, s_moves, h_moves,
           d_moves, cancel_options, created_at)
         VALUES (?1, ?2, 'gatling', ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.character,
            record.table_name,
            as_json(&entity.p_moves),
            as_json(&entity.k_moves),
            as_json(&entity.s_moves),
            as_json(&entity.h_moves),
            as_json(&entity.d_moves),
            as_json(&entity.cancel_options),
            now_utc_string(),
        ],
    )
    .with_context(|| format!("failed to insert gatling row for {}", record.character))?;
    Ok(())
}

fn insert_character_specific(conn: &Connection, record: &TableRecord) -> Result<()> {
    let headers = serde_json::to_string(&record.headers).context("failed to serialize headers")?;
    let rows = serde_json::to_string(&record.rows).context("failed to serialize rows")?;
    conn.execute(
        "INSERT INTO character_specific_tables(
           character, table_name, table_type, headers, rows, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.character,
            record.table_name,
            record.table_type.as_str(),
            headers,
            rows,
            now_utc_string(),
        ],
    )
    .with_context(|| {
        format!(
            "failed to insert character-specific table {}",
            record.table_name
        )
    })?;
    Ok(())
}
