use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS characters (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          slug TEXT NOT NULL UNIQUE,
          display_name TEXT NOT NULL,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS normal_moves (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          input TEXT NOT NULL,
          damage TEXT,
          guard TEXT,
          startup TEXT,
          active TEXT,
          recovery TEXT,
          on_block TEXT,
          on_hit TEXT,
          level TEXT,
          counter_type TEXT,
          invuln TEXT,
          proration TEXT,
          risc_gain TEXT,
          risc_loss TEXT,
          notes TEXT,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS special_moves (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          name TEXT NOT NULL,
          input TEXT NOT NULL,
          damage TEXT,
          guard TEXT,
          startup TEXT,
          active TEXT,
          recovery TEXT,
          on_block TEXT,
          on_hit TEXT,
          level TEXT,
          counter_type TEXT,
          invuln TEXT,
          proration TEXT,
          risc_gain TEXT,
          risc_loss TEXT,
          notes TEXT,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS overdrive_moves (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          name TEXT NOT NULL,
          input TEXT NOT NULL,
          damage TEXT,
          guard TEXT,
          startup TEXT,
          active TEXT,
          recovery TEXT,
          on_block TEXT,
          on_hit TEXT,
          level TEXT,
          counter_type TEXT,
          invuln TEXT,
          proration TEXT,
          risc_gain TEXT,
          risc_loss TEXT,
          tension_gain TEXT,
          notes TEXT,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS system_core_data (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          defense TEXT,
          guts TEXT,
          risc_gain_modifier TEXT,
          prejump TEXT,
          backdash_duration TEXT,
          backdash_invuln TEXT,
          backdash_airborne TEXT,
          forward_dash TEXT,
          unique_movement_options TEXT,
          movement_tension_gain TEXT,
          weight TEXT,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS system_jump_data (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          jump_duration TEXT,
          high_jump_duration TEXT,
          jump_height TEXT,
          high_jump_height TEXT,
          pre_instant_air_dash TEXT,
          air_dash_duration TEXT,
          air_backdash_duration TEXT,
          air_dash_distance TEXT,
          air_backdash_distance TEXT,
          jumping_tension_gain TEXT,
          air_dash_tension_gain TEXT,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS gatling_tables (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          p_moves TEXT NOT NULL,
          k_moves TEXT NOT NULL,
          s_moves TEXT NOT NULL,
          h_moves TEXT NOT NULL,
          d_moves TEXT NOT NULL,
          cancel_options TEXT NOT NULL,
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS character_specific_tables (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          character TEXT NOT NULL,
          table_name TEXT NOT NULL,
          table_type TEXT NOT NULL,
          headers TEXT NOT NULL,
          rows TEXT NOT NULL,
          created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_normal_moves_character ON normal_moves(character);
        CREATE INDEX IF NOT EXISTS idx_special_moves_character ON special_moves(character);
        CREATE INDEX IF NOT EXISTS idx_overdrive_moves_character ON overdrive_moves(character);
        CREATE INDEX IF NOT EXISTS idx_system_core_character ON system_core_data(character);
        CREATE INDEX IF NOT EXISTS idx_system_jump_character ON system_jump_data(character);
        CREATE INDEX IF NOT EXISTS idx_gatling_character ON gatling_tables(character);
        CREATE INDEX IF NOT EXISTS idx_character_specific_character ON character_specific_tables(character);
        ",
        )
        .context("failed to initialize database schema")
}

/// A fresh import fully replaces prior data; there are no merge semantics.
pub const ALL_TABLES: &[&str] = &[
    "characters",
    "normal_moves",
    "special_moves",
    "overdrive_moves",
    "system_core_data",
    "system_jump_data",
    "gatling_tables",
    "character_specific_tables",
];

pub fn truncate_all(connection: &Connection) -> Result<()> {
    for table in ALL_TABLES {
        connection
            .execute(&format!("DELETE FROM {table}"), [])
            .with_context(|| format!("failed to truncate {table}"))?;
    }
    Ok(())
}
