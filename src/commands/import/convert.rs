//! Fallible conversion from free-form extracted row maps to the typed
//! entities the storage schema expects. Each entity type has its own
//! conversion function; a missing required field is a typed error, not a
//! generic failure.

use thiserror::Error;

use crate::model::Row;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("{table} row is missing required field `{field}`")]
    MissingField {
        table: &'static str,
        field: &'static str,
    },
}

/// Typed move row shared by the normal/special/overdrive tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveEntity {
    pub name: Option<String>,
    pub input: String,
    pub damage: Option<String>,
    pub guard: Option<String>,
    pub startup: Option<String>,
    pub active: Option<String>,
    pub recovery: Option<String>,
    pub on_block: Option<String>,
    pub on_hit: Option<String>,
    pub level: Option<String>,
    pub counter_type: Option<String>,
    pub invuln: Option<String>,
    pub proration: Option<String>,
    pub risc_gain: Option<String>,
    pub risc_loss: Option<String>,
    pub tension_gain: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemCoreEntity {
    pub defense: Option<String>,
    pub guts: Option<String>,
    pub risc_gain_modifier: Option<String>,
    pub prejump: Option<String>,
    pub backdash_duration: Option<String>,
    pub backdash_invuln: Option<String>,
    pub backdash_airborne: Option<String>,
    pub forward_dash: Option<String>,
    pub unique_movement_options: Option<String>,
    pub movement_tension_gain: Option<String>,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemJumpEntity {
    pub jump_duration: Option<String>,
    pub high_jump_duration: Option<String>,
    pub jump_height: Option<String>,
    pub high_jump_height: Option<String>,
    pub pre_instant_air_dash: Option<String>,
    pub air_dash_duration: Option<String>,
    pub air_backdash_duration: Option<String>,
    pub air_dash_distance: Option<String>,
    pub air_backdash_distance: Option<String>,
    pub jumping_tension_gain: Option<String>,
    pub air_dash_tension_gain: Option<String>,
}

/// Gatling rows store per-button chain options as lists; the source
/// serializes them as comma-separated strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatlingEntity {
    pub p_moves: Vec<String>,
    pub k_moves: Vec<String>,
    pub s_moves: Vec<String>,
    pub h_moves: Vec<String>,
    pub d_moves: Vec<String>,
    pub cancel_options: Vec<String>,
}

fn value(row: &Row, key: &str) -> Option<String> {
    row.get(key).and_then(|value| value.clone())
}

fn non_empty(row: &Row, key: &str) -> Option<String> {
    value(row, key).filter(|value| !value.is_empty())
}

fn move_fields(row: &Row, name: Option<String>, input: String) -> MoveEntity {
    MoveEntity {
        name,
        input,
        damage: value(row, "damage"),
        guard: value(row, "guard"),
        startup: value(row, "startup"),
        active: value(row, "active"),
        recovery: value(row, "recovery"),
        on_block: value(row, "on_block"),
        on_hit: value(row, "on_hit"),
        level: value(row, "level"),
        counter_type: value(row, "counter_type"),
        invuln: value(row, "invuln"),
        proration: value(row, "proration"),
        risc_gain: value(row, "risc_gain"),
        risc_loss: value(row, "risc_loss"),
        tension_gain: value(row, "tension_gain").or_else(|| value(row, "tension")),
        notes: value(row, "notes"),
    }
}

/// Normal moves are keyed by input; a row without one cannot be stored.
pub fn normal_move(row: &Row) -> Result<MoveEntity, ConvertError> {
    let input = non_empty(row, "input").ok_or(ConvertError::MissingField {
        table: "normal_moves",
        field: "input",
    })?;
    Ok(move_fields(row, None, input))
}

/// Special and overdrive moves are keyed by name, falling back to the
/// input, then the command column when the wiki omits a name column.
pub fn named_move(row: &Row, table: &'static str) -> Result<MoveEntity, ConvertError> {
    let name = non_empty(row, "name")
        .or_else(|| non_empty(row, "input"))
        .or_else(|| non_empty(row, "command"))
        .ok_or(ConvertError::MissingField {
            table,
            field: "name",
        })?;

    let input = non_empty(row, "input").unwrap_or_default();
    Ok(move_fields(row, Some(name), input))
}

pub fn system_core(row: &Row) -> SystemCoreEntity {
    SystemCoreEntity {
        defense: value(row, "defense"),
        guts: value(row, "guts"),
        risc_gain_modifier: value(row, "risc_gain_modifier"),
        prejump: value(row, "prejump"),
        backdash_duration: value(row, "backdash_duration"),
        backdash_invuln: value(row, "backdash_invuln"),
        backdash_airborne: value(row, "backdash_airborne"),
        forward_dash: value(row, "forward_dash"),
        unique_movement_options: value(row, "unique_movement_options"),
        movement_tension_gain: value(row, "movement_tension_gain"),
        weight: value(row, "weight"),
    }
}

pub fn system_jump(row: &Row) -> SystemJumpEntity {
    SystemJumpEntity {
        jump_duration: value(row, "jump_duration"),
        high_jump_duration: value(row, "high_jump_duration"),
        jump_height: value(row, "jump_height"),
        high_jump_height: value(row, "high_jump_height"),
        pre_instant_air_dash: value(row, "pre_instant_air_dash"),
        air_dash_duration: value(row, "air_dash_duration"),
        air_backdash_duration: value(row, "air_backdash_duration"),
        air_dash_distance: value(row, "air_dash_distance"),
        air_backdash_distance: value(row, "air_backdash_distance"),
        jumping_tension_gain: value(row, "jumping_tension_gain"),
        air_dash_tension_gain: value(row, "air_dash_tension_gain"),
    }
}

/// Splits a comma-separated legacy list column into its entries.
pub fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn gatling(row: &Row) -> GatlingEntity {
    // Headers normalize to lowercase button letters; raw-JSON producers
    // may still carry the original capitalized column names.
    let column = |lower: &str, raw: &str| value(row, lower).or_else(|| value(row, raw));

    GatlingEntity {
        p_moves: split_list(column("p", "P")),
        k_moves: split_list(column("k", "K")),
        s_moves: split_list(column("s", "S")),
        h_moves: split_list(column("h", "H")),
        d_moves: split_list(column("d", "D")),
        cancel_options: split_list(column("cancel", "Cancel")),
    }
}
