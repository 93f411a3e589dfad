use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One extracted table row: canonical field name to cell value. A `None`
/// value marks a cell the source markup did not provide.
pub type Row = BTreeMap<String, Option<String>>;

/// Closed classification assigned to every extracted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    NormalMoves,
    SpecialMoves,
    OverdriveMoves,
    SystemCore,
    SystemJump,
    SystemOther,
    CharacterSpecific,
    Unknown,
}

impl TableType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NormalMoves => "normal_moves",
            Self::SpecialMoves => "special_moves",
            Self::OverdriveMoves => "overdrive_moves",
            Self::SystemCore => "system_core",
            Self::SystemJump => "system_jump",
            Self::SystemOther => "system_other",
            Self::CharacterSpecific => "character_specific",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified table from one character's frame-data page.
///
/// `table_name` is qualified as `"{character}.{slug}"`; it is unique per
/// character and table instance, not globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    pub character: String,
    pub table_name: String,
    pub table_type: TableType,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Per-character buckets produced by the download+parse path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterData {
    pub name: String,
    pub normal_moves: Vec<Row>,
    pub special_moves: Vec<Row>,
    pub overdrive_moves: Vec<Row>,
    pub system_core: Vec<Row>,
    pub system_jump: Vec<Row>,
}

impl CharacterData {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            normal_moves: Vec::new(),
            special_moves: Vec::new(),
            overdrive_moves: Vec::new(),
            system_core: Vec::new(),
            system_jump: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllData {
    pub characters: Vec<CharacterData>,
}

/// Either producer output the importer accepts, detected from the
/// top-level JSON shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImportInput {
    Tables(Vec<TableRecord>),
    Characters(AllData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedPage {
    pub character: String,
    pub filename: String,
    pub sha256: String,
    pub fetched_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub page_count: usize,
    pub pages: Vec<DownloadedPage>,
}
