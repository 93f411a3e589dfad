use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::import::schema_tables;
use crate::model::DownloadManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let tables_path = args.output_dir.join("dustloop_tables.json");
    let parsed_path = args.output_dir.join("parsed_frame_data.json");
    let manifest_path = args
        .output_dir
        .join("frame_data_html")
        .join("download_manifest.json");

    info!(
        tables_json = tables_path.exists(),
        parsed_json = parsed_path.exists(),
        "output artifacts"
    );

    if manifest_path.exists() {
        let raw = std::fs::read(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: DownloadManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;
        info!(
            generated_at = %manifest.generated_at,
            pages = manifest.page_count,
            "download manifest"
        );
    } else {
        warn!(path = %manifest_path.display(), "download manifest missing");
    }

    if args.db_path.exists() {
        let conn = Connection::open(&args.db_path)
            .with_context(|| format!("failed to open {}", args.db_path.display()))?;
        for table in schema_tables() {
            let count = query_count(&conn, table).unwrap_or(0);
            info!(table, rows = count, "database table");
        }
    } else {
        warn!(path = %args.db_path.display(), "database missing");
    }

    Ok(())
}

fn query_count(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .with_context(|| format!("failed to count rows in {table}"))
}
