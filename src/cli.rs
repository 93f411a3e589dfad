use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "dustloop",
    version,
    about = "Dustloop GGST frame-data scraper and importer"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the wiki and emit one JSON array of classified tables.
    Crawl(CrawlArgs),
    /// Download raw per-character frame-data HTML pages.
    Download(DownloadArgs),
    /// Parse downloaded HTML pages into per-character JSON.
    Parse(ParseArgs),
    /// Import a producer JSON file into the SQLite database.
    Import(ImportArgs),
    /// Report output artifacts and database row counts.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    #[arg(long, default_value = "output/dustloop_tables.json")]
    pub output: PathBuf,

    /// Crawl a single character instead of the full roster.
    #[arg(long)]
    pub character: Option<String>,

    #[arg(long, default_value_t = 1000)]
    pub request_delay_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    #[arg(long, default_value = "output/frame_data_html")]
    pub output_dir: PathBuf,

    /// Download a single character instead of the full roster.
    #[arg(long)]
    pub character: Option<String>,

    #[arg(long, default_value_t = 1000)]
    pub request_delay_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(long, default_value = "output/frame_data_html")]
    pub input_dir: PathBuf,

    #[arg(long, default_value = "output/parsed_frame_data.json")]
    pub output_file: PathBuf,

    /// API key for the external cleanup service; cleanup is skipped when absent.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Re-parse only the named characters, keeping the rest of an existing output file.
    #[arg(long = "character")]
    pub characters: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(long, default_value = "output/dustloop_tables.json")]
    pub json_path: PathBuf,

    #[arg(long, default_value = "output/frame_data.sqlite")]
    pub db_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    #[arg(long, default_value = "output/frame_data.sqlite")]
    pub db_path: PathBuf,
}
