use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shelf",
    version,
    about = "Browse the book catalog through a paginated, filtered list"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search the catalog, load pages and print the filtered list
    Browse(BrowseArgs),
    Version,
}

#[derive(Parser, Debug, Clone)]
pub struct BrowseArgs {
    /// Catalog search query
    #[arg(long, short = 'q')]
    pub query: String,

    /// Pages to load; stops early when the results run out
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Case-insensitive filter over title and authors; remembered between runs
    #[arg(long)]
    pub filter: Option<String>,

    /// Items per page (default: SHELF_PAGE_SIZE or 10)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Volumes API base URL
    #[arg(long, env = "SHELF_CATALOG_URL")]
    pub base_url: Option<String>,

    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,

    /// Neither read nor write the remembered filter
    #[arg(long)]
    pub no_persist: bool,

    /// Filter memory file (default: <cache dir>/shelf/search_terms.json)
    #[arg(long, env = "SHELF_TERM_FILE")]
    pub term_file: Option<PathBuf>,
}
