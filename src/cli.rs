use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Create projects and launch crawls in bulk from a CSV file.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    /// Path to the CSV file to parse (columns: url, project name, max pages).
    #[arg(short = 'i', value_name = "PATH", required = true)]
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the input CSV from a plain list of start URLs.
    Prepare(PrepareArgs),
}

#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Input list of start URLs, one per line (`#` starts a comment).
    #[arg(long, default_value = "crawlme.txt")]
    pub urls: PathBuf,

    /// Prefix used to build every project name.
    #[arg(long)]
    pub prefix: String,

    /// Maximum number of URLs to crawl per project (capped at 100000).
    #[arg(long)]
    pub max_urls: u64,

    /// Organization the projects will be created in.
    #[arg(long, env = "BOTIFY_ORGANIZATION")]
    pub organization: String,

    /// Output CSV consumed by `crawlbot -i`.
    #[arg(long, default_value = "crawlme.csv")]
    pub out: PathBuf,

    /// Output list pairing each start URL with its project page.
    #[arg(long, default_value = "project_list.txt")]
    pub project_list: PathBuf,

    /// Base URL of the web app, used for the project list.
    #[arg(long, env = "BOTIFY_APP_URL", default_value = "https://app.botify.com")]
    pub app_url: String,

    /// Overwrite existing output files.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
