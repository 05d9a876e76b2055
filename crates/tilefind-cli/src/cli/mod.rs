//! CLI for tilefind: resolve an AOI into LiDAR tiles, write the download
//! list, and optionally download the selected tiles.

mod download;
mod select;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use tilefind_core::aoi::query_aoi;
use tilefind_core::catalog::CatalogClient;
use tilefind_core::config::{self, TilefindConfig};
use tilefind_core::downloader::DownloadOptions;
use tilefind_core::listfile::write_download_list;
use tilefind_core::AoiError;

pub const EXIT_OK: i32 = 0;
/// Invalid geometry or selection input.
pub const EXIT_INPUT: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

/// Find USGS LiDAR point-cloud tiles covering an area of interest.
#[derive(Debug, Parser)]
#[command(name = "tilefind")]
#[command(
    about = "tilefind: find and download LiDAR point-cloud tiles for an area of interest",
    long_about = None
)]
pub struct Cli {
    /// Center latitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Center longitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Area of interest in square miles (a square centered on the point).
    #[arg(long, allow_negative_numbers = true)]
    pub sqmi: f64,

    /// Where to write the download list (one URL per line).
    #[arg(long, default_value = "downloadlist.txt", value_name = "PATH")]
    pub out: PathBuf,

    /// Maximum number of catalog items to request (default from config).
    #[arg(long, value_name = "N")]
    pub max_items: Option<u32>,

    /// Restrict the list and download to this tile id. Repeatable.
    #[arg(long = "tile", value_name = "ID")]
    pub tiles: Vec<String>,

    /// Download the selected tiles into DIR after writing the list.
    #[arg(long, value_name = "DIR", conflicts_with = "download_to")]
    pub download_dir: Option<PathBuf>,

    /// Download the single selected tile to FILE.
    #[arg(long, value_name = "FILE")]
    pub download_to: Option<PathBuf>,
}

/// A problem with the user's selection that parsing could not catch.
#[derive(Debug)]
pub struct InputError(pub String);

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InputError {}

/// Parses the process arguments, runs, and returns the exit code.
pub fn run_from_args() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_error_code(&e),
    };
    match run(cli) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            eprintln!("tilefind error: {:#}", err);
            exit_code_for(&err)
        }
    }
}

/// Prints a clap error (or help/version) and maps it to an exit code.
/// Malformed numbers count as invalid input.
fn parse_error_code(e: &clap::Error) -> i32 {
    let _ = e.print();
    match e.kind() {
        ErrorKind::InvalidValue | ErrorKind::ValueValidation => EXIT_INPUT,
        _ => e.exit_code(),
    }
}

pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let input = err
        .downcast_ref::<AoiError>()
        .is_some_and(AoiError::is_input_error)
        || err.is::<InputError>();
    if input {
        EXIT_INPUT
    } else {
        EXIT_FAILURE
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_or_init().unwrap_or_else(|e| {
        tracing::warn!("could not load config, using defaults: {:#}", e);
        TilefindConfig::default()
    });
    tracing::debug!("loaded config: {:?}", cfg);

    let client = CatalogClient::from_config(&cfg.catalog);
    let max_items = cli.max_items.unwrap_or(cfg.catalog.max_items);
    let result = query_aoi(&client, cli.lat, cli.lon, cli.sqmi, max_items)?;
    println!("{}", result);

    if result.tiles.is_empty() {
        println!("No LAZ URLs found for this AOI.");
        return Ok(());
    }

    let selected = select::select_tiles(&result.tiles, &cli.tiles)?;
    // Validate the download target before touching the list file.
    let tasks = select::plan_tasks(
        &selected,
        cli.download_dir.as_deref(),
        cli.download_to.as_deref(),
    )?;

    let count = write_download_list(selected.iter().map(|t| t.url.as_str()), &cli.out)?;
    println!("Wrote {} URL(s) to {}", count, cli.out.display());

    if let Some(tasks) = tasks {
        download::download_with_progress(tasks, DownloadOptions::from(&cfg.download))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
