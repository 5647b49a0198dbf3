//! dllsplit - split game data out of a DLL or EXE into asset files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use dllsplit::hashing::HashAlgorithm;
use dllsplit::logging;
use dllsplit::{SplitOptions, Splitter};

const EXIT_NO_SOURCE_FILE: u8 = 1;
const EXIT_NO_PROJECT_FILE: u8 = 2;
const EXIT_UNHANDLED: u8 = 3;

/// Split game data out of a DLL or EXE.
#[derive(Parser, Debug)]
#[command(name = "dllsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Image to split
    data_file: PathBuf,

    /// Project file listing exports and their types
    ini_file: PathBuf,

    /// Output directory
    project_dir: PathBuf,

    /// Leave labels, descriptions and tool info out of asset files
    #[arg(long)]
    nometa: bool,

    /// Digest recorded for each written file
    #[arg(long, default_value = "md5")]
    hash: HashAlgorithm,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Also write the run summary as JSON to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Stop between exports after this many seconds
    #[arg(long)]
    time_budget: Option<u64>,
}

fn run(cli: &Cli) -> Result<()> {
    let options = SplitOptions {
        no_metadata: cli.nometa,
        hash_algorithm: cli.hash,
        time_budget_secs: cli.time_budget,
        ..Default::default()
    };
    let summary = Splitter::new(options)
        .run(&cli.data_file, &cli.ini_file, &cli.project_dir)
        .with_context(|| format!("splitting {}", cli.data_file.display()))?;

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary {}", path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.json_logs {
        logging::init_tracing_json();
    } else {
        logging::init_tracing();
    }

    if !cli.data_file.exists() {
        error!(file = %cli.data_file.display(), "File not found");
        return ExitCode::from(EXIT_NO_SOURCE_FILE);
    }
    if !cli.ini_file.exists() {
        error!(file = %cli.ini_file.display(), "File not found");
        return ExitCode::from(EXIT_NO_PROJECT_FILE);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(EXIT_UNHANDLED)
        }
    }
}
