//! Command-line interface for setupmeta.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::reader::{self, Strategy};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_NO_METADATA: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Extract package metadata from Python setup.py scripts.
///
/// The static strategy pattern-matches the syntax tree without running
/// the script; the exec strategy runs it with a real interpreter and
/// reads back what the build machinery reports. Auto tries static
/// first and falls back to exec when no setup() call is found.
#[derive(Parser)]
#[command(name = "setupmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract metadata from a setup.py script
    #[command(visible_alias = "read")]
    Extract(ExtractArgs),
}

/// Arguments for the extract command.
#[derive(Parser)]
pub struct ExtractArgs {
    /// Path to a setup.py script, or a directory containing one
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Extraction strategy: auto, static, or exec
    #[arg(short, long, default_value = "auto")]
    pub strategy: String,
}

/// Resolve the script path; a directory implies setup.py inside it.
fn resolve_script(path: &Path) -> anyhow::Result<PathBuf> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", path, e))?;

    let script = if metadata.is_dir() {
        path.join("setup.py")
    } else {
        path.to_path_buf()
    };

    if !script.is_file() {
        anyhow::bail!("no setup script at {}", script.display());
    }
    Ok(script)
}

/// Run the extract command.
pub fn run_extract(args: &ExtractArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let strategy: Strategy = match args.strategy.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {} (must be 'auto', 'static', or 'exec')", e);
            return Ok(EXIT_ERROR);
        }
    };

    let script = match resolve_script(&args.path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = reader::extract(&script, strategy)?;

    let path_str = script.to_string_lossy();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, strategy, metadata.as_ref())?,
        _ => report::write_pretty(&path_str, strategy, metadata.as_ref()),
    }

    if metadata.is_some() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_NO_METADATA)
    }
}
