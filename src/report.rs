//! Output formatting for extraction results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::reader::Strategy;

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub strategy: String,
    pub found: bool,
    pub metadata: Option<Metadata>,
}

impl JsonReport {
    pub fn new(path: &str, strategy: Strategy, metadata: Option<&Metadata>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            strategy: strategy.as_str().to_string(),
            found: metadata.is_some(),
            metadata: metadata.cloned(),
        }
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    strategy: Strategy,
    metadata: Option<&Metadata>,
) -> anyhow::Result<()> {
    let report = JsonReport::new(path, strategy, metadata);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Write results in pretty (colored) format.
pub fn write_pretty(path: &str, strategy: Strategy, metadata: Option<&Metadata>) {
    println!();
    print!("  ");
    print!("{}", "setupmeta".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Script:   ".dimmed());
    println!("{}", path);
    print!("  {}", "Strategy: ".dimmed());
    println!("{}", strategy);
    println!();

    let metadata = match metadata {
        Some(m) => m,
        None => {
            println!("  {}", "✗ no setup() call found".yellow());
            println!();
            return;
        }
    };

    write_single("name", metadata.name.as_deref());
    write_single("version", metadata.version.as_deref());
    write_single("python_requires", metadata.python_requires.as_deref());

    print!("  {:<17}", "install_requires".bold());
    if metadata.install_requires.is_empty() {
        println!(" {}", "(none)".dimmed());
    } else {
        println!();
        for requirement in &metadata.install_requires {
            println!("    - {}", requirement);
        }
    }

    print!("  {:<17}", "extras_require".bold());
    if metadata.extras_require.is_empty() {
        println!(" {}", "(none)".dimmed());
    } else {
        println!();
        for (extra, requirements) in &metadata.extras_require {
            println!("    [{}]", extra.green());
            for requirement in requirements {
                println!("      - {}", requirement);
            }
        }
    }
    println!();
}

fn write_single(field: &str, value: Option<&str>) {
    print!("  {:<17}", field.bold());
    match value {
        Some(value) => println!(" {}", value),
        None => println!(" {}", "(not resolved)".dimmed()),
    }
}
