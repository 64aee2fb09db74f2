//! Strategy selection between static and exec extraction.
//!
//! Both readers implement one capability interface, so callers can
//! pick a precedence without coupling to either implementation.

use std::path::Path;

use crate::command::CommandReader;
use crate::metadata::Metadata;
use crate::scan::StaticReader;

/// A metadata extraction strategy for one setup.py script.
pub trait MetadataReader {
    /// Extract metadata.
    ///
    /// `Ok(None)` means the script does not use the recognized setup
    /// convention (the static reader found no entry-point call).
    /// Errors are reserved for hard failures: unreadable files, or a
    /// failing interpreter run on the exec path.
    fn read(&self) -> anyhow::Result<Option<Metadata>>;
}

/// Which strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Static first; exec only when no setup call is found.
    Auto,
    /// Static only. Never executes the script.
    Static,
    /// Exec only. Ground truth, at the cost of running the script.
    Exec,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Auto => "auto",
            Strategy::Static => "static",
            Strategy::Exec => "exec",
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Strategy::Auto),
            "static" => Ok(Strategy::Static),
            "exec" => Ok(Strategy::Exec),
            _ => Err(format!("unknown strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extract metadata from a setup.py script with the given strategy.
pub fn extract(path: &Path, strategy: Strategy) -> anyhow::Result<Option<Metadata>> {
    match strategy {
        Strategy::Static => StaticReader::open(path)?.read(),
        Strategy::Exec => CommandReader::new(path).read(),
        Strategy::Auto => match StaticReader::open(path)?.read()? {
            Some(metadata) => Ok(Some(metadata)),
            None => CommandReader::new(path).read(),
        },
    }
}
