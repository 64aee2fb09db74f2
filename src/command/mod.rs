//! Exec extraction: run the script and ask the build machinery what it
//! saw.
//!
//! A small embedded Python driver loads the distribution through
//! `distutils.core.run_setup`, collects the allow-listed attribute and
//! `get_*` accessor values, and writes them to a temporary JSON file.
//! This is ground truth for scripts the static matcher cannot follow,
//! at the cost of actually executing setup.py.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use thiserror::Error;

use crate::metadata::Metadata;
use crate::reader::MetadataReader;

/// The embedded metadata-reporting driver.
const DRIVER: &str = include_str!("driver.py");

/// Errors from the exec strategy.
///
/// Unlike the static path, the exec path has real failures to report:
/// a missing interpreter, a script that exits non-zero, or a report
/// that is not the expected JSON shape.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("no python interpreter found on PATH")]
    PythonNotFound,
    #[error("setup script failed: {0}")]
    ScriptFailed(String),
    #[error("driver produced invalid metadata json: {0}")]
    BadReport(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Metadata reader that executes the script in a subprocess.
pub struct CommandReader {
    path: PathBuf,
}

impl CommandReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// The script path this reader was created with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the driver and collect the reported metadata.
    ///
    /// The driver and output files are temporary and released on every
    /// exit path, including failures.
    pub fn run(&self) -> Result<Metadata, ExecError> {
        let python = find_python().ok_or(ExecError::PythonNotFound)?;

        let mut driver = tempfile::Builder::new()
            .prefix("setupmeta-driver-")
            .suffix(".py")
            .tempfile()?;
        driver.write_all(DRIVER.as_bytes())?;
        driver.flush()?;

        let output_file = tempfile::Builder::new()
            .prefix("setupmeta-report-")
            .suffix(".json")
            .tempfile()?;

        // setup.py scripts assume they run from their own directory
        let script_dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let script_name = self
            .path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.path.clone());

        let result = Command::new(&python)
            .arg(driver.path())
            .arg(&script_name)
            .arg(output_file.path())
            .current_dir(script_dir)
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let last_line = stderr
                .trim()
                .lines()
                .last()
                .unwrap_or("exited without error output")
                .to_string();
            return Err(ExecError::ScriptFailed(last_line));
        }

        let raw = std::fs::read_to_string(output_file.path())?;
        let report: serde_json::Map<String, Value> = serde_json::from_str(&raw)?;
        Ok(Metadata::from_report(&report))
    }
}

impl MetadataReader for CommandReader {
    fn read(&self) -> anyhow::Result<Option<Metadata>> {
        Ok(Some(self.run()?))
    }
}

/// Find a Python interpreter on PATH.
fn find_python() -> Option<String> {
    for cmd in ["python3", "python"] {
        if let Ok(output) = Command::new(cmd).arg("--version").output() {
            if output.status.success() {
                return Some(cmd.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_is_embedded() {
        assert!(DRIVER.contains("run_setup"));
        assert!(DRIVER.contains("json.dump"));
    }

    #[test]
    fn test_reader_keeps_path() {
        let reader = CommandReader::new(Path::new("pkg/setup.py"));
        assert_eq!(reader.path(), Path::new("pkg/setup.py"));
    }

    #[test]
    fn test_error_messages() {
        let err = ExecError::ScriptFailed("ModuleNotFoundError: no module named 'x'".into());
        assert!(err.to_string().contains("ModuleNotFoundError"));
        assert_eq!(
            ExecError::PythonNotFound.to_string(),
            "no python interpreter found on PATH"
        );
    }
}
