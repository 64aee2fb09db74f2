//! Setupmeta - setup.py metadata extraction.
//!
//! Setupmeta extracts package metadata (name, version, Python version
//! constraint, dependencies, optional-dependency groups) from Python
//! setup.py scripts. The core is a static extractor built on
//! tree-sitter: it pattern-matches the syntax tree for the `setup(...)`
//! call and resolves keyword arguments through the indirections scripts
//! actually use - intermediate variables, unpacked `**kwargs` mappings,
//! and `dict(...)` builder calls - without ever executing the script.
//!
//! # Architecture
//!
//! - `parser`: tree-sitter parsing of Python source
//! - `scan`: the static extraction engine (flattener, call locator,
//!   argument resolver, memoizing reader)
//! - `command`: the exec fallback (runs the script through an embedded
//!   Python driver and reads back a JSON report)
//! - `reader`: the strategy trait and static/exec precedence
//! - `metadata`: the shared result shape
//! - `report`: output formatting (pretty, JSON)
//!
//! The static path never raises for unextractable patterns; fields
//! degrade to absent/empty individually. "No setup() call at all" is a
//! distinct outcome that tells callers to fall back to exec.

pub mod cli;
pub mod command;
pub mod metadata;
pub mod parser;
pub mod reader;
pub mod report;
pub mod scan;

pub use command::{CommandReader, ExecError};
pub use metadata::Metadata;
pub use reader::{extract, MetadataReader, Strategy};
pub use scan::StaticReader;
