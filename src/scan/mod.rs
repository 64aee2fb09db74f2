//! Static extraction: pattern-match the syntax tree, never run the
//! script.
//!
//! This module provides:
//! - `flatten`: linearizes effectively-top-level code
//! - `resolve`: locates the setup call and resolves its arguments
//! - `StaticReader`: owns one parsed script and memoizes the result

pub mod flatten;
pub mod resolve;

use std::path::Path;

use once_cell::sync::OnceCell;

use crate::metadata::Metadata;
use crate::parser::{self, ParsedScript};
use crate::reader::MetadataReader;

/// Static metadata reader for a single setup.py script.
///
/// Each reader owns its own syntax tree; the resolved content is
/// computed on first access and reused for the lifetime of the
/// instance. `None` content means no `setup(...)` call was found — a
/// distinct outcome from "found, but nothing resolved", so callers
/// know when to fall back to the exec strategy.
pub struct StaticReader {
    script: ParsedScript,
    content: OnceCell<Option<Metadata>>,
}

impl StaticReader {
    /// Read and parse a setup.py file.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            script: parser::parse_file(path)?,
            content: OnceCell::new(),
        })
    }

    /// Parse setup.py source directly (`path` is used for diagnostics
    /// only).
    pub fn from_source(path: &Path, source: Vec<u8>) -> anyhow::Result<Self> {
        Ok(Self {
            script: parser::parse_source(path, source)?,
            content: OnceCell::new(),
        })
    }

    /// The script path this reader was opened with.
    pub fn path(&self) -> &str {
        &self.script.path
    }

    /// Resolved metadata, computed once per reader instance.
    pub fn content(&self) -> Option<&Metadata> {
        self.content
            .get_or_init(|| {
                let body = flatten::flatten(self.script.tree.root_node());
                let call = resolve::locate_setup_call(&self.script, &body)?;
                Some(resolve::resolve_metadata(&self.script, &body, call))
            })
            .as_ref()
    }
}

impl MetadataReader for StaticReader {
    fn read(&self) -> anyhow::Result<Option<Metadata>> {
        Ok(self.content().cloned())
    }
}
