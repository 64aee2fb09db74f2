//! Python parsing via tree-sitter.
//!
//! Wraps the tree-sitter-python grammar and keeps the parsed tree
//! together with its source bytes, so downstream passes can borrow
//! nodes and recover their text.

use std::fs;
use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

/// A parsed setup.py script: the syntax tree plus its source.
pub struct ParsedScript {
    pub tree: Tree,
    pub source: Vec<u8>,
    pub path: String,
}

impl ParsedScript {
    /// Get the source text of a node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Unwrap a plain string literal to its contents.
    ///
    /// Returns `None` for anything that is not a simple literal:
    /// f-strings (interpolation), implicit concatenation, or non-string
    /// nodes. Escape sequences are kept verbatim; metadata strings do
    /// not meaningfully use them.
    pub fn string_literal(&self, node: Node) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }

        let mut cursor = node.walk();
        let mut contents = String::new();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "string_start" | "string_end" => {}
                "string_content" | "escape_sequence" => {
                    contents.push_str(self.node_text(child));
                }
                // interpolation means an f-string; bail out
                _ => return None,
            }
        }
        Some(contents)
    }
}

fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Parse Python source bytes.
pub fn parse_source(path: &Path, source: Vec<u8>) -> anyhow::Result<ParsedScript> {
    let mut parser = Parser::new();
    parser.set_language(&python_language())?;
    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse Python source: {}", path.display()))?;

    Ok(ParsedScript {
        tree,
        source,
        path: path.to_string_lossy().to_string(),
    })
}

/// Read and parse a setup.py file.
pub fn parse_file(path: &Path) -> anyhow::Result<ParsedScript> {
    let source = fs::read(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    parse_source(path, source)
}
