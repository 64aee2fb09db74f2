//! Call location and argument resolution.
//!
//! Finds the `setup(...)` invocation in a flattened body and recovers
//! keyword-argument values through the indirections setup.py authors
//! actually use: intermediate variables, unpacked `**kwargs` mappings,
//! and `dict(...)` builder calls. Resolution is best-effort by design:
//! any structural mismatch degrades to an absent field, never an
//! error. The static path is a heuristic over the exec fallback, not a
//! complete evaluator.

use std::collections::BTreeMap;

use tree_sitter::Node;

use crate::metadata::Metadata;
use crate::parser::ParsedScript;

/// The recognized metadata entry point.
const SETUP_NAME: &str = "setup";

/// Find the first `setup(...)` call in the flattened body.
///
/// Strictly first match in document order; later calls to the same
/// name are ignored. Scripts are assumed to invoke the entry point
/// once.
pub fn locate_setup_call<'t>(script: &ParsedScript, body: &[Node<'t>]) -> Option<Node<'t>> {
    body.iter().copied().find(|node| {
        if node.kind() != "call" {
            return false;
        }
        match node.child_by_field_name("function") {
            Some(func) => func.kind() == "identifier" && script.node_text(func) == SETUP_NAME,
            None => false,
        }
    })
}

/// Resolve all recognized fields of a located setup call.
pub fn resolve_metadata(script: &ParsedScript, body: &[Node<'_>], call: Node<'_>) -> Metadata {
    let resolver = Resolver { script, body, call };
    Metadata {
        name: resolver.single_string("name"),
        version: resolver.single_string("version"),
        python_requires: resolver.single_string("python_requires"),
        install_requires: resolver.string_list("install_requires"),
        extras_require: resolver.string_list_map("extras_require"),
    }
}

struct Resolver<'a, 't> {
    script: &'a ParsedScript,
    body: &'a [Node<'t>],
    call: Node<'t>,
}

impl<'t> Resolver<'_, 't> {
    /// Resolve a single-string field: direct keyword, or one alias hop
    /// through the body.
    fn single_string(&self, name: &str) -> Option<String> {
        let value = self.keyword_value(name)?;
        if let Some(literal) = self.script.string_literal(value) {
            return Some(literal);
        }
        if value.kind() == "identifier" {
            let bound = self.find_assignment(self.script.node_text(value))?;
            return self.script.string_literal(bound);
        }
        None
    }

    /// Resolve a string-list field (`install_requires`).
    fn string_list(&self, name: &str) -> Vec<String> {
        let Some(value) = self.keyword_value(name) else {
            return Vec::new();
        };
        match value.kind() {
            "list" => self.list_strings(value),
            "identifier" => match self.find_assignment(self.script.node_text(value)) {
                Some(bound) if bound.kind() == "list" => self.list_strings(bound),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Resolve a string-list mapping field (`extras_require`).
    fn string_list_map(&self, name: &str) -> BTreeMap<String, Vec<String>> {
        let mut map = BTreeMap::new();
        let Some(value) = self.keyword_value(name) else {
            return map;
        };
        let dict = match value.kind() {
            "dictionary" => value,
            "identifier" => match self.find_assignment(self.script.node_text(value)) {
                Some(bound) if bound.kind() == "dictionary" => bound,
                _ => return map,
            },
            _ => return map,
        };

        for (key, val) in self.dict_pairs(dict) {
            let Some(extra) = self.script.string_literal(key) else {
                continue;
            };
            // one further alias hop is allowed for list values
            let val = if val.kind() == "identifier" {
                match self.find_assignment(self.script.node_text(val)) {
                    Some(bound) => bound,
                    None => continue,
                }
            } else {
                val
            };
            if val.kind() == "list" {
                map.insert(extra, self.list_strings(val));
            }
        }
        map
    }

    /// Look a field up on the setup call, falling back to the call's
    /// `**kwargs` mapping.
    ///
    /// The `**kwargs` value must be a bare name bound to either a dict
    /// literal or a `dict(...)` call; any other shape aborts resolution
    /// for this field.
    fn keyword_value(&self, name: &str) -> Option<Node<'t>> {
        if let Some(value) = keyword_in_call(self.script, self.call, name) {
            return Some(value);
        }

        let kwargs = splat_kwargs(self.call)?;
        if kwargs.kind() != "identifier" {
            return None;
        }
        let bound = self.find_assignment(self.script.node_text(kwargs))?;
        match bound.kind() {
            "call" => {
                let func = bound.child_by_field_name("function")?;
                if func.kind() == "identifier" && self.script.node_text(func) == "dict" {
                    keyword_in_call(self.script, bound, name)
                } else {
                    None
                }
            }
            "dictionary" => self.dict_value(bound, name),
            _ => None,
        }
    }

    /// Find the value bound to `name` by the first assignment in the
    /// body.
    ///
    /// First definition from the start of the body wins, even when a
    /// later assignment is closer to the setup call. Downstream
    /// consumers rely on this tie-break; do not change it to
    /// nearest-preceding or most-recent.
    fn find_assignment(&self, name: &str) -> Option<Node<'t>> {
        for node in self.body {
            if node.kind() != "assignment" {
                continue;
            }
            if let Some(value) = assignment_value(self.script, *node, name) {
                return Some(value);
            }
        }
        None
    }

    /// Look a string key up in a dict literal.
    fn dict_value(&self, dict: Node<'t>, name: &str) -> Option<Node<'t>> {
        self.dict_pairs(dict)
            .into_iter()
            .find(|(key, _)| self.script.string_literal(*key).as_deref() == Some(name))
            .map(|(_, value)| value)
    }

    fn dict_pairs(&self, dict: Node<'t>) -> Vec<(Node<'t>, Node<'t>)> {
        let mut pairs = Vec::new();
        let mut cursor = dict.walk();
        for child in dict.named_children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }
            if let (Some(key), Some(value)) = (
                child.child_by_field_name("key"),
                child.child_by_field_name("value"),
            ) {
                pairs.push((key, unwrap_parens(value)));
            }
        }
        pairs
    }

    /// Collect the string-literal elements of a list literal.
    /// Non-string elements are skipped.
    fn list_strings(&self, list: Node<'t>) -> Vec<String> {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter_map(|el| self.script.string_literal(unwrap_parens(el)))
            .collect()
    }
}

/// Find a keyword argument by name on a call.
fn keyword_in_call<'t>(script: &ParsedScript, call: Node<'t>, name: &str) -> Option<Node<'t>> {
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    for arg in arguments.named_children(&mut cursor) {
        if arg.kind() != "keyword_argument" {
            continue;
        }
        let Some(arg_name) = arg.child_by_field_name("name") else {
            continue;
        };
        if script.node_text(arg_name) == name {
            return arg.child_by_field_name("value").map(unwrap_parens);
        }
    }
    None
}

/// Find the call's unpacked-mapping argument (`**kwargs`).
/// The last double-star argument wins, matching keyword-merge order.
fn splat_kwargs(call: Node<'_>) -> Option<Node<'_>> {
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let splats: Vec<Node> = arguments
        .named_children(&mut cursor)
        .filter(|arg| arg.kind() == "dictionary_splat")
        .collect();
    splats
        .last()
        .and_then(|splat| splat.named_child(0))
        .map(unwrap_parens)
}

/// Value bound to `name` by this assignment, if any.
///
/// Chained assignments (`a = b = value`) nest on the right in the
/// grammar; every left-hand name along the chain binds the innermost
/// value. Tuple-unpacking targets are not simple names and never
/// match.
fn assignment_value<'t>(
    script: &ParsedScript,
    assign: Node<'t>,
    name: &str,
) -> Option<Node<'t>> {
    let mut matched = false;
    let mut current = assign;
    loop {
        let left = current.child_by_field_name("left")?;
        if left.kind() == "identifier" && script.node_text(left) == name {
            matched = true;
        }
        let right = current.child_by_field_name("right")?;
        if right.kind() == "assignment" {
            current = right;
        } else {
            return matched.then(|| unwrap_parens(right));
        }
    }
}

/// Strip redundant parentheses around a value before matching its
/// shape.
fn unwrap_parens(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match current.named_child(0) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::scan::flatten::flatten;
    use std::path::Path;

    fn resolve(source: &str) -> Option<Metadata> {
        let script =
            parse_source(Path::new("setup.py"), source.as_bytes().to_vec()).unwrap();
        let body = flatten(script.tree.root_node());
        let call = locate_setup_call(&script, &body)?;
        Some(resolve_metadata(&script, &body, call))
    }

    #[test]
    fn test_direct_keywords() {
        let metadata = resolve(r#"setup(name="x", version="1.0")"#).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("x"));
        assert_eq!(metadata.version.as_deref(), Some("1.0"));
        assert!(metadata.python_requires.is_none());
        assert!(metadata.install_requires.is_empty());
        assert!(metadata.extras_require.is_empty());
    }

    #[test]
    fn test_alias_hop() {
        let metadata = resolve("version = \"2.0\"\nsetup(version=version)\n").unwrap();
        assert_eq!(metadata.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_alias_hop_missing_binding_degrades() {
        let metadata = resolve("setup(version=version)\n").unwrap();
        assert!(metadata.version.is_none());
    }

    #[test]
    fn test_list_literal() {
        let metadata =
            resolve(r#"setup(install_requires=["a", "b"])"#).unwrap();
        assert_eq!(metadata.install_requires, vec!["a", "b"]);
    }

    #[test]
    fn test_list_alias() {
        let metadata =
            resolve("requires = [\"a\", \"b\"]\nsetup(install_requires=requires)\n").unwrap();
        assert_eq!(metadata.install_requires, vec!["a", "b"]);
    }

    #[test]
    fn test_splat_dict_call() {
        let metadata = resolve(
            "kwargs = dict(install_requires=[\"a\", \"b\"])\nsetup(**kwargs)\n",
        )
        .unwrap();
        assert_eq!(metadata.install_requires, vec!["a", "b"]);
    }

    #[test]
    fn test_splat_dict_literal() {
        let metadata = resolve(
            "opts = {\"extras_require\": {\"test\": [\"pytest\"]}}\nsetup(**opts)\n",
        )
        .unwrap();
        assert_eq!(
            metadata.extras_require.get("test").unwrap(),
            &vec!["pytest".to_string()]
        );
    }

    #[test]
    fn test_splat_dict_literal_string_fields() {
        let metadata = resolve(
            "opts = {\"name\": \"pkg\", \"version\": \"3.1\"}\nsetup(**opts)\n",
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("pkg"));
        assert_eq!(metadata.version.as_deref(), Some("3.1"));
    }

    #[test]
    fn test_splat_bound_to_non_dict_degrades() {
        let metadata = resolve("kwargs = build_kwargs()\nsetup(**kwargs)\n").unwrap();
        assert!(metadata.name.is_none());
        assert!(metadata.install_requires.is_empty());
    }

    #[test]
    fn test_splat_non_name_degrades() {
        let metadata = resolve("setup(**dict(name=\"pkg\"))\n").unwrap();
        assert!(metadata.name.is_none());
    }

    #[test]
    fn test_extras_value_alias_hop() {
        let metadata = resolve(
            "tests = [\"pytest\", \"coverage\"]\nsetup(extras_require={\"test\": tests})\n",
        )
        .unwrap();
        assert_eq!(
            metadata.extras_require.get("test").unwrap(),
            &vec!["pytest".to_string(), "coverage".to_string()]
        );
    }

    #[test]
    fn test_extras_alias_to_dict() {
        let metadata = resolve(
            "extras = {\"docs\": [\"sphinx\"]}\nsetup(extras_require=extras)\n",
        )
        .unwrap();
        assert_eq!(
            metadata.extras_require.get("docs").unwrap(),
            &vec!["sphinx".to_string()]
        );
    }

    #[test]
    fn test_no_setup_call() {
        assert!(resolve("print(\"hello\")\n").is_none());
    }

    #[test]
    fn test_attribute_call_is_not_entry_point() {
        assert!(resolve("setuptools.setup(name=\"x\")\n").is_none());
    }

    #[test]
    fn test_first_call_wins() {
        let metadata = resolve(
            "setup(name=\"first\")\nsetup(name=\"second\")\n",
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("first"));
    }

    #[test]
    fn test_first_assignment_wins() {
        // inherited tie-break: the first binding is used even though the
        // second is closer to the call
        let metadata = resolve(
            "version = \"1.0\"\nversion = \"9.9\"\nsetup(version=version)\n",
        )
        .unwrap();
        assert_eq!(metadata.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_chained_assignment() {
        let metadata = resolve(
            "release = version = \"4.2\"\nsetup(version=version)\n",
        )
        .unwrap();
        assert_eq!(metadata.version.as_deref(), Some("4.2"));
    }

    #[test]
    fn test_fstring_version_degrades() {
        let metadata = resolve("setup(version=f\"{major}.{minor}\")\n").unwrap();
        assert!(metadata.version.is_none());
    }

    #[test]
    fn test_non_string_list_elements_skipped() {
        let metadata = resolve("setup(install_requires=[\"a\", 42])\n").unwrap();
        assert_eq!(metadata.install_requires, vec!["a"]);
    }

    #[test]
    fn test_parenthesized_value() {
        let metadata = resolve("setup(version=(\"1.0\"))\n").unwrap();
        assert_eq!(metadata.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_direct_keyword_beats_splat() {
        let metadata = resolve(
            "kwargs = dict(version=\"0.1\")\nsetup(version=\"0.2\", **kwargs)\n",
        )
        .unwrap();
        assert_eq!(metadata.version.as_deref(), Some("0.2"));
    }
}
