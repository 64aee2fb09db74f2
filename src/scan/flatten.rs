//! Statement flattening.
//!
//! setup.py scripts often bury the effectively-top-level `setup(...)`
//! call inside a `main()` helper or an `if __name__ == "__main__":`
//! guard. Flattening linearizes that nesting into one ordered sequence
//! of statements and expressions, so the locator and resolver can do
//! plain linear scans.

use tree_sitter::Node;

/// Flatten a module into its effectively-top-level body.
///
/// Document order is preserved; the returned nodes are references into
/// the tree. Function-definition bodies and `if` true-branches are
/// inlined in place of the definition/conditional, expression
/// statements are unwrapped to their inner expression, and everything
/// else is yielded unchanged. This is a bounded structural unwrap, not
/// an interpreter: loops, `elif`/`else` branches, and other control
/// flow are never entered.
pub fn flatten(root: Node<'_>) -> Vec<Node<'_>> {
    let mut body = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        visit(child, &mut body);
    }
    body
}

fn visit<'t>(stmt: Node<'t>, out: &mut Vec<Node<'t>>) {
    match stmt.kind() {
        "comment" => {}
        "decorated_definition" => {
            if let Some(definition) = stmt.child_by_field_name("definition") {
                visit(definition, out);
            }
        }
        "function_definition" => {
            if let Some(block) = stmt.child_by_field_name("body") {
                visit_block(block, out);
            }
        }
        "if_statement" => {
            // only the true branch; elif/else are ignored entirely
            if let Some(block) = stmt.child_by_field_name("consequence") {
                visit_block(block, out);
            }
        }
        "expression_statement" => {
            if let Some(inner) = stmt.named_child(0) {
                out.push(inner);
            }
        }
        _ => out.push(stmt),
    }
}

fn visit_block<'t>(block: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = block.walk();
    for child in block.named_children(&mut cursor) {
        visit(child, out);
    }
}
