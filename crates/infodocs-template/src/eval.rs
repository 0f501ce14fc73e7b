use serde_json::Value;

use crate::parser::Node;
use crate::value::{is_truthy, lookup, to_text};

pub(crate) fn render_nodes(nodes: &[Node], scope: &Value) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes, scope);
    out
}

fn write_nodes(out: &mut String, nodes: &[Node], scope: &Value) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = lookup(scope, path) {
                    out.push_str(&to_text(value));
                }
            }
            Node::If {
                path,
                then,
                otherwise,
            } => {
                let truthy = lookup(scope, path).is_some_and(is_truthy);
                write_nodes(out, if truthy { then } else { otherwise }, scope);
            }
            Node::Each { path, body } => {
                let Some(Value::Array(items)) = lookup(scope, path) else {
                    continue;
                };
                // Each item is the whole scope of the body.
                for item in items {
                    write_nodes(out, body, item);
                }
            }
        }
    }
}
