use crate::syntax::ast::{Node, NodeKind};

/// Renders a tree back to program text with two-space indentation.
/// Reparsing the output gives a structurally identical tree.
pub fn to_source(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_block(&mut out, nodes, 0);
    out
}

fn write_block(out: &mut String, nodes: &[Node], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        let head = match node.kind {
            NodeKind::Call => {
                let mut words = vec![node.value.as_str()];
                words.extend(node.children.iter().map(|a| a.value.as_str()));
                words.join(" ")
            }
            NodeKind::Argument => node.value.clone(),
            NodeKind::Loop => format!("for {} do", node.value),
            NodeKind::When => format!("when {} do", node.value),
            NodeKind::Define => {
                let mut words = vec!["draw", node.value.as_str()];
                words.extend(node.params());
                words.push("do");
                words.join(" ")
            }
            NodeKind::Empty => String::new(),
        };

        out.push_str(&indent);
        out.push_str(&head);
        if let Some(lit) = &node.meta.lit {
            if !head.is_empty() { out.push(' '); }
            out.push('#');
            if !lit.is_empty() {
                out.push(' ');
                out.push_str(lit);
            }
        }
        out.push('\n');

        if matches!(node.kind, NodeKind::Loop | NodeKind::When | NodeKind::Define) {
            write_block(out, &node.children, depth + 1);
            out.push_str(&indent);
            out.push_str("end\n");
        }
    }
}
