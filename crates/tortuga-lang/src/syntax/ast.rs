use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Command or function invocation. `value` = name, children = `Argument`s.
    Call,
    /// `value` = literal token text, quotes included.
    Argument,
    /// `for N do … end`. `value` = count expression.
    Loop,
    /// `draw NAME ARGS do … end`. `value` = name, `meta.args` = parameters.
    Define,
    /// `when COND do … end`. `value` = guard expression.
    When,
    /// Blank or comment-only line.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    /// 1-based source line the node was parsed from.
    pub line: usize,
    /// Trailing `# comment` text of that line.
    pub lit: Option<String>,
    /// Parameter nodes of a `Define`.
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub value: String,
    pub children: Vec<Node>,
    pub meta: Meta,
}

impl Node {
    pub fn new(kind: NodeKind, value: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            children: Vec::new(),
            meta: Meta { line, ..Meta::default() },
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn line(&self) -> usize { self.meta.line }

    /// True for an `Argument` written as a double-quoted string.
    pub fn is_quoted(&self) -> bool {
        self.kind == NodeKind::Argument && self.value.starts_with('"')
    }

    /// Parameter names of a `Define`.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.meta.args.iter().map(|a| a.value.as_str())
    }

    /// Structural equality: kinds, values, children and parameters, ignoring
    /// line numbers and comment text.
    pub fn same_shape(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.value == other.value
            && same_shapes(&self.children, &other.children)
            && same_shapes(&self.meta.args, &other.meta.args)
    }
}

pub fn same_shapes(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}
