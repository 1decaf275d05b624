#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Op(&'static str),
    Open(char),  // ( or [
    Close(char), // ) or ]
    Comma,
}

/// Operator spellings, longest first so that matching is greedy.
pub const OPERATORS: &[&str] = &[
    "===", "!==",
    "&&", "||", ">=", "<=", "==", "!=", "//",
    "+", "-", "*", "/", "^", ">", "<", "&", "|", "!",
];

impl Token {
    pub fn is_open(&self) -> bool { matches!(self, Token::Open(_)) }
    pub fn is_close(&self) -> bool { matches!(self, Token::Close(_)) }

    /// Source-like spelling, used in error messages.
    pub fn text(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(s) => s.clone(),
            Token::Op(op) => (*op).to_string(),
            Token::Open(c) | Token::Close(c) => c.to_string(),
            Token::Comma => ",".to_string(),
        }
    }
}

pub fn closing_for(open: char) -> char {
    if open == '[' { ']' } else { ')' }
}
