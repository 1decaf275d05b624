use crate::error::ExprError;
use crate::expr::token::{OPERATORS, Token};

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Tokenizes and then inserts the implicit multiplications.
    pub fn tokenize(self) -> Result<Vec<Token>, ExprError> {
        Ok(insert_implicit_mul(self.raw_tokens()?))
    }

    pub fn raw_tokens(mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
                continue;
            }
            let tok = match ch {
                '0'..='9' | '.' => self.read_number()?,
                'a'..='z' | 'A'..='Z' => Token::Ident(self.read_ident()),
                '(' | '[' => { self.pos += 1; Token::Open(ch) }
                ')' | ']' => { self.pos += 1; Token::Close(ch) }
                ',' => { self.pos += 1; Token::Comma }
                _ => match self.read_operator() {
                    Some(op) => Token::Op(op),
                    None => return Err(ExprError::UnexpectedChar(ch)),
                },
            };
            tokens.push(tok);
        }
        Ok(tokens)
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn read_number(&mut self) -> Result<Token, ExprError> {
        let rest = self.rest();
        let mut end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        let bytes = rest.as_bytes();
        if end < bytes.len() && bytes[end] == b'.' {
            let frac = rest[end + 1..].bytes().take_while(|b| b.is_ascii_digit()).count();
            if frac > 0 {
                end += 1 + frac;
            } else if end == 0 {
                return Err(ExprError::UnexpectedChar('.'));
            }
        }
        let text = &rest[..end];
        self.pos += end;
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExprError::UnexpectedToken(text.to_string()))
    }

    fn read_ident(&mut self) -> String {
        let rest = self.rest();
        let len = rest.bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        self.pos += len;
        rest[..len].to_string()
    }

    fn read_operator(&mut self) -> Option<&'static str> {
        let rest = self.rest();
        let op = OPERATORS.iter().copied().find(|op| rest.starts_with(op))?;
        self.pos += op.len();
        Some(op)
    }
}

/// Inserts `*` between adjacent tokens that read as a product:
/// `2x`, `2(…)`, `)x`, `)(`, `x y`, `x 2`. An identifier directly followed by
/// an opening bracket is always a call and is left alone.
fn insert_implicit_mul(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if let Some(prev) = out.last() {
            let product = matches!(
                (prev, &tok),
                (Token::Number(_), Token::Ident(_))
                    | (Token::Number(_), Token::Open(_))
                    | (Token::Close(_), Token::Ident(_))
                    | (Token::Close(_), Token::Open(_))
                    | (Token::Ident(_), Token::Ident(_))
                    | (Token::Ident(_), Token::Number(_))
            );
            if product {
                out.push(Token::Op("*"));
            }
        }
        out.push(tok);
    }
    out
}
