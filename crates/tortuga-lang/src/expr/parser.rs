use crate::error::ExprError;
use crate::expr::ast::{BinOp, Expr, UnOp};
use crate::expr::functions::Functions;
use crate::expr::token::{Token, closing_for};

/// Deepest nesting of brackets, unary operators and operator chains.
pub const MAX_NESTING: usize = 64;

/// Precedence-climbing parser over expression tokens.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    functions: &'a Functions,
    /// Signature mode: any identifier may be called, arity is not checked.
    relaxed: bool,
    /// Function currently being defined, visible to its own body.
    defining: Option<(&'a str, usize)>,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, functions: &'a Functions) -> Self {
        Self { tokens, pos: 0, functions, relaxed: false, defining: None, nesting: 0 }
    }

    pub fn relaxed(mut self) -> Self {
        self.relaxed = true;
        self
    }

    pub fn defining(mut self, name: &'a str, arity: usize) -> Self {
        self.defining = Some((name, arity));
        self
    }

    pub fn parse(mut self) -> Result<Expr, ExprError> {
        if self.tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let expr = self.parse_expr(0)?;
        match self.peek() {
            None => Ok(expr),
            Some(Token::Close(c)) => Err(ExprError::StrayClosing(*c)),
            Some(tok) => Err(ExprError::UnexpectedToken(tok.text())),
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, ExprError> {
        let outer = self.nesting;
        self.enter()?;
        let mut left = self.parse_primary()?;
        while let Some(&Token::Op(sym)) = self.peek() {
            let op = BinOp::from_symbol(sym)
                .ok_or_else(|| ExprError::UnknownOperator(sym.to_string()))?;
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let next = if op.is_right_assoc() { prec } else { prec + 1 };
            let right = self.parse_expr(next)?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
            // each link deepens the left spine
            self.enter()?;
        }
        self.nesting = outer;
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let Some(tok) = self.advance() else {
            return Err(ExprError::UnexpectedEnd);
        };
        match tok {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Ident(name) => {
                if matches!(self.peek(), Some(Token::Open(_))) {
                    self.parse_call(name)
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Token::Op(sym) => match UnOp::from_symbol(sym) {
                Some(op) => {
                    self.enter()?;
                    let operand = self.parse_primary()?;
                    self.nesting -= 1;
                    Ok(Expr::Unary { op, operand: Box::new(operand) })
                }
                None => Err(ExprError::UnexpectedToken(sym.to_string())),
            },
            Token::Open(open) => {
                let inner = self.parse_expr(0)?;
                self.expect_close(open)?;
                Ok(inner)
            }
            Token::Close(c) => Err(ExprError::StrayClosing(c)),
            Token::Comma => Err(ExprError::UnexpectedToken(",".into())),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ExprError> {
        let Some(Token::Open(open)) = self.advance() else {
            return Err(ExprError::UnexpectedEnd);
        };
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Token::Close(_))) {
            self.expect_close(open)?;
        } else {
            loop {
                args.push(self.parse_expr(0)?);
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.pos += 1;
                    continue;
                }
                self.expect_close(open)?;
                break;
            }
        }

        if !self.relaxed {
            let expected = match self.defining {
                Some((own, arity)) if own == name => Some(arity),
                _ => self.functions.arity(&name),
            };
            match expected {
                None => return Err(ExprError::UnknownFunction(name)),
                Some(n) if n != args.len() => {
                    return Err(ExprError::Arity { name, expected: n, got: args.len() });
                }
                Some(_) => {}
            }
        }
        Ok(Expr::Call { name, args })
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn enter(&mut self) -> Result<(), ExprError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ExprError::NestedTooDeep(MAX_NESTING));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_close(&mut self, open: char) -> Result<(), ExprError> {
        let expected = closing_for(open);
        match self.advance() {
            Some(Token::Close(c)) if c == expected => Ok(()),
            Some(tok) => Err(ExprError::Mismatched { expected, found: tok.text() }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
