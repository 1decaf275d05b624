use std::collections::HashMap;

use crate::error::ExprError;
use crate::expr::ast::{BinOp, Expr, UnOp};
use crate::expr::functions::{Functions, MathFn, UserFn};
use crate::expr::lexer::Lexer;
use crate::expr::parser::Parser;

/// Nesting bound for user function calls inside one evaluation.
pub const MAX_CALL_DEPTH: usize = 256;

/// Read-only variable lookup for evaluation.
pub trait Variables {
    fn var(&self, name: &str) -> Option<f64>;
}

impl Variables for HashMap<String, f64> {
    fn var(&self, name: &str) -> Option<f64> { self.get(name).copied() }
}

impl Variables for HashMap<&str, f64> {
    fn var(&self, name: &str) -> Option<f64> { self.get(name).copied() }
}

/// The empty scope.
pub struct NoVars;

impl Variables for NoVars {
    fn var(&self, _: &str) -> Option<f64> { None }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "tau" => Some(std::f64::consts::TAU),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn truthy(v: f64) -> bool { v != 0.0 && !v.is_nan() }

fn flag(b: bool) -> f64 { if b { 1.0 } else { 0.0 } }

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Arithmetic expression engine: parses and evaluates expressions, owns the
/// `defn` function table.
#[derive(Debug, Default, Clone)]
pub struct Engine {
    functions: Functions,
}

impl Engine {
    pub fn new() -> Self { Self::default() }

    pub fn functions(&self) -> &Functions { &self.functions }

    pub fn clear(&mut self) { self.functions.clear(); }

    pub fn parse(&self, source: &str) -> Result<Expr, ExprError> {
        let tokens = Lexer::new(source).tokenize()?;
        Parser::new(tokens, &self.functions).parse()
    }

    /// Evaluates `source`; a `defn SIGNATURE, BODY` statement defines a
    /// function instead and yields 0.
    pub fn evaluate(&mut self, source: &str, vars: &dyn Variables) -> Result<f64, ExprError> {
        let trimmed = source.trim();
        if let Some(rest) = trimmed.strip_prefix("defn") {
            if rest.starts_with(char::is_whitespace) {
                let (signature, body) = split_definition(rest)
                    .ok_or_else(|| ExprError::InvalidSignature(rest.trim().to_string()))?;
                self.define(signature, body)?;
                return Ok(0.0);
            }
        }
        let expr = self.parse(trimmed)?;
        self.eval(&expr, vars)
    }

    /// Declares `signature` (`name(a, b)` or a bare `name`) with `body`.
    /// The body is parsed once here. Returns the function name.
    pub fn define(&mut self, signature: &str, body: &str) -> Result<String, ExprError> {
        let tokens = Lexer::new(signature).tokenize()?;
        let (name, args) = match Parser::new(tokens, &self.functions).relaxed().parse()? {
            Expr::Call { name, args } => (name, args),
            Expr::Variable(name) => (name, Vec::new()),
            _ => return Err(ExprError::InvalidSignature(signature.trim().to_string())),
        };
        if MathFn::from_name(&name).is_some() {
            return Err(ExprError::BuiltinShadow(name));
        }
        let params = args.into_iter()
            .map(|a| match a {
                Expr::Variable(p) => Ok(p),
                other => Err(ExprError::InvalidParameter(describe(&other))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tokens = Lexer::new(body).tokenize()?;
        let body = Parser::new(tokens, &self.functions)
            .defining(&name, params.len())
            .parse()?;
        log::trace!("defn {name}/{}", params.len());
        self.functions.insert(name.clone(), UserFn { params, body });
        Ok(name)
    }

    pub fn eval(&self, expr: &Expr, vars: &dyn Variables) -> Result<f64, ExprError> {
        self.eval_at(expr, vars, 0)
    }

    fn eval_at(&self, expr: &Expr, vars: &dyn Variables, depth: usize) -> Result<f64, ExprError> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => self.resolve(name, vars, depth),
            Expr::Unary { op, operand } => {
                let v = self.eval_at(operand, vars, depth)?;
                Ok(match op {
                    UnOp::Plus => v,
                    UnOp::Neg => -v,
                    UnOp::Not => flag(!truthy(v)),
                })
            }
            Expr::Binary { op: BinOp::And, left, right } => {
                let l = self.eval_at(left, vars, depth)?;
                if !truthy(l) { return Ok(0.0); }
                Ok(flag(truthy(self.eval_at(right, vars, depth)?)))
            }
            Expr::Binary { op: BinOp::Or, left, right } => {
                let l = self.eval_at(left, vars, depth)?;
                if truthy(l) { return Ok(1.0); }
                Ok(flag(truthy(self.eval_at(right, vars, depth)?)))
            }
            Expr::Binary { op, left, right } => {
                let l = self.eval_at(left, vars, depth)?;
                let r = self.eval_at(right, vars, depth)?;
                Ok(apply_binop(*op, l, r))
            }
            Expr::Call { name, args } => {
                let values = args.iter()
                    .map(|a| self.eval_at(a, vars, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, &values, depth)
            }
        }
    }

    /// Context first, then constants, then zero-argument user functions.
    fn resolve(&self, name: &str, vars: &dyn Variables, depth: usize) -> Result<f64, ExprError> {
        if let Some(v) = vars.var(name).or_else(|| constant(name)) {
            return Ok(v);
        }
        match self.functions.user(name) {
            Some(f) if f.arity() == 0 => self.call(name, &[], depth),
            _ => Err(ExprError::UndefinedVariable(name.to_string())),
        }
    }

    fn call(&self, name: &str, args: &[f64], depth: usize) -> Result<f64, ExprError> {
        if let Some(f) = MathFn::from_name(name) {
            check_arity(name, f.arity(), args.len())?;
            return Ok(f.apply(args));
        }
        let f = self.functions.user(name)
            .ok_or_else(|| ExprError::UnknownFunction(name.to_string()))?;
        check_arity(name, f.arity(), args.len())?;
        if depth >= MAX_CALL_DEPTH {
            return Err(ExprError::TooDeep(MAX_CALL_DEPTH));
        }
        let scope: HashMap<&str, f64> = f.params.iter()
            .map(String::as_str)
            .zip(args.iter().copied())
            .collect();
        self.eval_at(&f.body, &scope, depth + 1)
    }
}

fn check_arity(name: &str, expected: usize, got: usize) -> Result<(), ExprError> {
    if expected == got {
        Ok(())
    } else {
        Err(ExprError::Arity { name: name.to_string(), expected, got })
    }
}

fn apply_binop(op: BinOp, l: f64, r: f64) -> f64 {
    match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::IntDiv => (l / r).floor(),
        BinOp::Pow => l.powf(r),
        BinOp::Eq => flag(l == r),
        BinOp::NotEq => flag(l != r),
        BinOp::Lt => flag(l < r),
        BinOp::LtEq => flag(l <= r),
        BinOp::Gt => flag(l > r),
        BinOp::GtEq => flag(l >= r),
        BinOp::BitAnd => ((l as i64) & (r as i64)) as f64,
        BinOp::BitOr => ((l as i64) | (r as i64)) as f64,
        BinOp::And => flag(truthy(l) && truthy(r)),
        BinOp::Or => flag(truthy(l) || truthy(r)),
    }
}

/// Splits `NAME(…), BODY` at the first comma outside brackets.
fn split_definition(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                let (sig, body) = (text[..i].trim(), text[i + 1..].trim());
                return (!sig.is_empty() && !body.is_empty()).then_some((sig, body));
            }
            _ => {}
        }
    }
    None
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Number(n) => n.to_string(),
        Expr::Variable(v) => v.clone(),
        Expr::Call { name, .. } => format!("{name}(…)"),
        Expr::Binary { .. } | Expr::Unary { .. } => "expression".to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
