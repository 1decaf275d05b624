use std::collections::HashMap;
use std::fmt;

use crate::expr::{format_number, Variables};

/// An evaluated command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
}

impl Value {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Num(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

// ─── Context ─────────────────────────────────────────────────────────────────

/// Parameter bindings of one function invocation. A fresh context is built
/// per call and never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
    depth: u64,
}

impl Context {
    /// Top-level scope: no bindings, depth 0.
    pub fn root() -> Self { Self::default() }

    /// Scope for a call made from `self`, one level deeper.
    pub fn call(&self, vars: HashMap<String, Value>) -> Self {
        Self { vars, depth: self.depth + 1 }
    }

    pub fn depth(&self) -> u64 { self.depth }

    pub fn get(&self, name: &str) -> Option<&Value> { self.vars.get(name) }
}

/// Only numeric bindings are visible to expressions.
impl Variables for Context {
    fn var(&self, name: &str) -> Option<f64> {
        self.vars.get(name).and_then(Value::as_num)
    }
}
