//! Function tables of the expression engine: a fixed set of math built-ins
//! and the user functions declared with `defn`.

use std::collections::HashMap;

use crate::expr::ast::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Sin, Cos, Tan, Asin, Acos, Atan,
    Sqrt, Log, Exp, Abs, Floor, Ceil, Round, Sign,
    Min, Max, Atan2, Pow,
}

impl MathFn {
    pub fn from_name(name: &str) -> Option<MathFn> {
        Some(match name {
            "sin" => MathFn::Sin,
            "cos" => MathFn::Cos,
            "tan" => MathFn::Tan,
            "asin" => MathFn::Asin,
            "acos" => MathFn::Acos,
            "atan" => MathFn::Atan,
            "sqrt" => MathFn::Sqrt,
            "log" => MathFn::Log,
            "exp" => MathFn::Exp,
            "abs" => MathFn::Abs,
            "floor" => MathFn::Floor,
            "ceil" => MathFn::Ceil,
            "round" => MathFn::Round,
            "sign" => MathFn::Sign,
            "min" => MathFn::Min,
            "max" => MathFn::Max,
            "atan2" => MathFn::Atan2,
            "pow" => MathFn::Pow,
            _ => return None,
        })
    }

    pub fn arity(self) -> usize {
        match self {
            MathFn::Min | MathFn::Max | MathFn::Atan2 | MathFn::Pow => 2,
            _ => 1,
        }
    }

    /// `args.len()` has already been checked against `arity`.
    pub fn apply(self, args: &[f64]) -> f64 {
        let a = args[0];
        match self {
            MathFn::Sin => a.sin(),
            MathFn::Cos => a.cos(),
            MathFn::Tan => a.tan(),
            MathFn::Asin => a.asin(),
            MathFn::Acos => a.acos(),
            MathFn::Atan => a.atan(),
            MathFn::Sqrt => a.sqrt(),
            MathFn::Log => a.ln(),
            MathFn::Exp => a.exp(),
            MathFn::Abs => a.abs(),
            MathFn::Floor => a.floor(),
            MathFn::Ceil => a.ceil(),
            MathFn::Round => a.round(),
            MathFn::Sign => if a == 0.0 { 0.0 } else { a.signum() },
            MathFn::Min => a.min(args[1]),
            MathFn::Max => a.max(args[1]),
            MathFn::Atan2 => a.atan2(args[1]),
            MathFn::Pow => a.powf(args[1]),
        }
    }
}

/// A `defn` body, parsed once and evaluated per call.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFn {
    pub params: Vec<String>,
    pub body: Expr,
}

impl UserFn {
    pub fn arity(&self) -> usize { self.params.len() }
}

#[derive(Debug, Default, Clone)]
pub struct Functions {
    user: HashMap<String, UserFn>,
}

impl Functions {
    pub fn arity(&self, name: &str) -> Option<usize> {
        MathFn::from_name(name)
            .map(MathFn::arity)
            .or_else(|| self.user.get(name).map(UserFn::arity))
    }

    pub fn user(&self, name: &str) -> Option<&UserFn> {
        self.user.get(name)
    }

    pub fn insert(&mut self, name: String, f: UserFn) {
        self.user.insert(name, f);
    }

    pub fn clear(&mut self) {
        self.user.clear();
    }

    pub fn len(&self) -> usize { self.user.len() }
    pub fn is_empty(&self) -> bool { self.user.is_empty() }
}
