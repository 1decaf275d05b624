//! Embedded arithmetic language used for command arguments, loop counts,
//! `when` guards and string interpolation.

pub mod ast;
pub mod eval;
pub mod functions;
pub mod interpolate;
pub mod lexer;
pub mod parser;
pub mod token;

pub use eval::{Engine, NoVars, Variables};

/// Formats a number for display inside interpolated text: integers without
/// a fraction, values within 1e-10 of zero as `0`.
pub fn format_number(v: f64) -> String {
    if v.abs() < 1e-10 {
        return "0".to_string();
    }
    format!("{v}")
}
