//! Program syntax: line splitting, block structure and the source printer.

pub mod ast;
pub mod parser;
pub mod print;

pub use ast::{Meta, Node, NodeKind};
pub use parser::parse_program;
pub use print::to_source;
