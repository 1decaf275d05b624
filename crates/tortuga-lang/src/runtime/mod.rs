pub mod commands;
pub mod interpreter;
pub mod turtle;
pub mod value;

pub use commands::Builtin;
pub use interpreter::{DrawResult, Interpreter};
pub use turtle::{RunMeta, TurtleState};
pub use value::{Context, Value};
