pub mod config;
pub mod error;
pub mod expr;
pub mod runtime;
pub mod syntax;
pub mod timeline;
pub mod types;

pub use config::{Config, Limits};
pub use error::{Error, ErrorCode, ErrorKind, ExprError};
pub use expr::Engine;
pub use runtime::{DrawResult, Interpreter, RunMeta, TurtleState, Value};
pub use syntax::{parse_program, to_source, Node, NodeKind};
pub use timeline::{Canvas, Phase, Player, Timeline};
pub use types::color::Color;
pub use types::draw::{GridData, PathData, Pose, Primitive, TextData};
pub use types::quat::Quaternion;
