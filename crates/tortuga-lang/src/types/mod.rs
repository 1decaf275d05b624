pub mod color;
pub mod draw;
pub mod quat;
