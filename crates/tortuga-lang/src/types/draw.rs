use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::types::color::Color;
use crate::types::quat::Quaternion;

/// Snapshot of the turtle glyph. `size` is 0 while the glyph is hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub orientation: Quaternion,
    pub color: Color,
    pub size: f64,
}

impl Pose {
    pub fn is_visible(&self) -> bool { self.size > 0.0 }
}

// ─── Primitive payloads ──────────────────────────────────────────────────────

/// A polyline. It stays open for appending while it is the timeline's
/// current path; `filled` may be set later by `fill`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub points: Vec<DVec3>,
    pub color: Color,
    pub thickness: f64,
    pub filled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub anchor: DVec3,
    pub text: String,
    pub size: f64,
    pub color: Color,
    pub orientation: Quaternion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    pub origin: DVec3,
    pub size: f64,
    pub divisions: u32,
    pub color: Color,
    pub orientation: Quaternion,
}

// ─── Primitive ───────────────────────────────────────────────────────────────

/// One renderable unit emitted by the interpreter, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Path(PathData),
    Head(Pose),
    Text(TextData),
    Grid(GridData),
    /// Discard everything drawn so far.
    Clear,
}

impl Primitive {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Path(_) => "path",
            Primitive::Head(_) => "head",
            Primitive::Text(_) => "text",
            Primitive::Grid(_) => "grid",
            Primitive::Clear => "clear",
        }
    }

    pub fn as_path(&self) -> Option<&PathData> {
        match self {
            Primitive::Path(p) => Some(p),
            _ => None,
        }
    }
}
