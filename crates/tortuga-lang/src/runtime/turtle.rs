//! Turtle pose, pen and counters, plus the movement primitives every
//! built-in command is made of.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::syntax::ast::Node;
use crate::timeline::Timeline;
use crate::types::color::Color;
use crate::types::draw::{PathData, Pose};
use crate::types::quat::Quaternion;

/// Outcome of the last run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum RunMeta {
    #[default]
    Idle,
    Success { ast: Vec<Node>, commands: u64 },
    Failure { message: String, source: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurtleState {
    pub position: DVec3,
    /// Always unit length.
    pub orientation: Quaternion,
    pub pen_down: bool,
    pub color: Color,
    pub thickness: f64,
    pub visible: bool,
    /// Glyph size while visible.
    pub size: f64,
    /// Built-in commands executed this run.
    pub commands: u64,
    /// Calls made at depth > 1 this run.
    pub recursions: u64,
    pub meta: RunMeta,
}

impl TurtleState {
    pub fn new(config: &Config) -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: Quaternion::IDENTITY,
            pen_down: true,
            color: config.color,
            thickness: config.thickness,
            visible: true,
            size: config.glyph_size,
            commands: 0,
            recursions: 0,
            meta: RunMeta::Idle,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            orientation: self.orientation,
            color: self.color,
            size: if self.visible { self.size } else { 0.0 },
        }
    }

    /// Unit vector the turtle is facing: local +X in world space.
    pub fn heading(&self) -> DVec3 {
        self.orientation.rotate(DVec3::X)
    }

    // ─── Movement ────────────────────────────────────────────────────────────

    pub fn forward(&mut self, distance: f64, timeline: &mut Timeline) {
        let target = self.position + self.heading() * distance;
        self.move_to(target, timeline);
    }

    /// Moves to `target`, drawing when the pen is down. Consecutive pen-down
    /// moves extend one path; a pen-up move closes it.
    pub fn move_to(&mut self, target: DVec3, timeline: &mut Timeline) {
        if self.pen_down {
            if !timeline.extend_path(target) {
                timeline.begin_path(PathData {
                    points: vec![self.position, target],
                    color: self.color,
                    thickness: self.thickness,
                    filled: false,
                });
            }
        } else {
            timeline.close_path();
        }
        self.position = target;
    }

    /// Pen up, move, pen down.
    pub fn jump_to(&mut self, target: DVec3, timeline: &mut Timeline) {
        self.teleport(target, timeline);
        self.pen_down = true;
    }

    pub fn jump(&mut self, distance: f64, timeline: &mut Timeline) {
        let target = self.position + self.heading() * distance;
        self.jump_to(target, timeline);
    }

    // ─── Rotation ────────────────────────────────────────────────────────────

    /// Turn about local Z; positive is counter-clockwise seen from above.
    pub fn yaw(&mut self, degrees: f64) { self.rotate_local(DVec3::Z, degrees); }

    /// Turn about local Y; positive tips the nose down.
    pub fn pitch(&mut self, degrees: f64) { self.rotate_local(DVec3::Y, degrees); }

    /// Turn about local X (the heading).
    pub fn roll(&mut self, degrees: f64) { self.rotate_local(DVec3::X, degrees); }

    fn rotate_local(&mut self, axis: DVec3, degrees: f64) {
        self.orientation = self.orientation * Quaternion::from_axis_angle(axis, degrees);
    }

    /// Replaces the orientation so the heading points at `target`, with no
    /// roll. A target at the current position gives the identity.
    pub fn face(&mut self, target: DVec3) {
        let d = target - self.position;
        let yaw = d.y.atan2(d.x).to_degrees();
        let pitch = -d.z.atan2(d.x.hypot(d.y)).to_degrees();
        self.orientation = Quaternion::from_axis_angle(DVec3::Z, yaw)
            * Quaternion::from_axis_angle(DVec3::Y, pitch);
    }

    /// Back to the origin facing +X, without drawing.
    pub fn home(&mut self, timeline: &mut Timeline) {
        self.teleport(DVec3::ZERO, timeline);
        self.orientation = Quaternion::IDENTITY;
    }

    /// Moves without drawing and keeps the pen state.
    fn teleport(&mut self, target: DVec3, timeline: &mut Timeline) {
        timeline.close_path();
        self.position = target;
    }
}
