use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;
use crate::types::draw::{Pose, Primitive};

/// Playback progress relative to the timeline's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Start,
    /// Everything up to `end_time` is drawn; the glyph gets its final pose.
    Reaching,
    /// One tick after `Reaching`; the glyph has been rendered.
    Reached,
}

/// Drawing surface fed by [`Player::tick`].
pub trait Canvas {
    fn draw(&mut self, primitive: &Primitive);

    /// Final glyph pose, sent once on entering [`Phase::Reaching`].
    fn pose(&mut self, _pose: &Pose) {}

    /// Sent once on entering [`Phase::Reached`].
    fn snapshot(&mut self) {}
}

/// Incremental playback cursor over a [`Timeline`].
#[derive(Debug, Clone, Default)]
pub struct Player {
    last_render_time: u64,
    phase: Phase,
}

impl Player {
    pub fn new() -> Self { Self::default() }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn last_render_time(&self) -> u64 { self.last_render_time }

    /// Starts playback over from time zero.
    pub fn rewind(&mut self) { *self = Self::default(); }

    /// Draws every bucket in `[last_render_time, t)` and advances the cursor
    /// to `t`. A `t` earlier than the cursor draws nothing. Returns the
    /// number of primitives drawn.
    pub fn tick(&mut self, timeline: &Timeline, t: u64, canvas: &mut dyn Canvas) -> usize {
        let t = t.max(self.last_render_time);
        let mut drawn = 0;
        for (_, bucket) in timeline.range(self.last_render_time, t) {
            for primitive in bucket {
                canvas.draw(primitive);
                drawn += 1;
            }
        }
        self.last_render_time = t;

        match self.phase {
            Phase::Start if t > timeline.end_time() => {
                self.phase = Phase::Reaching;
                if let Some(pose) = timeline.final_pose() {
                    canvas.pose(pose);
                }
                log::debug!("playback reaching end at {t} ms");
            }
            Phase::Reaching => {
                self.phase = Phase::Reached;
                canvas.snapshot();
                log::debug!("playback reached end at {t} ms");
            }
            _ => {}
        }
        drawn
    }
}
