//! Virtual-time buckets of drawing primitives.
//!
//! Interpretation writes at `current_time`, which only `wait` advances.
//! Playback reads the buckets back in time order through a [`Player`].

pub mod player;

pub use player::{Canvas, Phase, Player};

use std::collections::BTreeMap;

use glam::DVec3;

use crate::types::draw::{PathData, Pose, Primitive};

#[derive(Debug, Clone)]
pub struct Timeline {
    buckets: BTreeMap<u64, Vec<Primitive>>,
    current_time: u64,
    end_time: u64,
    /// Bucket key and index of the path still accepting points.
    open_path: Option<(u64, usize)>,
    final_pose: Option<Pose>,
}

impl Default for Timeline {
    fn default() -> Self { Self::new() }
}

impl Timeline {
    pub fn new() -> Self {
        let mut buckets = BTreeMap::new();
        buckets.insert(0, Vec::new());
        Self { buckets, current_time: 0, end_time: 0, open_path: None, final_pose: None }
    }

    pub fn clear(&mut self) { *self = Self::new(); }

    /// Write cursor in milliseconds.
    pub fn current_time(&self) -> u64 { self.current_time }

    /// Largest timestamp reached.
    pub fn end_time(&self) -> u64 { self.end_time }

    /// Glyph pose at the end of the last run.
    pub fn final_pose(&self) -> Option<&Pose> { self.final_pose.as_ref() }

    pub fn finish(&mut self, pose: Pose) {
        self.close_path();
        self.final_pose = Some(pose);
    }

    /// Appends at the write cursor.
    pub fn push(&mut self, primitive: Primitive) {
        self.buckets.entry(self.current_time).or_default().push(primitive);
    }

    // ─── Open path ───────────────────────────────────────────────────────────

    /// Appends a new path at the write cursor and keeps it open.
    pub fn begin_path(&mut self, path: PathData) {
        let bucket = self.buckets.entry(self.current_time).or_default();
        bucket.push(Primitive::Path(path));
        self.open_path = Some((self.current_time, bucket.len() - 1));
    }

    /// Adds `point` to the open path. Returns false when no path is open.
    pub fn extend_path(&mut self, point: DVec3) -> bool {
        match self.open_path_mut() {
            Some(path) => {
                path.points.push(point);
                true
            }
            None => false,
        }
    }

    /// Marks the open path filled. Returns false when no path is open.
    pub fn fill_path(&mut self) -> bool {
        match self.open_path_mut() {
            Some(path) => {
                path.filled = true;
                true
            }
            None => false,
        }
    }

    pub fn close_path(&mut self) { self.open_path = None; }

    pub fn has_open_path(&self) -> bool { self.open_path.is_some() }

    fn open_path_mut(&mut self) -> Option<&mut PathData> {
        let (time, index) = self.open_path?;
        match self.buckets.get_mut(&time)?.get_mut(index)? {
            Primitive::Path(path) => Some(path),
            _ => None,
        }
    }

    // ─── Time ────────────────────────────────────────────────────────────────

    /// Moves the write cursor forward and makes sure a bucket exists there,
    /// so playback sees the boundary even if nothing is drawn after it.
    pub fn advance(&mut self, ms: u64) {
        self.close_path();
        self.current_time = self.current_time.saturating_add(ms);
        self.end_time = self.end_time.max(self.current_time);
        self.buckets.entry(self.current_time).or_default();
    }

    // ─── Reading ─────────────────────────────────────────────────────────────

    /// Buckets with keys in `[from, to)`, in time order.
    pub fn range(&self, from: u64, to: u64) -> impl Iterator<Item = (u64, &[Primitive])> {
        let upper = to.max(from);
        self.buckets.range(from..upper).map(|(t, ps)| (*t, ps.as_slice()))
    }

    pub fn buckets(&self) -> impl Iterator<Item = (u64, &[Primitive])> {
        self.buckets.iter().map(|(t, ps)| (*t, ps.as_slice()))
    }

    pub fn at(&self, time: u64) -> &[Primitive] {
        self.buckets.get(&time).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every primitive in emission order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.buckets.values().flatten()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathData> {
        self.primitives().filter_map(Primitive::as_path)
    }

    pub fn len(&self) -> usize { self.buckets.values().map(Vec::len).sum() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
