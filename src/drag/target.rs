//! Nearest-gap lookup for item drops.

use crate::domain::{Board, LaneId};
use serde::{Deserialize, Serialize};

/// A position in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges are inclusive so zero-width gaps can still contain a point
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Squared distance from `p` to the center, or zero when `p` is inside
    fn distance_sq(&self, p: Point) -> f64 {
        if self.contains(p) {
            return 0.0;
        }
        let c = self.center();
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        dx * dx + dy * dy
    }
}

/// An insertion slot: `index` 0 is before a lane's first item, `index` N is
/// after its last
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GapKey {
    pub lane_id: LaneId,
    pub index: usize,
}

impl GapKey {
    pub fn new(lane_id: LaneId, index: usize) -> Self {
        Self { lane_id, index }
    }
}

/// Measured gap rectangles, kept in lane order then gap index.
///
/// A gap whose layout has not been measured yet is stored with no rectangle
/// and skipped by [`GapRegistry::resolve`].
#[derive(Debug, Clone, Default)]
pub struct GapRegistry {
    gaps: Vec<(GapKey, Option<Rect>)>,
}

impl GapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the registry from a board's current lanes, asking `measure`
    /// for each gap's rectangle
    pub fn rebuild<F>(&mut self, board: &Board, mut measure: F)
    where
        F: FnMut(&GapKey) -> Option<Rect>,
    {
        self.gaps.clear();
        for lane in &board.lanes {
            for index in 0..lane.gap_count() {
                let key = GapKey::new(lane.id.clone(), index);
                let rect = measure(&key);
                self.gaps.push((key, rect));
            }
        }
    }

    /// Records a rectangle for one gap, appending unknown gaps at the end
    pub fn set(&mut self, key: GapKey, rect: Option<Rect>) {
        match self.gaps.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = rect,
            None => self.gaps.push((key, rect)),
        }
    }

    /// Drops every gap belonging to `lane_id`
    pub fn remove_lane(&mut self, lane_id: &LaneId) {
        self.gaps.retain(|(k, _)| &k.lane_id != lane_id);
    }

    pub fn clear(&mut self) {
        self.gaps.clear();
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Finds the gap nearest to `pointer`.
    ///
    /// A gap containing the pointer scores zero; otherwise the squared
    /// distance to its center is used. Ties keep the first gap in registry
    /// order. Returns `None` when no gap has a rectangle.
    pub fn resolve(&self, pointer: Point) -> Option<GapKey> {
        let mut best: Option<(&GapKey, f64)> = None;
        for (key, rect) in &self.gaps {
            let Some(rect) = rect else { continue };
            let d = rect.distance_sq(pointer);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((key, d));
            }
        }
        best.map(|(key, _)| key.clone())
    }
}
