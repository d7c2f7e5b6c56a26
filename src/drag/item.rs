//! Continuous pointer drag for items.
//!
//! A gesture starts `Armed` on press and only becomes `Dragging` once the
//! pointer has travelled past the configured threshold. Releasing while
//! still armed is a click.

use crate::{
    config::EditorConfig,
    domain::{ItemId, LaneId},
    drag::target::{GapKey, GapRegistry, Point},
};
use std::{fmt, rc::Rc};
use tracing::trace;

/// Host-side pointer-move/up observation
pub trait PointerSource {
    fn listen(&self);
    fn unlisten(&self);
}

/// A source for hosts that route every pointer event to the editor anyway
#[derive(Debug, Default)]
pub struct AlwaysListening;

impl PointerSource for AlwaysListening {
    fn listen(&self) {}
    fn unlisten(&self) {}
}

/// Pointer listeners held for the lifetime of one gesture. Dropping the
/// subscription detaches them.
pub struct PointerSubscription {
    source: Rc<dyn PointerSource>,
}

impl PointerSubscription {
    pub fn acquire(source: Rc<dyn PointerSource>) -> Self {
        source.listen();
        Self { source }
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        self.source.unlisten();
    }
}

impl fmt::Debug for PointerSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PointerSubscription")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Armed,
    Dragging,
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Released before the threshold was crossed
    Click(ItemId),
    /// Released over a resolved gap
    Drop { item_id: ItemId, target: GapKey },
    /// Dragged, but released with no gap resolved
    Cancelled(ItemId),
}

/// Floating copy of the dragged item
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub item_id: ItemId,
    pub position: Point,
}

/// State of one press-to-release item gesture
#[derive(Debug)]
pub struct ItemGesture {
    item_id: ItemId,
    origin_lane: LaneId,
    start: Point,
    pointer: Point,
    phase: GesturePhase,
    target: Option<GapKey>,
    _listeners: PointerSubscription,
}

impl ItemGesture {
    /// Arms a gesture on an item's grab handle. Nothing is shown or moved
    /// until the pointer crosses the drag threshold.
    pub fn arm(
        item_id: ItemId,
        origin_lane: LaneId,
        start: Point,
        listeners: PointerSubscription,
    ) -> Self {
        trace!(item = %item_id, lane = %origin_lane, "item gesture armed");
        Self {
            item_id,
            origin_lane,
            start,
            pointer: start,
            phase: GesturePhase::Armed,
            target: None,
            _listeners: listeners,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn origin_lane(&self) -> &LaneId {
        &self.origin_lane
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }

    /// The live drop target, only while dragging
    pub fn hot_gap(&self) -> Option<&GapKey> {
        if self.is_dragging() {
            self.target.as_ref()
        } else {
            None
        }
    }

    pub fn ghost(&self) -> Option<Ghost> {
        self.is_dragging().then(|| Ghost {
            item_id: self.item_id.clone(),
            position: self.pointer,
        })
    }

    /// Feeds one pointer sample. Returns the auto-scroll delta to apply,
    /// if any.
    pub fn track(
        &mut self,
        pointer: Point,
        gaps: &GapRegistry,
        config: &EditorConfig,
        viewport_height: f64,
    ) -> Option<f64> {
        self.pointer = pointer;

        if self.phase == GesturePhase::Armed {
            let dx = (pointer.x - self.start.x).abs();
            let dy = (pointer.y - self.start.y).abs();
            if dx <= config.drag_threshold && dy <= config.drag_threshold {
                return None;
            }
            trace!(item = %self.item_id, "item gesture crossed drag threshold");
            self.phase = GesturePhase::Dragging;
        }

        self.target = gaps.resolve(pointer);
        autoscroll_delta(pointer.y, viewport_height, config)
    }

    /// Ends the gesture, releasing its pointer listeners
    pub fn finish(self) -> GestureOutcome {
        match (self.phase, self.target) {
            (GesturePhase::Armed, _) => GestureOutcome::Click(self.item_id),
            (GesturePhase::Dragging, Some(target)) => GestureOutcome::Drop {
                item_id: self.item_id,
                target,
            },
            (GesturePhase::Dragging, None) => GestureOutcome::Cancelled(self.item_id),
        }
    }
}

/// Scroll step for a pointer near the top (negative) or bottom (positive)
/// edge of the viewport
pub fn autoscroll_delta(y: f64, viewport_height: f64, config: &EditorConfig) -> Option<f64> {
    if y < config.autoscroll_margin {
        Some(-config.autoscroll_step)
    } else if y > viewport_height - config.autoscroll_margin {
        Some(config.autoscroll_step)
    } else {
        None
    }
}
