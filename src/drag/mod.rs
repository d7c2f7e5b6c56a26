pub mod container;
pub mod item;
pub mod target;

pub use container::{ContainerDrag, DropZone};
pub use item::{
    AlwaysListening, GestureOutcome, GesturePhase, Ghost, ItemGesture, PointerSource,
    PointerSubscription,
};
pub use target::{GapKey, GapRegistry, Point, Rect};

/// The one drag that may be in flight
#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Item(ItemGesture),
    Container(ContainerDrag),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
