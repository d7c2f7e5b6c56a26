//! # Laneboard Core
//!
//! Reordering and state-synchronization engine for grouped kanban boards.
//!
//! Boards hold lanes (bucketed by group) and lanes hold items. Items are
//! reordered with a continuous pointer drag resolved against measured
//! insertion gaps; lanes and groups are reordered with a discrete
//! start/over/drop protocol. Status and notes edits append to each item's
//! history. The whole collection round-trips through an opaque snapshot
//! token. Nothing here depends on a particular UI toolkit.

pub mod config;
pub mod domain;
pub mod drag;
pub mod editor;
pub mod error;
pub mod snapshot;
pub mod storage;

// Re-export commonly used types
pub use config::EditorConfig;
pub use domain::{
    board::{Board, BoardId, Group, GroupId, Lane, LaneId},
    item::{HistoryEntry, Item, ItemId, ItemPatch, ItemStatus},
};
pub use drag::{ContainerDrag, DropZone, GapKey, GapRegistry, Point, PointerSource, Rect};
pub use editor::{Action, BoardEditor};
pub use error::{BoardError, Result};
pub use snapshot::SnapshotToken;
pub use storage::Storage;
