pub mod board;
pub mod item;
pub mod normalize;
pub mod seed;
#[cfg(test)]
pub(crate) mod strategies;

pub use board::{Board, BoardId, Group, GroupId, Lane, LaneBucket, LaneId};
pub use item::{HistoryEntry, Item, ItemId, ItemPatch, ItemStatus};
pub use normalize::{normalize, parse_raw_boards, RawBoard};
pub use seed::seed_boards;
