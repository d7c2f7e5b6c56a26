//! proptest strategies for well-formed boards

use super::{
    Board, BoardId, Group, GroupId, HistoryEntry, Item, ItemId, ItemStatus, Lane, LaneId,
};
use chrono::{DateTime, Utc};
use proptest::prelude::*;

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| {
            DateTime::<Utc>::from_timestamp(secs, nanos).unwrap_or_default()
        })
}

fn status() -> impl Strategy<Value = ItemStatus> {
    prop_oneof![
        Just(ItemStatus::Todo),
        Just(ItemStatus::Doing),
        Just(ItemStatus::Done),
    ]
}

fn history_entry() -> impl Strategy<Value = HistoryEntry> {
    (timestamp(), status(), prop::option::of("\\PC{0,12}"))
        .prop_map(|(ts, status, comment)| HistoryEntry { ts, status, comment })
}

fn item() -> impl Strategy<Value = Item> {
    (
        "\\PC{0,16}",
        status(),
        prop::option::of(timestamp()),
        "\\PC{0,16}",
        prop::collection::vec(history_entry(), 0..3),
    )
        .prop_map(|(label, status, completed_at, notes, history)| Item {
            id: ItemId::from(""),
            label,
            status,
            completed_at,
            notes,
            history,
        })
}

/// A lane draft: title, group slot (which may point past the last group)
/// and items
fn lane() -> impl Strategy<Value = (String, Option<usize>, Vec<Item>)> {
    (
        "\\PC{0,12}",
        prop::option::of(0usize..4),
        prop::collection::vec(item(), 0..5),
    )
}

/// A board whose lane, group and item ids are unique. Lanes may reference
/// a missing group.
pub fn board() -> impl Strategy<Value = Board> {
    (
        "\\PC{0,12}",
        prop::collection::vec("\\PC{0,12}", 0..3),
        prop::collection::vec(lane(), 0..5),
        prop::collection::vec("[a-z]{1,6}", 0..2),
    )
        .prop_map(|(title, group_titles, lanes, links)| {
            let mut board = Board::new(title);
            board.groups = group_titles
                .into_iter()
                .enumerate()
                .map(|(g, title)| Group {
                    id: GroupId::from(format!("group-{}", g)),
                    title,
                })
                .collect();

            let mut next_item = 0;
            for (l, (title, slot, mut items)) in lanes.into_iter().enumerate() {
                for item in &mut items {
                    item.id = ItemId::from(format!("item-{}", next_item));
                    next_item += 1;
                }
                board.lanes.push(Lane {
                    id: LaneId::from(format!("lane-{}", l)),
                    title,
                    items,
                    group_id: slot.map(|g| GroupId::from(format!("group-{}", g))),
                });
            }

            board.links = links.into_iter().map(BoardId::from).collect();
            board
        })
}

pub fn boards() -> impl Strategy<Value = Vec<Board>> {
    prop::collection::vec(board(), 0..3).prop_map(|mut boards| {
        for (b, board) in boards.iter_mut().enumerate() {
            board.id = BoardId::from(format!("board-{}", b));
        }
        boards
    })
}
