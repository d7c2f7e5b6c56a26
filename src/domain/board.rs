use crate::{
    domain::item::{Item, ItemId, ItemPatch},
    error::{BoardError, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh, globally unique id
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a board
    BoardId
);
string_id!(
    /// Unique identifier for a group within a board
    GroupId
);
string_id!(
    /// Unique identifier for a lane within a board
    LaneId
);

/// A display bucket for lanes. Removing one never removes its lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
}

impl Group {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: GroupId::generate(),
            title: title.into(),
        }
    }
}

/// An ordered column of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub title: String,
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl Lane {
    pub fn new(title: impl Into<String>, group_id: Option<GroupId>) -> Self {
        Self {
            id: LaneId::generate(),
            title: title.into(),
            items: Vec::new(),
            group_id,
        }
    }

    /// Number of insertion gaps this lane exposes (one before each item
    /// plus one at the end)
    pub fn gap_count(&self) -> usize {
        self.items.len() + 1
    }

    pub fn position_of(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == item_id)
    }
}

/// Lanes as they are displayed: one bucket per group, then the ungrouped
/// lanes
#[derive(Debug)]
pub struct LaneBucket<'a> {
    /// `None` for the trailing ungrouped bucket
    pub group: Option<&'a Group>,
    pub lanes: Vec<&'a Lane>,
}

/// A board: a flat lane sequence bucketed by each lane's group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub lanes: Vec<Lane>,
    pub groups: Vec<Group>,
    pub links: Vec<BoardId>,
}

impl Board {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: BoardId::generate(),
            title: title.into(),
            lanes: Vec::new(),
            groups: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Records a parent/child reference to another board
    pub fn link(&mut self, other: BoardId) {
        if other != self.id && !self.links.contains(&other) {
            self.links.push(other);
        }
    }

    pub fn has_group(&self, group_id: &GroupId) -> bool {
        self.groups.iter().any(|g| &g.id == group_id)
    }

    pub fn group(&self, group_id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == group_id)
    }

    pub fn lane(&self, lane_id: &LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| &l.id == lane_id)
    }

    fn lane_index(&self, lane_id: &LaneId) -> Option<usize> {
        self.lanes.iter().position(|l| &l.id == lane_id)
    }

    fn lane_mut(&mut self, lane_id: &LaneId) -> Result<&mut Lane> {
        self.lanes
            .iter_mut()
            .find(|l| &l.id == lane_id)
            .ok_or_else(|| BoardError::LaneNotFound(lane_id.to_string()))
    }

    /// Finds an item together with the lane that owns it
    pub fn find_item(&self, item_id: &ItemId) -> Option<(&Lane, &Item)> {
        self.lanes.iter().find_map(|lane| {
            lane.items
                .iter()
                .find(|item| &item.id == item_id)
                .map(|item| (lane, item))
        })
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.find_item(item_id).map(|(_, item)| item)
    }

    fn item_mut(&mut self, item_id: &ItemId) -> Result<&mut Item> {
        self.lanes
            .iter_mut()
            .flat_map(|lane| lane.items.iter_mut())
            .find(|item| &item.id == item_id)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.to_string()))
    }

    /// Total number of items across every lane
    pub fn item_count(&self) -> usize {
        self.lanes.iter().map(|l| l.items.len()).sum()
    }

    /// The group a lane is displayed under. A group id that references no
    /// group on this board is shown as ungrouped.
    pub fn effective_group<'a>(&'a self, lane: &'a Lane) -> Option<&'a GroupId> {
        lane.group_id.as_ref().filter(|g| self.has_group(g))
    }

    /// Lanes displayed under `group_id` (`None` for ungrouped), in flat order
    pub fn lanes_in_group(&self, group_id: Option<&GroupId>) -> Vec<&Lane> {
        self.lanes
            .iter()
            .filter(|lane| self.effective_group(lane) == group_id)
            .collect()
    }

    /// Display buckets in group order followed by the ungrouped bucket
    pub fn grouped_lanes(&self) -> Vec<LaneBucket<'_>> {
        let mut buckets: Vec<LaneBucket<'_>> = self
            .groups
            .iter()
            .map(|group| LaneBucket {
                group: Some(group),
                lanes: self.lanes_in_group(Some(&group.id)),
            })
            .collect();
        buckets.push(LaneBucket {
            group: None,
            lanes: self.lanes_in_group(None),
        });
        buckets
    }

    pub fn add_group(&mut self, title: impl Into<String>) -> GroupId {
        let group = Group::new(title);
        let id = group.id.clone();
        self.groups.push(group);
        id
    }

    pub fn rename_group(&mut self, group_id: &GroupId, title: impl Into<String>) -> Result<()> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| &g.id == group_id)
            .ok_or_else(|| BoardError::GroupNotFound(group_id.to_string()))?;
        group.title = title.into();
        Ok(())
    }

    /// Removes a group. Its lanes stay on the board, ungrouped.
    pub fn remove_group(&mut self, group_id: &GroupId) -> Result<Group> {
        let pos = self
            .groups
            .iter()
            .position(|g| &g.id == group_id)
            .ok_or_else(|| BoardError::GroupNotFound(group_id.to_string()))?;
        for lane in self
            .lanes
            .iter_mut()
            .filter(|l| l.group_id.as_ref() == Some(group_id))
        {
            lane.group_id = None;
        }
        Ok(self.groups.remove(pos))
    }

    /// Appends a lane to the end of the flat sequence
    pub fn add_lane(
        &mut self,
        title: impl Into<String>,
        group_id: Option<GroupId>,
    ) -> Result<LaneId> {
        if let Some(group_id) = &group_id {
            if !self.has_group(group_id) {
                return Err(BoardError::GroupNotFound(group_id.to_string()));
            }
        }
        let lane = Lane::new(title, group_id);
        let id = lane.id.clone();
        self.lanes.push(lane);
        Ok(id)
    }

    pub fn rename_lane(&mut self, lane_id: &LaneId, title: impl Into<String>) -> Result<()> {
        self.lane_mut(lane_id)?.title = title.into();
        Ok(())
    }

    /// Appends a new todo item to a lane
    pub fn add_item(&mut self, lane_id: &LaneId, label: impl Into<String>) -> Result<ItemId> {
        let item = Item::new(label);
        let id = item.id.clone();
        self.lane_mut(lane_id)?.items.push(item);
        Ok(id)
    }

    pub fn rename_item(&mut self, item_id: &ItemId, label: impl Into<String>) -> Result<()> {
        self.item_mut(item_id)?.set_label(label);
        Ok(())
    }

    /// Replaces an item with the result of applying `patch` at `now`
    pub fn patch_item(
        &mut self,
        item_id: &ItemId,
        patch: &ItemPatch,
        now: DateTime<Utc>,
    ) -> Result<&Item> {
        let item = self.item_mut(item_id)?;
        *item = item.apply_patch(patch, now);
        Ok(&*item)
    }

    /// Moves an item into `to_lane` at `index`.
    ///
    /// The index is clamped to the destination length measured after the
    /// item left its source lane. Either the whole move happens or nothing
    /// changes. Returns the index the item landed at.
    ///
    /// Gesture gap indices count the dragged item itself, so callers
    /// resolving a same-lane drop must subtract one for gaps after it
    /// (see `BoardEditor::on_pointer_up`).
    pub fn move_item(
        &mut self,
        item_id: &ItemId,
        to_lane: &LaneId,
        index: usize,
    ) -> Result<usize> {
        let dest = self
            .lane_index(to_lane)
            .ok_or_else(|| BoardError::LaneNotFound(to_lane.to_string()))?;

        let owners: Vec<(usize, usize)> = self
            .lanes
            .iter()
            .enumerate()
            .flat_map(|(li, lane)| {
                lane.items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| &item.id == item_id)
                    .map(move |(pos, _)| (li, pos))
            })
            .collect();

        let (src, pos) = match owners.as_slice() {
            [] => return Err(BoardError::ItemNotFound(item_id.to_string())),
            [owner] => *owner,
            _ => {
                debug_assert_eq!(owners.len(), 1, "item {} has several owners", item_id);
                return Err(BoardError::InvariantViolation {
                    item: item_id.to_string(),
                    lanes: owners.len(),
                });
            }
        };

        let item = self.lanes[src].items.remove(pos);
        let items = &mut self.lanes[dest].items;
        let at = index.min(items.len());
        items.insert(at, item);
        Ok(at)
    }

    /// Moves a lane into `to_group` (`None` for ungrouped) at `index`.
    ///
    /// `index` counts only the lanes displayed in the destination group;
    /// lanes of other groups are skipped when locating the flat position.
    pub fn move_lane(
        &mut self,
        lane_id: &LaneId,
        to_group: Option<&GroupId>,
        index: usize,
    ) -> Result<()> {
        if let Some(group_id) = to_group {
            if !self.has_group(group_id) {
                return Err(BoardError::GroupNotFound(group_id.to_string()));
            }
        }
        let from = self
            .lane_index(lane_id)
            .ok_or_else(|| BoardError::LaneNotFound(lane_id.to_string()))?;

        let mut lane = self.lanes.remove(from);
        lane.group_id = to_group.cloned();

        let peers: Vec<usize> = self
            .lanes
            .iter()
            .enumerate()
            .filter(|(_, l)| self.effective_group(l) == to_group)
            .map(|(i, _)| i)
            .collect();
        let at = match peers.get(index) {
            Some(&flat) => flat,
            None => peers.last().map_or(self.lanes.len(), |&last| last + 1),
        };

        self.lanes.insert(at, lane);
        Ok(())
    }

    /// Reorders display buckets. Lane membership is unaffected.
    pub fn move_group(&mut self, group_id: &GroupId, index: usize) -> Result<()> {
        let from = self
            .groups
            .iter()
            .position(|g| &g.id == group_id)
            .ok_or_else(|| BoardError::GroupNotFound(group_id.to_string()))?;
        let group = self.groups.remove(from);
        let at = index.min(self.groups.len());
        self.groups.insert(at, group);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{item::ItemStatus, strategies};
    use proptest::prelude::*;

    fn ids(lane: &Lane) -> Vec<&str> {
        lane.items.iter().map(|i| i.label.as_str()).collect()
    }

    fn board_with_lanes(sizes: &[(&str, usize)]) -> Board {
        let mut board = Board::new("Test");
        for (title, size) in sizes {
            let lane = board.add_lane(*title, None).unwrap();
            for n in 0..*size {
                board.add_item(&lane, format!("{}{}", title, n)).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_move_item_between_lanes() {
        let mut board = board_with_lanes(&[("a", 4), ("b", 2)]);
        let lane_b = board.lanes[1].id.clone();
        let x = board.lanes[0].items[2].id.clone();

        let at = board.move_item(&x, &lane_b, 1).unwrap();

        assert_eq!(at, 1);
        assert_eq!(ids(&board.lanes[0]), vec!["a0", "a1", "a3"]);
        assert_eq!(ids(&board.lanes[1]), vec!["b0", "a2", "b1"]);
    }

    #[test]
    fn test_move_item_within_lane_clamps_after_removal() {
        let mut board = board_with_lanes(&[("a", 3)]);
        let lane_a = board.lanes[0].id.clone();
        let first = board.lanes[0].items[0].id.clone();

        let at = board.move_item(&first, &lane_a, 3).unwrap();

        assert_eq!(at, 2);
        assert_eq!(ids(&board.lanes[0]), vec!["a1", "a2", "a0"]);
    }

    #[test]
    fn test_move_item_unknown_target_is_untouched() {
        let mut board = board_with_lanes(&[("a", 2)]);
        let before = board.clone();
        let item = board.lanes[0].items[0].id.clone();

        assert!(matches!(
            board.move_item(&item, &LaneId::from("missing"), 0),
            Err(BoardError::LaneNotFound(_))
        ));
        assert!(matches!(
            board.move_item(&ItemId::from("missing"), &before.lanes[0].id, 0),
            Err(BoardError::ItemNotFound(_))
        ));
        assert_eq!(board, before);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_move_item_reports_duplicate_owner() {
        let mut board = board_with_lanes(&[("a", 1), ("b", 0)]);
        let dup = board.lanes[0].items[0].clone();
        board.lanes[1].items.push(dup.clone());
        let lane_a = board.lanes[0].id.clone();

        assert!(matches!(
            board.move_item(&dup.id, &lane_a, 0),
            Err(BoardError::InvariantViolation { lanes: 2, .. })
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "several owners")]
    fn test_move_item_panics_on_duplicate_owner_in_debug() {
        let mut board = board_with_lanes(&[("a", 1), ("b", 0)]);
        let dup = board.lanes[0].items[0].clone();
        board.lanes[1].items.push(dup.clone());
        let lane_a = board.lanes[0].id.clone();

        let _ = board.move_item(&dup.id, &lane_a, 0);
    }

    #[test]
    fn test_move_lane_counts_only_destination_group() {
        let mut board = Board::new("Test");
        let g1 = board.add_group("G1");
        let g2 = board.add_group("G2");
        let l1 = board.add_lane("l1", Some(g1.clone())).unwrap();
        let _l2 = board.add_lane("l2", Some(g1.clone())).unwrap();
        let _l3 = board.add_lane("l3", Some(g2.clone())).unwrap();

        board.move_lane(&l1, Some(&g2), 1).unwrap();

        let titles = |group: &GroupId| -> Vec<String> {
            board
                .lanes_in_group(Some(group))
                .iter()
                .map(|l| l.title.clone())
                .collect()
        };
        assert_eq!(titles(&g1), vec!["l2"]);
        assert_eq!(titles(&g2), vec!["l3", "l1"]);
    }

    #[test]
    fn test_move_lane_to_front_of_interleaved_group() {
        let mut board = Board::new("Test");
        let g1 = board.add_group("G1");
        let g2 = board.add_group("G2");
        board.add_lane("a", Some(g1.clone())).unwrap();
        board.add_lane("b", Some(g2.clone())).unwrap();
        board.add_lane("c", Some(g1.clone())).unwrap();
        let d = board.add_lane("d", None).unwrap();

        board.move_lane(&d, Some(&g1), 1).unwrap();

        let flat: Vec<&str> = board.lanes.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(flat, vec!["a", "b", "d", "c"]);
        assert_eq!(board.lanes[2].group_id.as_ref(), Some(&g1));
    }

    #[test]
    fn test_move_lane_to_ungrouped_clears_group() {
        let mut board = Board::new("Test");
        let g1 = board.add_group("G1");
        let l1 = board.add_lane("l1", Some(g1.clone())).unwrap();
        board.add_lane("free", None).unwrap();

        board.move_lane(&l1, None, 0).unwrap();

        assert_eq!(board.lanes[0].id, l1);
        assert!(board.lanes[0].group_id.is_none());
        assert!(board.lanes_in_group(Some(&g1)).is_empty());
    }

    #[test]
    fn test_move_lane_into_unknown_group_fails() {
        let mut board = board_with_lanes(&[("a", 0)]);
        let lane = board.lanes[0].id.clone();
        let before = board.clone();

        assert!(matches!(
            board.move_lane(&lane, Some(&GroupId::from("nope")), 0),
            Err(BoardError::GroupNotFound(_))
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_group_keeps_lane_membership() {
        let mut board = Board::new("Test");
        let g1 = board.add_group("G1");
        let g2 = board.add_group("G2");
        let g3 = board.add_group("G3");
        let lane = board.add_lane("l", Some(g1.clone())).unwrap();

        board.move_group(&g1, 10).unwrap();

        let order: Vec<&GroupId> = board.groups.iter().map(|g| &g.id).collect();
        assert_eq!(order, vec![&g2, &g3, &g1]);
        assert_eq!(board.lane(&lane).unwrap().group_id.as_ref(), Some(&g1));
    }

    #[test]
    fn test_remove_group_ungroups_lanes() {
        let mut board = Board::new("Test");
        let g1 = board.add_group("G1");
        board.add_lane("l1", Some(g1.clone())).unwrap();

        board.remove_group(&g1).unwrap();

        assert_eq!(board.lanes.len(), 1);
        assert!(board.lanes[0].group_id.is_none());
    }

    #[test]
    fn test_dangling_group_renders_ungrouped() {
        let mut board = Board::new("Test");
        let g1 = board.add_group("G1");
        let lane = board.add_lane("orphan", None).unwrap();
        board.lanes[0].group_id = Some(GroupId::from("deleted"));

        let buckets = board.grouped_lanes();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].group.map(|g| &g.id), Some(&g1));
        assert!(buckets[0].lanes.is_empty());
        assert!(buckets[1].group.is_none());
        assert_eq!(buckets[1].lanes[0].id, lane);
    }

    #[test]
    fn test_patch_item_through_board() {
        let mut board = board_with_lanes(&[("a", 1)]);
        let item = board.lanes[0].items[0].id.clone();

        let patched = board
            .patch_item(&item, &ItemPatch::status(ItemStatus::Done), Utc::now())
            .unwrap();
        assert_eq!(patched.status, ItemStatus::Done);
        assert_eq!(board.item(&item).unwrap().history.len(), 1);
    }

    #[test]
    fn test_link_dedupes_and_skips_self() {
        let mut board = Board::new("Parent");
        let child = BoardId::generate();
        board.link(child.clone());
        board.link(child.clone());
        board.link(board.id.clone());
        assert_eq!(board.links, vec![child]);
    }

    fn sorted_item_ids(board: &Board) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = board
            .lanes
            .iter()
            .flat_map(|l| l.items.iter().map(|i| i.id.clone()))
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    proptest! {
        #[test]
        fn prop_moves_keep_every_item_exactly_once(
            board in strategies::board(),
            moves in prop::collection::vec((any::<usize>(), any::<usize>(), 0usize..8), 0..24)
        ) {
            let mut board = board;
            let total = board.item_count();
            let before = sorted_item_ids(&board);

            for (pick, lane, index) in moves {
                if total == 0 {
                    break;
                }
                let item = board
                    .lanes
                    .iter()
                    .flat_map(|l| l.items.iter())
                    .nth(pick % total)
                    .unwrap()
                    .id
                    .clone();
                let lane = board.lanes[lane % board.lanes.len()].id.clone();

                let at = board.move_item(&item, &lane, index).unwrap();
                let landed = board.lane(&lane).unwrap();
                prop_assert_eq!(&landed.items[at].id, &item);
                prop_assert!(at <= index);
                prop_assert_eq!(board.item_count(), total);
            }

            prop_assert_eq!(sorted_item_ids(&board), before);
        }
    }
}
