use crate::domain::{
    board::{Board, BoardId, Group, GroupId, Lane, LaneId},
    item::{Item, ItemId, ItemStatus},
};

fn item(id: &str, label: &str, status: ItemStatus) -> Item {
    let mut item = Item::with_id(ItemId::from(id), label);
    item.status = status;
    item
}

fn lane(id: &str, title: &str, group: Option<&str>, items: Vec<Item>) -> Lane {
    Lane {
        id: LaneId::from(id),
        title: title.to_string(),
        items,
        group_id: group.map(GroupId::from),
    }
}

/// The built-in dataset used when no snapshot can be loaded
pub fn seed_boards() -> Vec<Board> {
    vec![Board {
        id: BoardId::from("board-main"),
        title: "My Board".to_string(),
        groups: vec![
            Group {
                id: GroupId::from("group-work"),
                title: "Work".to_string(),
            },
            Group {
                id: GroupId::from("group-home"),
                title: "Home".to_string(),
            },
        ],
        lanes: vec![
            lane(
                "lane-sprint",
                "This sprint",
                Some("group-work"),
                vec![
                    item("item-review", "Review open pull requests", ItemStatus::Doing),
                    item("item-release", "Cut the release branch", ItemStatus::Todo),
                    item("item-retro", "Write retro notes", ItemStatus::Done),
                ],
            ),
            lane(
                "lane-chores",
                "Chores",
                Some("group-home"),
                vec![
                    item("item-plants", "Water the plants", ItemStatus::Todo),
                    item("item-bills", "Pay bills", ItemStatus::Todo),
                ],
            ),
            lane(
                "lane-someday",
                "Someday",
                None,
                vec![item("item-guitar", "Learn a song on guitar", ItemStatus::Todo)],
            ),
        ],
        links: Vec::new(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let boards = seed_boards();
        let ids: Vec<&str> = boards
            .iter()
            .flat_map(|b| b.lanes.iter())
            .flat_map(|l| l.items.iter())
            .map(|i| i.id.as_str())
            .collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_seed_lane_groups_exist() {
        for board in seed_boards() {
            for lane in &board.lanes {
                if let Some(group) = &lane.group_id {
                    assert!(board.has_group(group));
                }
            }
        }
    }
}
