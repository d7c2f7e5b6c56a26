//! Discrete start/over/drop reordering of lanes and groups.

use crate::{
    domain::{Board, GroupId, LaneId},
    error::Result,
};
use tracing::debug;

/// What a container drag is carrying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerDrag {
    Lane {
        lane_id: LaneId,
        /// Group the lane was displayed under when the drag began
        origin_group: Option<GroupId>,
    },
    Group { group_id: GroupId },
}

/// Where a container can be dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropZone {
    /// Slot `index` among the lanes of `group_id` (`None` for ungrouped)
    Lane {
        group_id: Option<GroupId>,
        index: usize,
    },
    /// Slot `index` in the board's group order
    Group { index: usize },
}

impl ContainerDrag {
    /// Starts dragging a lane, remembering the group it is displayed under
    pub fn lane(board: &Board, lane_id: &LaneId) -> Option<Self> {
        let lane = board.lane(lane_id)?;
        Some(Self::Lane {
            lane_id: lane_id.clone(),
            origin_group: board.effective_group(lane).cloned(),
        })
    }

    pub fn group(board: &Board, group_id: &GroupId) -> Option<Self> {
        board.has_group(group_id).then(|| Self::Group {
            group_id: group_id.clone(),
        })
    }

    /// Whether `zone` takes this kind of container
    pub fn accepts(&self, zone: &DropZone) -> bool {
        matches!(
            (self, zone),
            (Self::Lane { .. }, DropZone::Lane { .. })
                | (Self::Group { .. }, DropZone::Group { .. })
        )
    }

    /// Performs the move if `zone` accepts this container. Returns `false`
    /// when the zone ignores it.
    pub fn drop_onto(&self, board: &mut Board, zone: &DropZone) -> Result<bool> {
        match (self, zone) {
            (
                Self::Lane {
                    lane_id,
                    origin_group,
                },
                DropZone::Lane { group_id, index },
            ) => {
                board.move_lane(lane_id, group_id.as_ref(), *index)?;
                debug!(
                    lane = %lane_id,
                    from = ?origin_group,
                    to = ?group_id,
                    index,
                    "lane moved"
                );
                Ok(true)
            }
            (Self::Group { group_id }, DropZone::Group { index }) => {
                board.move_group(group_id, *index)?;
                debug!(group = %group_id, index, "group moved");
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
