//! The board editor: owns the boards, the one in-flight drag and the
//! published snapshot.
//!
//! Input handlers run to completion one at a time. Every committed change
//! goes through [`BoardEditor::move_item`], [`BoardEditor::move_lane`],
//! [`BoardEditor::move_group`] or one of the editing commands, and each
//! commit republishes the snapshot token.

use crate::{
    config::EditorConfig,
    domain::{Board, BoardId, GroupId, Item, ItemId, ItemPatch, ItemStatus, LaneId},
    drag::{
        AlwaysListening, ContainerDrag, DragState, DropZone, GapKey, GapRegistry, GestureOutcome,
        Ghost, ItemGesture, Point, PointerSource, PointerSubscription, Rect,
    },
    error::{BoardError, Result},
    snapshot::{self, SnapshotToken},
};
use chrono::Utc;
use std::{mem, rc::Rc};
use tracing::{debug, trace, warn};

/// Something the host should do in response to an input event
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    /// Scroll the board viewport vertically by this many pixels
    ScrollBy(f64),
    /// Show the detail view for this item
    OpenItem(ItemId),
}

pub struct BoardEditor {
    boards: Vec<Board>,
    active: usize,
    config: EditorConfig,
    drag: DragState,
    gaps: GapRegistry,
    pointer_source: Rc<dyn PointerSource>,
    viewport_height: f64,
    selected: Option<ItemId>,
    suppress_click: bool,
    snapshot: Option<SnapshotToken>,
    revision: u64,
}

impl BoardEditor {
    /// Creates an editor over already-normalized boards. An empty collection
    /// is replaced by the seed dataset.
    pub fn new(boards: Vec<Board>, config: EditorConfig) -> Self {
        let boards = if boards.is_empty() {
            crate::domain::seed_boards()
        } else {
            boards
        };
        let mut editor = Self {
            boards,
            active: 0,
            config,
            drag: DragState::Idle,
            gaps: GapRegistry::new(),
            pointer_source: Rc::new(AlwaysListening),
            viewport_height: 0.0,
            selected: None,
            suppress_click: false,
            snapshot: None,
            revision: 0,
        };
        editor.publish();
        editor
    }

    /// Creates an editor from a shared snapshot, falling back to the seed
    /// dataset when the token is missing or unreadable
    pub fn from_snapshot(token: Option<&SnapshotToken>, config: EditorConfig) -> Self {
        Self::new(snapshot::load_or_seed(token), config)
    }

    /// Uses `source` to attach pointer listeners for each item gesture
    pub fn with_pointer_source(mut self, source: Rc<dyn PointerSource>) -> Self {
        self.pointer_source = source;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn active_board(&self) -> &Board {
        &self.boards[self.active]
    }

    fn board_index(&self, board_id: &BoardId) -> Result<usize> {
        self.boards
            .iter()
            .position(|b| &b.id == board_id)
            .ok_or_else(|| BoardError::BoardNotFound(board_id.to_string()))
    }

    /// Latest published snapshot token
    pub fn snapshot_token(&self) -> Option<&SnapshotToken> {
        self.snapshot.as_ref()
    }

    /// Number of commits since the editor was created
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn publish(&mut self) {
        match snapshot::serialize(&self.boards) {
            Ok(token) => self.snapshot = Some(token),
            Err(e) => warn!(error = %e, "snapshot not republished"),
        }
    }

    fn commit(&mut self) {
        self.revision += 1;
        self.publish();
    }

    /// Runs an all-or-nothing edit on the active board and commits it
    fn edit<T>(&mut self, f: impl FnOnce(&mut Board) -> Result<T>) -> Result<T> {
        let out = f(&mut self.boards[self.active])?;
        self.commit();
        Ok(out)
    }

    // Boards

    pub fn switch_board(&mut self, board_id: &BoardId) -> Result<()> {
        if !self.drag.is_idle() {
            return Err(BoardError::DragInProgress);
        }
        self.active = self.board_index(board_id)?;
        self.selected = None;
        self.gaps.clear();
        debug!(board = %board_id, "switched board");
        Ok(())
    }

    /// Creates a board, linked both ways to `parent` when given
    pub fn create_board(
        &mut self,
        title: impl Into<String>,
        parent: Option<&BoardId>,
    ) -> Result<BoardId> {
        let parent_index = parent.map(|p| self.board_index(p)).transpose()?;
        let mut board = Board::new(title);
        let id = board.id.clone();
        if let Some(index) = parent_index {
            board.link(self.boards[index].id.clone());
            self.boards[index].link(id.clone());
        }
        self.boards.push(board);
        self.commit();
        debug!(board = %id, "board created");
        Ok(id)
    }

    pub fn rename_board(&mut self, board_id: &BoardId, title: impl Into<String>) -> Result<()> {
        let index = self.board_index(board_id)?;
        self.boards[index].set_title(title);
        self.commit();
        Ok(())
    }

    pub fn link_boards(&mut self, a: &BoardId, b: &BoardId) -> Result<()> {
        let ia = self.board_index(a)?;
        let ib = self.board_index(b)?;
        self.boards[ia].link(b.clone());
        self.boards[ib].link(a.clone());
        self.commit();
        Ok(())
    }

    // Groups, lanes and items on the active board

    pub fn add_group(&mut self, title: impl Into<String>) -> Result<GroupId> {
        self.edit(|board| Ok(board.add_group(title)))
    }

    pub fn rename_group(&mut self, group_id: &GroupId, title: impl Into<String>) -> Result<()> {
        self.edit(|board| board.rename_group(group_id, title))
    }

    /// Removes a group; its lanes become ungrouped
    pub fn remove_group(&mut self, group_id: &GroupId) -> Result<()> {
        self.edit(|board| board.remove_group(group_id).map(|_| ()))
    }

    pub fn add_lane(
        &mut self,
        title: impl Into<String>,
        group_id: Option<GroupId>,
    ) -> Result<LaneId> {
        self.edit(|board| board.add_lane(title, group_id))
    }

    pub fn rename_lane(&mut self, lane_id: &LaneId, title: impl Into<String>) -> Result<()> {
        self.edit(|board| board.rename_lane(lane_id, title))
    }

    pub fn add_item(&mut self, lane_id: &LaneId, label: impl Into<String>) -> Result<ItemId> {
        self.edit(|board| board.add_item(lane_id, label))
    }

    pub fn rename_item(&mut self, item_id: &ItemId, label: impl Into<String>) -> Result<()> {
        self.edit(|board| board.rename_item(item_id, label))
    }

    // Moves

    pub fn move_item(&mut self, item_id: &ItemId, to_lane: &LaneId, index: usize) -> Result<usize> {
        let at = self.edit(|board| board.move_item(item_id, to_lane, index))?;
        debug!(item = %item_id, lane = %to_lane, index = at, "item moved");
        Ok(at)
    }

    pub fn move_lane(
        &mut self,
        lane_id: &LaneId,
        to_group: Option<&GroupId>,
        index: usize,
    ) -> Result<()> {
        self.edit(|board| board.move_lane(lane_id, to_group, index))?;
        debug!(lane = %lane_id, group = ?to_group, index, "lane moved");
        Ok(())
    }

    pub fn move_group(&mut self, group_id: &GroupId, index: usize) -> Result<()> {
        self.edit(|board| board.move_group(group_id, index))?;
        debug!(group = %group_id, index, "group moved");
        Ok(())
    }

    // Status and detail view

    /// Selects the item shown in the detail view
    pub fn select_item(&mut self, item_id: Option<ItemId>) -> Result<()> {
        if let Some(id) = &item_id {
            if self.active_board().item(id).is_none() {
                return Err(BoardError::ItemNotFound(id.to_string()));
            }
        }
        self.selected = item_id;
        Ok(())
    }

    /// The detail view's item, read straight from the model so it always
    /// reflects the last committed patch
    pub fn selected_item(&self) -> Option<&Item> {
        self.selected
            .as_ref()
            .and_then(|id| self.active_board().item(id))
    }

    /// Applies a patch from the detail view to the selected item
    pub fn on_update(&mut self, patch: &ItemPatch) -> Result<Option<&Item>> {
        let Some(item_id) = self.selected.clone() else {
            return Ok(None);
        };
        self.update_item(&item_id, patch)?;
        Ok(self.selected_item())
    }

    /// Applies a patch to any item on the active board
    pub fn update_item(&mut self, item_id: &ItemId, patch: &ItemPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        self.edit(|board| board.patch_item(item_id, patch, now).map(|_| ()))?;
        debug!(
            item = %item_id,
            status = ?patch.status,
            notes = patch.notes.is_some(),
            "item patched"
        );
        Ok(())
    }

    /// Advances an item to its next status (todo, doing, done, todo)
    pub fn cycle_status(&mut self, item_id: &ItemId) -> Result<ItemStatus> {
        let next = self
            .active_board()
            .item(item_id)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.to_string()))?
            .status
            .next();
        self.update_item(item_id, &ItemPatch::status(next))?;
        Ok(next)
    }

    // Layout

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    /// Re-measures every gap of the active board
    pub fn measure_gaps<F>(&mut self, measure: F)
    where
        F: FnMut(&GapKey) -> Option<Rect>,
    {
        self.gaps.rebuild(&self.boards[self.active], measure);
    }

    pub fn gaps_mut(&mut self) -> &mut GapRegistry {
        &mut self.gaps
    }

    // Render projection

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// The gap an item would land in if released now
    pub fn hot_gap(&self) -> Option<&GapKey> {
        match &self.drag {
            DragState::Item(gesture) => gesture.hot_gap(),
            _ => None,
        }
    }

    pub fn ghost(&self) -> Option<Ghost> {
        match &self.drag {
            DragState::Item(gesture) => gesture.ghost(),
            _ => None,
        }
    }

    // Item gestures

    /// Pointer pressed on an item's grab handle
    pub fn on_pointer_down(&mut self, item_id: &ItemId, at: Point) -> Result<Vec<Action>> {
        if !self.drag.is_idle() {
            return Err(BoardError::DragInProgress);
        }
        let (lane, _) = self
            .active_board()
            .find_item(item_id)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.to_string()))?;
        let origin_lane = lane.id.clone();

        // A previous drag whose click never arrived must not eat this one
        self.suppress_click = false;
        let listeners = PointerSubscription::acquire(Rc::clone(&self.pointer_source));
        let gesture = ItemGesture::arm(item_id.clone(), origin_lane, at, listeners);
        self.drag = DragState::Item(gesture);
        Ok(Vec::new())
    }

    pub fn on_pointer_move(&mut self, at: Point) -> Vec<Action> {
        let DragState::Item(gesture) = &mut self.drag else {
            return Vec::new();
        };
        let scroll = gesture.track(at, &self.gaps, &self.config, self.viewport_height);
        if !gesture.is_dragging() {
            return Vec::new();
        }

        let mut actions = vec![Action::RenderNeeded];
        if let Some(dy) = scroll {
            actions.push(Action::ScrollBy(dy));
        }
        actions
    }

    pub fn on_pointer_up(&mut self, at: Point) -> Vec<Action> {
        let mut gesture = match mem::take(&mut self.drag) {
            DragState::Item(gesture) => gesture,
            other => {
                self.drag = other;
                return Vec::new();
            }
        };
        gesture.track(at, &self.gaps, &self.config, self.viewport_height);
        let origin_lane = gesture.origin_lane().clone();

        match gesture.finish() {
            GestureOutcome::Click(item_id) => {
                self.selected = Some(item_id.clone());
                vec![Action::OpenItem(item_id), Action::RenderNeeded]
            }
            GestureOutcome::Drop { item_id, target } => {
                self.suppress_click = true;
                let index = self.landing_index(&item_id, &origin_lane, &target);
                debug!(
                    item = %item_id,
                    from = %origin_lane,
                    to = %target.lane_id,
                    gap = target.index,
                    "item dropped"
                );
                if let Err(e) = self.move_item(&item_id, &target.lane_id, index) {
                    warn!(item = %item_id, error = %e, "item drop discarded");
                }
                vec![Action::RenderNeeded]
            }
            GestureOutcome::Cancelled(item_id) => {
                self.suppress_click = true;
                trace!(item = %item_id, "item released with no target");
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Gaps are measured with the dragged item still in place, so a gap
    /// after it in its own lane sits one slot lower once it is removed
    fn landing_index(&self, item_id: &ItemId, origin_lane: &LaneId, target: &GapKey) -> usize {
        if *origin_lane != target.lane_id {
            return target.index;
        }
        match self.active_board().lane(&target.lane_id) {
            Some(lane) => match lane.position_of(item_id) {
                Some(pos) if pos < target.index => target.index - 1,
                _ => target.index,
            },
            None => target.index,
        }
    }

    /// Click on an item. Swallowed once right after a drag.
    pub fn on_item_click(&mut self, item_id: &ItemId) -> Vec<Action> {
        if mem::take(&mut self.suppress_click) {
            return Vec::new();
        }
        if self.active_board().item(item_id).is_none() {
            return Vec::new();
        }
        self.selected = Some(item_id.clone());
        vec![Action::OpenItem(item_id.clone())]
    }

    // Container gestures

    pub fn on_drag_start(&mut self, drag: ContainerDrag) -> Result<()> {
        if !self.drag.is_idle() {
            return Err(BoardError::DragInProgress);
        }
        trace!(?drag, "container drag started");
        self.drag = DragState::Container(drag);
        Ok(())
    }

    pub fn start_lane_drag(&mut self, lane_id: &LaneId) -> Result<()> {
        let drag = ContainerDrag::lane(self.active_board(), lane_id)
            .ok_or_else(|| BoardError::LaneNotFound(lane_id.to_string()))?;
        self.on_drag_start(drag)
    }

    pub fn start_group_drag(&mut self, group_id: &GroupId) -> Result<()> {
        let drag = ContainerDrag::group(self.active_board(), group_id)
            .ok_or_else(|| BoardError::GroupNotFound(group_id.to_string()))?;
        self.on_drag_start(drag)
    }

    /// Whether `zone` accepts the current drag, i.e. whether the platform's
    /// default dragover handling should be suppressed
    pub fn on_drag_over(&self, zone: &DropZone) -> bool {
        match &self.drag {
            DragState::Container(drag) => drag.accepts(zone),
            _ => false,
        }
    }

    /// Drop on a zone. The descriptor is cleared whether or not the zone
    /// takes it. Returns whether anything moved.
    pub fn on_drop(&mut self, zone: &DropZone) -> Result<bool> {
        let drag = match mem::take(&mut self.drag) {
            DragState::Container(drag) => drag,
            other => {
                self.drag = other;
                return Ok(false);
            }
        };
        let moved = drag.drop_onto(&mut self.boards[self.active], zone)?;
        if moved {
            self.commit();
        }
        Ok(moved)
    }

    /// The platform ended the drag, with or without a drop
    pub fn on_drag_end(&mut self) {
        if matches!(self.drag, DragState::Container(_)) {
            self.drag = DragState::Idle;
        }
    }
}
