use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Comment recorded on the status row when a patch also carries notes
pub const NOTES_UPDATED_MARKER: &str = "notes updated";

/// Unique identifier for an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh, globally unique id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tri-state status of an item
///
/// There is no transition graph: every status is reachable from every other
/// so that users can correct mistakes by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::Doing => write!(f, "doing"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => Err(format!(
                "Invalid status '{}'. Valid statuses: todo, doing, done",
                s
            )),
        }
    }
}

impl ItemStatus {
    /// The status a one-tap toggle advances to
    pub fn next(self) -> Self {
        match self {
            Self::Todo => Self::Doing,
            Self::Doing => Self::Done,
            Self::Done => Self::Todo,
        }
    }
}

/// One row of an item's audit trail. Never modified after being appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ts: DateTime<Utc>,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A partial edit coming from the detail view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            notes: None,
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            status: None,
            notes: Some(notes.into()),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none()
    }
}

/// A leaf card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub label: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub history: Vec<HistoryEntry>,
}

impl Item {
    /// Creates a new todo item with a freshly generated id
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(ItemId::generate(), label)
    }

    pub fn with_id(id: ItemId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            status: ItemStatus::Todo,
            completed_at: None,
            notes: String::new(),
            history: Vec::new(),
        }
    }

    /// Sets the label
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Computes the item that results from applying `patch` at `now`.
    ///
    /// A status change and a notes change each append their own history
    /// row, so a patch carrying both yields two rows. Reaching `done` stamps
    /// `completed_at`; other statuses leave it as it was.
    pub fn apply_patch(&self, patch: &ItemPatch, now: DateTime<Utc>) -> Item {
        let mut next = self.clone();

        if let Some(status) = patch.status {
            next.history.push(HistoryEntry {
                ts: now,
                status,
                comment: patch
                    .notes
                    .as_ref()
                    .map(|_| NOTES_UPDATED_MARKER.to_string()),
            });
            next.status = status;
            if status == ItemStatus::Done {
                next.completed_at = Some(now);
            }
        }

        if let Some(notes) = &patch.notes {
            next.history.push(HistoryEntry {
                ts: now,
                status: patch.status.unwrap_or(self.status),
                comment: Some(notes.clone()),
            });
            next.notes = notes.clone();
        }

        next
    }
}
