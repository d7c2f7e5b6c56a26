//! Loading boards from loosely-shaped data.
//!
//! Snapshots may come from older versions or other sources, so every field
//! is optional here.
//! [`normalize`] turns them into fully-populated [`Board`]s.

use crate::domain::{
    board::{Board, BoardId, Group, GroupId, Lane, LaneId},
    item::{HistoryEntry, Item, ItemId, ItemStatus},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const UNTITLED: &str = "Untitled";

/// Field deserializers that turn malformed values into absent ones instead
/// of rejecting the whole document
mod lenient {
    use crate::domain::item::ItemStatus;
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(T::deserialize(value).ok())
    }

    /// Non-arrays become `None`; elements that do not parse are dropped
    pub fn vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(values) => Ok(Some(
                values
                    .into_iter()
                    .filter_map(|v| T::deserialize(v).ok())
                    .collect(),
            )),
            _ => Ok(None),
        }
    }

    /// Case-insensitive status name
    pub fn status<'de, D>(deserializer: D) -> Result<Option<ItemStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s.parse().ok()),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHistoryEntry {
    #[serde(deserialize_with = "lenient::option")]
    pub ts: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::status")]
    pub status: Option<ItemStatus>,
    #[serde(deserialize_with = "lenient::option")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient::status")]
    pub status: Option<ItemStatus>,
    #[serde(deserialize_with = "lenient::option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::option")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "lenient::vec")]
    pub history: Option<Vec<RawHistoryEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLane {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::vec")]
    pub items: Option<Vec<RawItem>>,
    #[serde(deserialize_with = "lenient::option")]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGroup {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBoard {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::vec")]
    pub lanes: Option<Vec<RawLane>>,
    #[serde(deserialize_with = "lenient::vec")]
    pub groups: Option<Vec<RawGroup>>,
    #[serde(deserialize_with = "lenient::vec")]
    pub links: Option<Vec<String>>,
}

/// Parses a JSON array of boards. Entries that are not objects are skipped
/// and malformed fields read as absent, so only a document that is not a
/// JSON array at all is rejected.
pub fn parse_raw_boards(json: &[u8]) -> serde_json::Result<Vec<RawBoard>> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(json)?;
    Ok(values
        .into_iter()
        .filter_map(|v| RawBoard::deserialize(v).ok())
        .collect())
}

/// Builds fully-populated boards from raw input.
///
/// Never fails: absent collections become empty, absent ids are generated,
/// absent titles and statuses take defaults. The input is left untouched.
/// Lane group references are kept as-is even when they dangle; display code
/// treats such lanes as ungrouped.
pub fn normalize(boards: &[RawBoard]) -> Vec<Board> {
    boards.iter().map(normalize_board).collect()
}

fn normalize_board(raw: &RawBoard) -> Board {
    Board {
        id: raw
            .id
            .clone()
            .map(BoardId::from)
            .unwrap_or_else(BoardId::generate),
        title: raw.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
        lanes: raw
            .lanes
            .iter()
            .flatten()
            .map(normalize_lane)
            .collect(),
        groups: raw
            .groups
            .iter()
            .flatten()
            .map(|g| Group {
                id: g
                    .id
                    .clone()
                    .map(GroupId::from)
                    .unwrap_or_else(GroupId::generate),
                title: g.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            })
            .collect(),
        links: raw
            .links
            .iter()
            .flatten()
            .cloned()
            .map(BoardId::from)
            .collect(),
    }
}

fn normalize_lane(raw: &RawLane) -> Lane {
    Lane {
        id: raw
            .id
            .clone()
            .map(LaneId::from)
            .unwrap_or_else(LaneId::generate),
        title: raw.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
        items: raw.items.iter().flatten().map(normalize_item).collect(),
        group_id: raw.group_id.clone().map(GroupId::from),
    }
}

fn normalize_item(raw: &RawItem) -> Item {
    let status = raw.status.unwrap_or_default();
    Item {
        id: raw
            .id
            .clone()
            .map(ItemId::from)
            .unwrap_or_else(ItemId::generate),
        label: raw.label.clone().unwrap_or_default(),
        status,
        completed_at: raw.completed_at,
        notes: raw.notes.clone().unwrap_or_default(),
        history: raw
            .history
            .iter()
            .flatten()
            .map(|entry| HistoryEntry {
                // Undated rows sort as the oldest possible entry
                ts: entry.ts.unwrap_or(DateTime::<Utc>::default()),
                status: entry.status.unwrap_or(status),
                comment: entry.comment.clone(),
            })
            .collect(),
    }
}
