//! Shareable encoded form of a board collection.
//!
//! A token is the JSON form of the boards in URL-safe base64. Decoding runs
//! the result through [`normalize`], so tokens written by older versions
//! still load, and fields holding malformed values read as absent.

use crate::{
    domain::{normalize, parse_raw_boards, seed_boards, Board},
    error::{BoardError, Result},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotToken(String);

impl SnapshotToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SnapshotToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SnapshotToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SnapshotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encodes the full board collection
pub fn serialize(boards: &[Board]) -> Result<SnapshotToken> {
    let json = serde_json::to_vec(boards)?;
    Ok(SnapshotToken(URL_SAFE_NO_PAD.encode(json)))
}

/// Decodes a token, reporting why it could not be read
pub fn try_deserialize(token: &SnapshotToken) -> Result<Vec<Board>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.as_str().trim())
        .map_err(|e| BoardError::InvalidSnapshot(e.to_string()))?;
    let raw = parse_raw_boards(&bytes)?;
    Ok(normalize(&raw))
}

/// Decodes a token, or `None` if it is corrupt or foreign
pub fn deserialize(token: &SnapshotToken) -> Option<Vec<Board>> {
    match try_deserialize(token) {
        Ok(boards) => Some(boards),
        Err(e) => {
            warn!(error = %e, "discarding unreadable snapshot");
            None
        }
    }
}

/// Boards from `token`, falling back to the seed dataset when there is no
/// usable token
pub fn load_or_seed(token: Option<&SnapshotToken>) -> Vec<Board> {
    token
        .and_then(deserialize)
        .filter(|boards| !boards.is_empty())
        .unwrap_or_else(seed_boards)
}
