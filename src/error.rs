use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Lane not found: {0}")]
    LaneNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item {item} is owned by {lanes} lanes")]
    InvariantViolation { item: String, lanes: usize },

    #[error("Another drag gesture is already in progress")]
    DragInProgress,

    #[error("Invalid snapshot token: {0}")]
    InvalidSnapshot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
