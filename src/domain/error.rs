use crate::domain::ColumnRole;

/// Reasons a lifecycle operation is refused for the card's current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalState {
    #[error("Card {card_id} is blocked. Please unblock it before moving.")]
    CardBlocked { card_id: i64 },

    #[error("Card {card_id} is already blocked")]
    AlreadyBlocked { card_id: i64 },

    #[error("Card {card_id} is not blocked")]
    NotBlocked { card_id: i64 },

    #[error("Card {card_id} has already been finished")]
    AlreadyFinished { card_id: i64 },

    #[error("Card {card_id} is cancelled")]
    Cancelled { card_id: i64 },

    #[error("Card {card_id} belongs to another board")]
    ForeignBoard { card_id: i64 },

    #[error("Card {card_id} is in a column of type {role} and cannot be blocked")]
    TerminalColumn { card_id: i64, role: ColumnRole },

    #[error("Column {column_id} is not the board's cancel column")]
    NotCancelColumn { column_id: i64 },
}

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    IllegalState(#[from] IllegalState),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KanbanError {
    pub fn illegal_state(&self) -> Option<&IllegalState> {
        match self {
            KanbanError::IllegalState(state) => Some(state),
            _ => None,
        }
    }

    /// Only storage failures may succeed on a plain retry; everything else
    /// needs the caller to change its input or re-query state first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KanbanError::Database(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            KanbanError::Validation(_) => 2,
            KanbanError::NotFound(_) => 3,
            KanbanError::IllegalState(_) => 4,
            KanbanError::Unsupported(_) => 5,
            KanbanError::Database(_) | KanbanError::Migration(_) => 10,
            KanbanError::Internal(_) | KanbanError::Serialization(_) => 1,
        }
    }
}
