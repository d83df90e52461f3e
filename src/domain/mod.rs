pub mod card;
pub mod column;
pub mod error;
pub mod validation;

pub use card::{BlockEvent, Card, CardDetails, ColumnPage, NewCard, Priority};
pub use column::{
    Board, BoardColumn, BoardDetails, BoardRecord, ColumnInfo, ColumnLayout, ColumnRole,
    ColumnSummary,
};
pub use error::{IllegalState, KanbanError};
