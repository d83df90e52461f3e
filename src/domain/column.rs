use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::KanbanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnRole {
    Initial,
    Pending,
    Final,
    Cancel,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Initial => "INITIAL",
            ColumnRole::Pending => "PENDING",
            ColumnRole::Final => "FINAL",
            ColumnRole::Cancel => "CANCEL",
        }
    }

    pub fn all() -> &'static [ColumnRole] {
        &[
            ColumnRole::Initial,
            ColumnRole::Pending,
            ColumnRole::Final,
            ColumnRole::Cancel,
        ]
    }

    /// FINAL and CANCEL: no forward movement and no blocking.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ColumnRole::Final | ColumnRole::Cancel)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(ColumnRole::Initial),
            "PENDING" => Ok(ColumnRole::Pending),
            "FINAL" => Ok(ColumnRole::Final),
            "CANCEL" => Ok(ColumnRole::Cancel),
            _ => Err(format!("Invalid column role: {}", s)),
        }
    }
}

/// A column as stored in `board_columns`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardColumn {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub position: i64,
    pub kind: String,
    pub created_at: String,
    pub updated_at: String,
}

impl BoardColumn {
    pub fn role(&self) -> Result<ColumnRole, KanbanError> {
        self.kind
            .parse()
            .map_err(|e: String| KanbanError::Internal(format!("Invalid column kind in DB: {}", e)))
    }

    pub fn info(&self) -> Result<ColumnInfo, KanbanError> {
        Ok(ColumnInfo {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            role: self.role()?,
        })
    }
}

/// The slice of a column the lifecycle rules care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub id: i64,
    pub name: String,
    pub position: i64,
    pub role: ColumnRole,
}

impl ColumnInfo {
    pub fn new(id: i64, name: impl Into<String>, position: i64, role: ColumnRole) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            role,
        }
    }
}

/// A board's columns, validated to form a well-shaped workflow.
///
/// Positions run contiguously from 0: INITIAL first, any number of PENDING
/// columns, then FINAL, then CANCEL last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    columns: Vec<ColumnInfo>,
}

impl ColumnLayout {
    pub fn new(mut columns: Vec<ColumnInfo>) -> Result<Self, KanbanError> {
        if columns.len() < 3 {
            return Err(KanbanError::Validation(format!(
                "A board needs at least 3 columns, got {}",
                columns.len()
            )));
        }

        let mut ids = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !ids.insert(c.id)) {
            return Err(KanbanError::Validation(format!(
                "Column id {} appears more than once",
                dup.id
            )));
        }

        columns.sort_by_key(|c| c.position);
        let last = columns.len() - 1;

        for (index, column) in columns.iter().enumerate() {
            if column.position != index as i64 {
                return Err(KanbanError::Validation(format!(
                    "Column positions must be contiguous from 0; expected {} but found {} ({})",
                    index, column.position, column.name
                )));
            }

            let expected = match index {
                0 => ColumnRole::Initial,
                i if i == last => ColumnRole::Cancel,
                i if i == last - 1 => ColumnRole::Final,
                _ => ColumnRole::Pending,
            };
            if column.role != expected {
                return Err(KanbanError::Validation(format!(
                    "Column at position {} must be {} but is {}",
                    index, expected, column.role
                )));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn find(&self, column_id: i64) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// The column whose position is exactly one past `current`.
    pub fn successor(&self, current: &ColumnInfo) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.position == current.position + 1)
    }

    pub fn initial(&self) -> &ColumnInfo {
        &self.columns[0]
    }

    pub fn final_column(&self) -> &ColumnInfo {
        &self.columns[self.columns.len() - 2]
    }

    pub fn cancel(&self) -> &ColumnInfo {
        &self.columns[self.columns.len() - 1]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardRecord {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A board with its validated column topology.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub layout: ColumnLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub id: i64,
    pub name: String,
    pub role: ColumnRole,
    pub position: i64,
    pub cards_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardDetails {
    pub id: i64,
    pub name: String,
    pub columns: Vec<ColumnSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_layout() -> ColumnLayout {
        ColumnLayout::new(vec![
            ColumnInfo::new(10, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(11, "doing", 1, ColumnRole::Pending),
            ColumnInfo::new(12, "done", 2, ColumnRole::Final),
            ColumnInfo::new(13, "dropped", 3, ColumnRole::Cancel),
        ])
        .expect("layout should be valid")
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in ColumnRole::all() {
            assert_eq!(role.as_str().parse::<ColumnRole>(), Ok(*role));
        }
        assert!("done".parse::<ColumnRole>().is_err());
    }

    #[test]
    fn successor_is_strictly_the_next_position() {
        let layout = standard_layout();
        let initial = layout.initial().clone();
        assert_eq!(layout.successor(&initial).map(|c| c.id), Some(11));
        let pending = layout.find(11).cloned().unwrap();
        assert_eq!(layout.successor(&pending).map(|c| c.id), Some(12));
        assert_eq!(layout.successor(layout.cancel()), None);
    }

    #[test]
    fn layout_accepts_unsorted_input() {
        let layout = ColumnLayout::new(vec![
            ColumnInfo::new(3, "dropped", 2, ColumnRole::Cancel),
            ColumnInfo::new(1, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(2, "done", 1, ColumnRole::Final),
        ])
        .unwrap();
        assert_eq!(layout.initial().id, 1);
        assert_eq!(layout.final_column().id, 2);
        assert_eq!(layout.cancel().id, 3);
    }

    #[test]
    fn layout_rejects_position_gaps() {
        let err = ColumnLayout::new(vec![
            ColumnInfo::new(1, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(2, "done", 2, ColumnRole::Final),
            ColumnInfo::new(3, "dropped", 3, ColumnRole::Cancel),
        ])
        .unwrap_err();
        assert!(matches!(err, KanbanError::Validation(_)));
    }

    #[test]
    fn layout_rejects_misplaced_roles() {
        let err = ColumnLayout::new(vec![
            ColumnInfo::new(1, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(2, "dropped", 1, ColumnRole::Cancel),
            ColumnInfo::new(3, "done", 2, ColumnRole::Final),
        ])
        .unwrap_err();
        assert!(matches!(err, KanbanError::Validation(_)));

        let err = ColumnLayout::new(vec![
            ColumnInfo::new(1, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(2, "also todo", 1, ColumnRole::Initial),
            ColumnInfo::new(3, "done", 2, ColumnRole::Final),
            ColumnInfo::new(4, "dropped", 3, ColumnRole::Cancel),
        ])
        .unwrap_err();
        assert!(matches!(err, KanbanError::Validation(_)));
    }

    #[test]
    fn layout_rejects_duplicate_ids_and_short_boards() {
        let err = ColumnLayout::new(vec![
            ColumnInfo::new(1, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(1, "done", 1, ColumnRole::Final),
            ColumnInfo::new(3, "dropped", 2, ColumnRole::Cancel),
        ])
        .unwrap_err();
        assert!(matches!(err, KanbanError::Validation(_)));

        let err = ColumnLayout::new(vec![
            ColumnInfo::new(1, "todo", 0, ColumnRole::Initial),
            ColumnInfo::new(2, "done", 1, ColumnRole::Final),
        ])
        .unwrap_err();
        assert!(matches!(err, KanbanError::Validation(_)));
    }
}
