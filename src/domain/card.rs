use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::{ColumnRole, KanbanError};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, KanbanError> {
    NaiveDateTime::parse_from_str(raw.trim(), DUE_DATE_FORMAT).map_err(|_| {
        KanbanError::Validation(format!(
            "Invalid due date '{}', expected yyyy-MM-dd HH:mm",
            raw
        ))
    })
}

/// A card payload submitted for creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i64,
    pub board_column_id: i64,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A card together with its derived block state and current column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardDetails {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocks_amount: i64,
    pub column_id: i64,
    pub column_name: String,
    pub column_role: ColumnRole,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlockEvent {
    pub id: i64,
    pub card_id: i64,
    pub block_reason: String,
    pub blocked_at: String,
    pub unblock_reason: Option<String>,
    pub unblocked_at: Option<String>,
}

impl BlockEvent {
    pub fn is_open(&self) -> bool {
        self.unblocked_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnPage {
    pub id: i64,
    pub name: String,
    pub role: ColumnRole,
    pub page: u32,
    pub total_pages: u32,
    pub total_cards: i64,
    pub cards: Vec<Card>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_defaults_to_medium_and_parses_any_case() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!("critical".parse::<Priority>(), Ok(Priority::Critical));
        assert_eq!("Low".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn due_date_uses_minute_precision_format() {
        let due = parse_due_date("2026-03-01 14:30").unwrap();
        assert_eq!(due.format(DUE_DATE_FORMAT).to_string(), "2026-03-01 14:30");
        assert!(matches!(
            parse_due_date("01/03/2026"),
            Err(KanbanError::Validation(_))
        ));
    }
}
