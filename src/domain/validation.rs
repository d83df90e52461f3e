//! Precondition checks run before any storage call.

use crate::domain::{KanbanError, NewCard};

pub const MAX_TEXT_LEN: usize = 255;

pub fn validate_text(field: &str, value: &str) -> Result<(), KanbanError> {
    if value.trim().is_empty() {
        return Err(KanbanError::Validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(KanbanError::Validation(format!(
            "{} cannot exceed {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(())
}

pub fn validate_id(id: i64) -> Result<(), KanbanError> {
    if id <= 0 {
        return Err(KanbanError::Validation(format!("Invalid ID provided: {}", id)));
    }
    Ok(())
}

pub fn validate_card(card: &NewCard) -> Result<(), KanbanError> {
    validate_text("Card title", &card.title)?;
    validate_text("Card description", &card.description)?;
    Ok(())
}
