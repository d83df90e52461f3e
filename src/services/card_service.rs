use sqlx::SqlitePool;

use crate::domain::validation::validate_id;
use crate::domain::{BlockEvent, CardDetails, ColumnPage, KanbanError};
use crate::infrastructure::queries;

/// Read-side card queries. State changes go through
/// [`LifecycleEngine`](crate::services::LifecycleEngine).
pub struct CardService;

impl CardService {
    pub async fn details(pool: &SqlitePool, id: i64) -> Result<Option<CardDetails>, KanbanError> {
        validate_id(id)?;
        let mut conn = pool.acquire().await?;
        queries::find_card_details(&mut conn, id).await
    }

    pub async fn block_history(
        pool: &SqlitePool,
        card_id: i64,
    ) -> Result<Vec<BlockEvent>, KanbanError> {
        validate_id(card_id)?;
        let mut conn = pool.acquire().await?;
        queries::blocks_for_card(&mut conn, card_id).await
    }

    /// One page (1-based) of the cards currently in a column.
    pub async fn column_cards(
        pool: &SqlitePool,
        column_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Option<ColumnPage>, KanbanError> {
        validate_id(column_id)?;
        if page == 0 || page_size == 0 {
            return Err(KanbanError::Validation(
                "Page and page size must be at least 1".into(),
            ));
        }

        let mut conn = pool.acquire().await?;
        let Some(column) = queries::find_column(&mut conn, column_id).await? else {
            return Ok(None);
        };

        let total_cards = queries::count_cards_in_column(&mut conn, column_id).await?;
        let size = i64::from(page_size);
        let total_pages = ((total_cards + size - 1) / size).max(1) as u32;
        if page > total_pages {
            return Err(KanbanError::Validation(format!(
                "Page {} is past the last page ({})",
                page, total_pages
            )));
        }
        let offset = i64::from(page - 1) * size;
        let cards = queries::cards_in_column(&mut conn, column_id, size, offset).await?;

        Ok(Some(ColumnPage {
            id: column.id,
            role: column.role()?,
            name: column.name,
            page,
            total_pages,
            total_cards,
            cards,
        }))
    }

    pub async fn delete(_pool: &SqlitePool, id: i64) -> Result<(), KanbanError> {
        validate_id(id)?;
        Err(KanbanError::Unsupported(format!(
            "Deleting card {} is not implemented",
            id
        )))
    }
}
