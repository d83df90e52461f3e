use serde::Deserialize;
use sqlx::SqlitePool;

use crate::domain::validation::{validate_id, validate_text};
use crate::domain::{
    Board, BoardColumn, BoardDetails, BoardRecord, ColumnLayout, ColumnRole, KanbanError,
};
use crate::infrastructure::queries;

/// A board submitted for creation. Column positions are assigned from the
/// order given here.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBoard {
    pub name: String,
    pub initial_column: String,
    #[serde(default)]
    pub pending_columns: Vec<String>,
    pub final_column: String,
    pub cancel_column: String,
}

impl NewBoard {
    fn columns(&self) -> Vec<(&str, ColumnRole)> {
        let mut columns = vec![(self.initial_column.as_str(), ColumnRole::Initial)];
        columns.extend(
            self.pending_columns
                .iter()
                .map(|name| (name.as_str(), ColumnRole::Pending)),
        );
        columns.push((self.final_column.as_str(), ColumnRole::Final));
        columns.push((self.cancel_column.as_str(), ColumnRole::Cancel));
        columns
    }
}

pub struct BoardService;

impl BoardService {
    pub async fn create(pool: &SqlitePool, req: NewBoard) -> Result<Board, KanbanError> {
        validate_text("Board name", &req.name)?;
        let columns = req.columns();
        for (name, role) in &columns {
            validate_text(&format!("{} column name", role), name)?;
        }

        let mut tx = pool.begin().await?;
        let record = queries::insert_board(&mut tx, &req.name).await?;

        let mut stored = Vec::with_capacity(columns.len());
        for (position, (name, role)) in columns.into_iter().enumerate() {
            let column =
                queries::insert_column(&mut tx, record.id, name, position as i64, role).await?;
            stored.push(column);
        }

        let board = assemble(record, &stored)?;
        tx.commit().await?;

        tracing::info!(
            board_id = board.id,
            columns = board.layout.columns().len(),
            "Board created"
        );
        Ok(board)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<BoardRecord>, KanbanError> {
        let mut conn = pool.acquire().await?;
        queries::list_boards(&mut conn).await
    }

    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Board>, KanbanError> {
        validate_id(id)?;
        let mut conn = pool.acquire().await?;

        let Some(record) = queries::find_board(&mut conn, id).await? else {
            return Ok(None);
        };
        let columns = queries::find_columns_by_board_id(&mut conn, id).await?;

        assemble(record, &columns).map(Some)
    }

    pub async fn details(pool: &SqlitePool, id: i64) -> Result<Option<BoardDetails>, KanbanError> {
        validate_id(id)?;
        let mut conn = pool.acquire().await?;

        let Some(record) = queries::find_board(&mut conn, id).await? else {
            return Ok(None);
        };
        let columns = queries::column_summaries(&mut conn, id).await?;

        Ok(Some(BoardDetails {
            id: record.id,
            name: record.name,
            columns,
        }))
    }

    /// Deletes a board with its columns, cards and block history.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, KanbanError> {
        validate_id(id)?;
        let mut tx = pool.begin().await?;
        let affected = queries::delete_board(&mut tx, id).await?;
        tx.commit().await?;

        if affected > 0 {
            tracing::info!(board_id = id, "Board deleted");
        }
        Ok(affected > 0)
    }
}

fn assemble(record: BoardRecord, columns: &[BoardColumn]) -> Result<Board, KanbanError> {
    let infos = columns
        .iter()
        .map(BoardColumn::info)
        .collect::<Result<Vec<_>, _>>()?;
    let layout = ColumnLayout::new(infos).map_err(|e| {
        KanbanError::Internal(format!("Board {} has a malformed layout: {}", record.id, e))
    })?;

    Ok(Board {
        id: record.id,
        name: record.name,
        created_at: record.created_at,
        updated_at: record.updated_at,
        layout,
    })
}
