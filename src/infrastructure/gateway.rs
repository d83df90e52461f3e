use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, SqliteConnection, Transaction};

use crate::domain::{BoardColumn, Card, CardDetails, IllegalState, KanbanError, NewCard};
use crate::infrastructure::queries;

/// Storage seen by the lifecycle engine: one unit of work that ends with
/// exactly one `commit` or `rollback`.
#[async_trait]
pub trait CardGateway: Send {
    async fn insert_card(&mut self, card: &NewCard, column_id: i64) -> Result<Card, KanbanError>;

    async fn find_card_details_by_id(
        &mut self,
        card_id: i64,
    ) -> Result<Option<CardDetails>, KanbanError>;

    async fn move_card_to_column(&mut self, column_id: i64, card_id: i64) -> Result<(), KanbanError>;

    async fn open_block(&mut self, reason: &str, card_id: i64) -> Result<(), KanbanError>;

    async fn close_block(&mut self, reason: &str, card_id: i64) -> Result<(), KanbanError>;

    async fn find_columns_by_board_id(
        &mut self,
        board_id: i64,
    ) -> Result<Vec<BoardColumn>, KanbanError>;

    async fn commit(&mut self) -> Result<(), KanbanError>;

    async fn rollback(&mut self) -> Result<(), KanbanError>;
}

/// A [`CardGateway`] backed by one SQLite transaction.
pub struct SqliteGateway {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteGateway {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, KanbanError> {
        let tx = pool.begin().await?;
        Ok(Self { tx: Some(tx) })
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, KanbanError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| KanbanError::Internal("Transaction already finished".into()))
    }
}

#[async_trait]
impl CardGateway for SqliteGateway {
    async fn insert_card(&mut self, card: &NewCard, column_id: i64) -> Result<Card, KanbanError> {
        let conn = self.conn()?;
        if queries::find_column(&mut *conn, column_id).await?.is_none() {
            return Err(KanbanError::NotFound(format!(
                "Column with id {} was not found",
                column_id
            )));
        }
        queries::insert_card(conn, card, column_id).await
    }

    async fn find_card_details_by_id(
        &mut self,
        card_id: i64,
    ) -> Result<Option<CardDetails>, KanbanError> {
        queries::find_card_details(self.conn()?, card_id).await
    }

    async fn move_card_to_column(&mut self, column_id: i64, card_id: i64) -> Result<(), KanbanError> {
        let affected = queries::move_card_to_column(self.conn()?, column_id, card_id).await?;
        if affected == 0 {
            return Err(KanbanError::NotFound(format!(
                "Card with id {} was not found",
                card_id
            )));
        }
        Ok(())
    }

    async fn open_block(&mut self, reason: &str, card_id: i64) -> Result<(), KanbanError> {
        queries::open_block(self.conn()?, reason, card_id).await
    }

    async fn close_block(&mut self, reason: &str, card_id: i64) -> Result<(), KanbanError> {
        let affected = queries::close_block(self.conn()?, reason, card_id).await?;
        if affected == 0 {
            return Err(IllegalState::NotBlocked { card_id }.into());
        }
        Ok(())
    }

    async fn find_columns_by_board_id(
        &mut self,
        board_id: i64,
    ) -> Result<Vec<BoardColumn>, KanbanError> {
        queries::find_columns_by_board_id(self.conn()?, board_id).await
    }

    async fn commit(&mut self) -> Result<(), KanbanError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(KanbanError::Internal("Transaction already finished".into())),
        }
    }

    async fn rollback(&mut self) -> Result<(), KanbanError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.rollback().await?),
            None => Ok(()),
        }
    }
}
