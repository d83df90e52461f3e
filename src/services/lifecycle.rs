//! Card lifecycle state machine.
//!
//! ```text
//! create     : (none)               -> INITIAL, unblocked
//! move_next  : R, unblocked         -> column at R.position + 1   (R not FINAL/CANCEL)
//! block      : R, unblocked         -> R, blocked                 (R not FINAL/CANCEL)
//! unblock    : R, blocked           -> R, unblocked
//! cancel     : R, unblocked         -> CANCEL                     (R not FINAL/CANCEL)
//! ```
//!
//! Each operation consumes the engine, so one engine is one unit of work:
//! success commits every write made through the gateway, and any failure
//! rolls all of them back before the error reaches the caller.

use crate::domain::validation::{validate_card, validate_id, validate_text};
use crate::domain::{
    Card, CardDetails, ColumnInfo, ColumnLayout, ColumnRole, IllegalState, KanbanError, NewCard,
};
use crate::infrastructure::CardGateway;

pub struct LifecycleEngine<G: CardGateway> {
    gateway: G,
}

impl<G: CardGateway> LifecycleEngine<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Reads a board's topology inside this unit of work.
    pub async fn board_layout(&mut self, board_id: i64) -> Result<ColumnLayout, KanbanError> {
        validate_id(board_id)?;
        let columns = self.gateway.find_columns_by_board_id(board_id).await?;
        if columns.is_empty() {
            return Err(KanbanError::NotFound(format!(
                "Board with id {} was not found",
                board_id
            )));
        }
        let infos = columns
            .iter()
            .map(|c| c.info())
            .collect::<Result<Vec<_>, _>>()?;
        ColumnLayout::new(infos).map_err(|e| {
            KanbanError::Internal(format!("Board {} has a malformed layout: {}", board_id, e))
        })
    }

    pub async fn create(mut self, card: NewCard, column_id: i64) -> Result<Card, KanbanError> {
        validate_card(&card)?;
        validate_id(column_id)?;

        let result = self.gateway.insert_card(&card, column_id).await;
        let created = self.finish(result).await?;

        tracing::info!(
            card_id = created.id,
            column_id,
            priority = created.priority.as_str(),
            "Card created"
        );
        Ok(created)
    }

    pub async fn move_to_next(
        mut self,
        card_id: i64,
        layout: &ColumnLayout,
    ) -> Result<ColumnInfo, KanbanError> {
        validate_id(card_id)?;

        let result = self.try_move_to_next(card_id, layout).await;
        let (from, to) = self.finish(result).await?;

        tracing::info!(
            card_id,
            from_column = from.name.as_str(),
            to_column = to.name.as_str(),
            "Card moved to next column"
        );
        Ok(to)
    }

    async fn try_move_to_next(
        &mut self,
        card_id: i64,
        layout: &ColumnLayout,
    ) -> Result<(ColumnInfo, ColumnInfo), KanbanError> {
        let details = self.load_card(card_id).await?;
        let current = movable_column(&details, layout)?;
        let next = layout
            .successor(current)
            .ok_or(IllegalState::Cancelled { card_id })?;

        self.gateway.move_card_to_column(next.id, card_id).await?;
        Ok((current.clone(), next.clone()))
    }

    pub async fn cancel(
        mut self,
        card_id: i64,
        cancel_column_id: i64,
        layout: &ColumnLayout,
    ) -> Result<ColumnInfo, KanbanError> {
        validate_id(card_id)?;
        validate_id(cancel_column_id)?;

        let result = self.try_cancel(card_id, cancel_column_id, layout).await;
        let (from, to) = self.finish(result).await?;

        tracing::info!(
            card_id,
            from_column = from.name.as_str(),
            to_column = to.name.as_str(),
            "Card cancelled"
        );
        Ok(to)
    }

    async fn try_cancel(
        &mut self,
        card_id: i64,
        cancel_column_id: i64,
        layout: &ColumnLayout,
    ) -> Result<(ColumnInfo, ColumnInfo), KanbanError> {
        let details = self.load_card(card_id).await?;
        let current = movable_column(&details, layout)?;

        let target = layout
            .find(cancel_column_id)
            .filter(|c| c.role == ColumnRole::Cancel)
            .ok_or(IllegalState::NotCancelColumn {
                column_id: cancel_column_id,
            })?;

        self.gateway.move_card_to_column(target.id, card_id).await?;
        Ok((current.clone(), target.clone()))
    }

    pub async fn block(
        mut self,
        card_id: i64,
        reason: &str,
        layout: &ColumnLayout,
    ) -> Result<(), KanbanError> {
        validate_id(card_id)?;
        validate_text("Block reason", reason)?;

        let result = self.try_block(card_id, reason, layout).await;
        self.finish(result).await?;

        tracing::info!(card_id, reason, "Card blocked");
        Ok(())
    }

    async fn try_block(
        &mut self,
        card_id: i64,
        reason: &str,
        layout: &ColumnLayout,
    ) -> Result<(), KanbanError> {
        let details = self.load_card(card_id).await?;
        if details.blocked {
            return Err(IllegalState::AlreadyBlocked { card_id }.into());
        }

        let current = layout
            .find(details.column_id)
            .ok_or(IllegalState::ForeignBoard { card_id })?;
        if current.role.is_terminal() {
            return Err(IllegalState::TerminalColumn {
                card_id,
                role: current.role,
            }
            .into());
        }

        self.gateway.open_block(reason, card_id).await
    }

    pub async fn unblock(mut self, card_id: i64, reason: &str) -> Result<(), KanbanError> {
        validate_id(card_id)?;
        validate_text("Unblock reason", reason)?;

        let result = self.try_unblock(card_id, reason).await;
        self.finish(result).await?;

        tracing::info!(card_id, reason, "Card unblocked");
        Ok(())
    }

    async fn try_unblock(&mut self, card_id: i64, reason: &str) -> Result<(), KanbanError> {
        let details = self.load_card(card_id).await?;
        if !details.blocked {
            return Err(IllegalState::NotBlocked { card_id }.into());
        }

        self.gateway.close_block(reason, card_id).await
    }

    async fn load_card(&mut self, card_id: i64) -> Result<CardDetails, KanbanError> {
        self.gateway
            .find_card_details_by_id(card_id)
            .await?
            .ok_or_else(|| KanbanError::NotFound(format!("Card with id {} was not found", card_id)))
    }

    async fn finish<T>(&mut self, result: Result<T, KanbanError>) -> Result<T, KanbanError> {
        match result {
            Ok(value) => {
                self.gateway.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Rolling back card operation");
                if let Err(rollback_err) = self.gateway.rollback().await {
                    tracing::error!("Rollback failed after {}: {}", err, rollback_err);
                }
                Err(err)
            }
        }
    }
}

/// The card's current column, provided the card may leave it.
fn movable_column<'a>(
    details: &CardDetails,
    layout: &'a ColumnLayout,
) -> Result<&'a ColumnInfo, KanbanError> {
    let card_id = details.id;
    if details.blocked {
        return Err(IllegalState::CardBlocked { card_id }.into());
    }

    let current = layout
        .find(details.column_id)
        .ok_or(IllegalState::ForeignBoard { card_id })?;

    match current.role {
        ColumnRole::Final => Err(IllegalState::AlreadyFinished { card_id }.into()),
        ColumnRole::Cancel => Err(IllegalState::Cancelled { card_id }.into()),
        ColumnRole::Initial | ColumnRole::Pending => Ok(current),
    }
}
