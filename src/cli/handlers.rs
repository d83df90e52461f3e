use std::fmt::Write as _;

use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::cli::{BoardCommand, CardCommand, ColumnCommand, Commands};
use crate::config::Config;
use crate::domain::card::parse_due_date;
use crate::domain::{CardDetails, KanbanError, NewCard};
use crate::infrastructure::SqliteGateway;
use crate::services::{BoardService, CardService, LifecycleEngine, NewBoard};

/// Runs one command and returns what should be printed on stdout.
pub async fn execute(
    pool: &SqlitePool,
    config: &Config,
    command: Commands,
    json: bool,
) -> Result<String, KanbanError> {
    match command {
        Commands::Board { command } => board(pool, command, json).await,
        Commands::Column { command } => column(pool, config, command, json).await,
        Commands::Card { command } => card(pool, command, json).await,
    }
}

fn render<T: Serialize>(
    json: bool,
    value: &T,
    human: impl FnOnce(&T) -> String,
) -> Result<String, KanbanError> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(human(value))
    }
}

async fn begin_engine(pool: &SqlitePool) -> Result<LifecycleEngine<SqliteGateway>, KanbanError> {
    Ok(LifecycleEngine::new(SqliteGateway::begin(pool).await?))
}

// ── Boards ─────────────────────────────────────────────────

async fn board(pool: &SqlitePool, command: BoardCommand, json: bool) -> Result<String, KanbanError> {
    match command {
        BoardCommand::Create {
            name,
            initial,
            pending,
            final_column,
            cancel,
        } => {
            let board = BoardService::create(
                pool,
                NewBoard {
                    name,
                    initial_column: initial,
                    pending_columns: pending,
                    final_column,
                    cancel_column: cancel,
                },
            )
            .await?;

            render(json, &board, |b| {
                let columns: Vec<String> = b
                    .layout
                    .columns()
                    .iter()
                    .map(|c| format!("{} - {} [{}]", c.id, c.name, c.role))
                    .collect();
                format!("Board {} - {} created\n{}", b.id, b.name, columns.join("\n"))
            })
        }
        BoardCommand::List => {
            let boards = BoardService::list(pool).await?;
            render(json, &boards, |boards| {
                if boards.is_empty() {
                    return "No boards yet.".into();
                }
                boards
                    .iter()
                    .map(|b| format!("{} - {}", b.id, b.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        BoardCommand::Show { board_id } => {
            let details = BoardService::details(pool, board_id)
                .await?
                .ok_or_else(|| board_not_found(board_id))?;

            render(json, &details, |b| {
                let mut out = format!("Board [{},{}]", b.id, b.name);
                for c in &b.columns {
                    let _ = write!(
                        out,
                        "\nColumn [{}] type: [{}] has {} cards",
                        c.name, c.role, c.cards_amount
                    );
                }
                out
            })
        }
        BoardCommand::Delete { board_id } => {
            if !BoardService::delete(pool, board_id).await? {
                return Err(board_not_found(board_id));
            }
            render(json, &json!({ "deleted": board_id }), |_| {
                format!("Board {} has been deleted", board_id)
            })
        }
    }
}

fn board_not_found(board_id: i64) -> KanbanError {
    KanbanError::NotFound(format!("No board was found with ID {}", board_id))
}

// ── Columns ────────────────────────────────────────────────

async fn column(
    pool: &SqlitePool,
    config: &Config,
    command: ColumnCommand,
    json: bool,
) -> Result<String, KanbanError> {
    match command {
        ColumnCommand::Show {
            board_id,
            column_id,
            page,
        } => {
            let board = BoardService::find(pool, board_id)
                .await?
                .ok_or_else(|| board_not_found(board_id))?;
            let not_in_board = || {
                KanbanError::NotFound(format!(
                    "Column {} does not belong to board {}",
                    column_id, board.name
                ))
            };
            if board.layout.find(column_id).is_none() {
                return Err(not_in_board());
            }

            let page = CardService::column_cards(pool, column_id, page, config.page_size)
                .await?
                .ok_or_else(not_in_board)?;

            render(json, &page, |p| {
                let mut out = format!("Column {} type {}", p.name, p.role);
                if p.total_cards == 0 {
                    out.push_str("\nNo cards in this column.");
                    return out;
                }
                let _ = write!(out, "\nCards (Page {} of {})", p.page, p.total_pages);
                for card in &p.cards {
                    let _ = write!(out, "\nCard {} - {} [{}]", card.id, card.title, card.priority);
                }
                out
            })
        }
    }
}

// ── Cards ──────────────────────────────────────────────────

async fn card(pool: &SqlitePool, command: CardCommand, json: bool) -> Result<String, KanbanError> {
    match command {
        CardCommand::Create {
            board_id,
            title,
            description,
            priority,
            due,
        } => {
            let due_date = due.as_deref().map(parse_due_date).transpose()?;
            let new_card = NewCard {
                title,
                description,
                priority,
                due_date,
            };

            let mut engine = begin_engine(pool).await?;
            let layout = engine.board_layout(board_id).await?;
            let initial = layout.initial().clone();
            let card = engine.create(new_card, initial.id).await?;

            render(json, &card, |c| {
                format!("Card {} created in column {}", c.id, initial.name)
            })
        }
        CardCommand::Move { board_id, card_id } => {
            let mut engine = begin_engine(pool).await?;
            let layout = engine.board_layout(board_id).await?;
            let next = engine.move_to_next(card_id, &layout).await?;

            render(json, &next, |c| {
                format!("Card {} moved to column {} [{}]", card_id, c.name, c.role)
            })
        }
        CardCommand::Block {
            board_id,
            card_id,
            reason,
        } => {
            let mut engine = begin_engine(pool).await?;
            let layout = engine.board_layout(board_id).await?;
            engine.block(card_id, &reason, &layout).await?;

            let details = reload(pool, card_id).await?;
            render(json, &details, |c| format!("Card {} blocked: {}", c.id, reason))
        }
        CardCommand::Unblock { card_id, reason } => {
            begin_engine(pool).await?.unblock(card_id, &reason).await?;

            let details = reload(pool, card_id).await?;
            render(json, &details, |c| format!("Card {} unblocked: {}", c.id, reason))
        }
        CardCommand::Cancel { board_id, card_id } => {
            let mut engine = begin_engine(pool).await?;
            let layout = engine.board_layout(board_id).await?;
            let cancel_column_id = layout.cancel().id;
            let target = engine.cancel(card_id, cancel_column_id, &layout).await?;

            render(json, &target, |c| {
                format!("Card {} cancelled into column {}", card_id, c.name)
            })
        }
        CardCommand::Show { card_id, history } => {
            let details = reload(pool, card_id).await?;
            let blocks = if history {
                CardService::block_history(pool, card_id).await?
            } else {
                Vec::new()
            };

            render(
                json,
                &json!({ "card": &details, "blocks": &blocks }),
                |_| {
                    let mut out = describe_card(&details);
                    for block in &blocks {
                        let _ = write!(
                            out,
                            "\nBlocked at {}: {}",
                            block.blocked_at, block.block_reason
                        );
                        if let (Some(at), Some(reason)) = (&block.unblocked_at, &block.unblock_reason)
                        {
                            let _ = write!(out, "\nUnblocked at {}: {}", at, reason);
                        }
                    }
                    out
                },
            )
        }
        CardCommand::Delete { card_id } => {
            CardService::delete(pool, card_id).await?;
            render(json, &json!({ "deleted": card_id }), |_| {
                format!("Card {} has been deleted", card_id)
            })
        }
    }
}

async fn reload(pool: &SqlitePool, card_id: i64) -> Result<CardDetails, KanbanError> {
    CardService::details(pool, card_id)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("No card exists with ID {}", card_id)))
}

fn describe_card(c: &CardDetails) -> String {
    let mut out = format!("Card {} - {}.", c.id, c.title);
    let _ = write!(out, "\nDescription: {}", c.description);
    let _ = write!(out, "\nPriority: {}", c.priority);
    match &c.due_date {
        Some(due) => {
            let _ = write!(out, "\nDue Date: {}", due);
        }
        None => out.push_str("\nDue Date: None"),
    }
    match (c.blocked, &c.block_reason) {
        (true, Some(reason)) => {
            let _ = write!(out, "\nIs blocked. Reason: {}", reason);
        }
        _ => out.push_str("\nIs not blocked"),
    }
    let _ = write!(out, "\nHas been blocked {} times", c.blocks_amount);
    let _ = write!(
        out,
        "\nIs currently in column {} - {} [{}]",
        c.column_id, c.column_name, c.column_role
    );
    out
}
