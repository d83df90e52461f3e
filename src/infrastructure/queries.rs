//! SQL shared by the transactional gateway and the read-side services.
//!
//! Every function takes a bare connection so it runs the same whether the
//! caller holds a pooled connection or an open transaction.

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use crate::domain::card::DUE_DATE_FORMAT;
use crate::domain::{
    BlockEvent, BoardColumn, BoardRecord, Card, CardDetails, ColumnRole, ColumnSummary,
    KanbanError, NewCard,
};

fn now() -> String {
    Utc::now().to_rfc3339()
}

// ── Boards ─────────────────────────────────────────────────

pub async fn insert_board(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<BoardRecord, KanbanError> {
    let now = now();
    let board: BoardRecord = sqlx::query_as(
        "INSERT INTO boards (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id, name, created_at, updated_at",
    )
    .bind(name)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(board)
}

pub async fn insert_column(
    conn: &mut SqliteConnection,
    board_id: i64,
    name: &str,
    position: i64,
    role: ColumnRole,
) -> Result<BoardColumn, KanbanError> {
    let now = now();
    let column: BoardColumn = sqlx::query_as(
        "INSERT INTO board_columns (board_id, name, position, kind, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(board_id)
    .bind(name)
    .bind(position)
    .bind(role.as_str())
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(column)
}

pub async fn find_board(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<BoardRecord>, KanbanError> {
    let board = sqlx::query_as("SELECT id, name, created_at, updated_at FROM boards WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(board)
}

pub async fn list_boards(conn: &mut SqliteConnection) -> Result<Vec<BoardRecord>, KanbanError> {
    let boards = sqlx::query_as("SELECT id, name, created_at, updated_at FROM boards ORDER BY id ASC")
        .fetch_all(&mut *conn)
        .await?;

    Ok(boards)
}

pub async fn delete_board(conn: &mut SqliteConnection, id: i64) -> Result<u64, KanbanError> {
    let result = sqlx::query("DELETE FROM boards WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

// ── Columns ────────────────────────────────────────────────

pub async fn find_columns_by_board_id(
    conn: &mut SqliteConnection,
    board_id: i64,
) -> Result<Vec<BoardColumn>, KanbanError> {
    let columns = sqlx::query_as("SELECT * FROM board_columns WHERE board_id = ? ORDER BY position ASC")
        .bind(board_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(columns)
}

pub async fn find_column(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<BoardColumn>, KanbanError> {
    let column = sqlx::query_as("SELECT * FROM board_columns WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(column)
}

pub async fn column_summaries(
    conn: &mut SqliteConnection,
    board_id: i64,
) -> Result<Vec<ColumnSummary>, KanbanError> {
    let rows = sqlx::query(
        r#"
        SELECT
            bc.id, bc.name, bc.kind, bc.position,
            COALESCE((SELECT COUNT(*) FROM cards c WHERE c.board_column_id = bc.id), 0) AS cards_amount
        FROM board_columns bc
        WHERE bc.board_id = ?
        ORDER BY bc.position ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            let kind: String = row.get("kind");
            Ok(ColumnSummary {
                id: row.get("id"),
                name: row.get("name"),
                role: kind.parse().map_err(KanbanError::Internal)?,
                position: row.get("position"),
                cards_amount: row.get("cards_amount"),
            })
        })
        .collect()
}

// ── Cards ──────────────────────────────────────────────────

pub async fn insert_card(
    conn: &mut SqliteConnection,
    card: &NewCard,
    column_id: i64,
) -> Result<Card, KanbanError> {
    let now = now();
    let priority = card.priority.unwrap_or_default();
    let due_date = card
        .due_date
        .map(|d| d.format(DUE_DATE_FORMAT).to_string());

    let card: Card = sqlx::query_as(
        "INSERT INTO cards (board_column_id, title, description, priority, due_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(column_id)
    .bind(&card.title)
    .bind(&card.description)
    .bind(priority.as_str())
    .bind(&due_date)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(card)
}

pub async fn find_card_details(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<CardDetails>, KanbanError> {
    let row = sqlx::query(
        r#"
        SELECT
            c.id, c.title, c.description, c.priority, c.due_date, c.created_at, c.updated_at,
            b.id IS NOT NULL AS blocked,
            b.block_reason,
            (SELECT COUNT(*) FROM blocks ab WHERE ab.card_id = c.id) AS blocks_amount,
            bc.id AS column_id, bc.name AS column_name, bc.kind AS column_kind
        FROM cards c
        INNER JOIN board_columns bc ON bc.id = c.board_column_id
        LEFT JOIN blocks b ON b.card_id = c.id AND b.unblocked_at IS NULL
        WHERE c.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let priority: String = row.get("priority");
    let kind: String = row.get("column_kind");

    Ok(Some(CardDetails {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        priority: priority
            .parse()
            .map_err(|e: String| KanbanError::Internal(format!("Invalid priority in DB: {}", e)))?,
        due_date: row.get("due_date"),
        blocked: row.get("blocked"),
        block_reason: row.get("block_reason"),
        blocks_amount: row.get("blocks_amount"),
        column_id: row.get("column_id"),
        column_name: row.get("column_name"),
        column_role: kind
            .parse()
            .map_err(|e: String| KanbanError::Internal(format!("Invalid column kind in DB: {}", e)))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

pub async fn move_card_to_column(
    conn: &mut SqliteConnection,
    column_id: i64,
    card_id: i64,
) -> Result<u64, KanbanError> {
    let result = sqlx::query("UPDATE cards SET board_column_id = ?, updated_at = ? WHERE id = ?")
        .bind(column_id)
        .bind(now())
        .bind(card_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn count_cards_in_column(
    conn: &mut SqliteConnection,
    column_id: i64,
) -> Result<i64, KanbanError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE board_column_id = ?")
        .bind(column_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

pub async fn cards_in_column(
    conn: &mut SqliteConnection,
    column_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Card>, KanbanError> {
    let cards = sqlx::query_as(
        "SELECT * FROM cards WHERE board_column_id = ? ORDER BY id ASC LIMIT ? OFFSET ?",
    )
    .bind(column_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    Ok(cards)
}

// ── Blocks ─────────────────────────────────────────────────

pub async fn open_block(
    conn: &mut SqliteConnection,
    reason: &str,
    card_id: i64,
) -> Result<(), KanbanError> {
    sqlx::query("INSERT INTO blocks (card_id, block_reason, blocked_at) VALUES (?, ?, ?)")
        .bind(card_id)
        .bind(reason)
        .bind(now())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn close_block(
    conn: &mut SqliteConnection,
    reason: &str,
    card_id: i64,
) -> Result<u64, KanbanError> {
    let result = sqlx::query(
        "UPDATE blocks SET unblock_reason = ?, unblocked_at = ? WHERE card_id = ? AND unblocked_at IS NULL",
    )
    .bind(reason)
    .bind(now())
    .bind(card_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn blocks_for_card(
    conn: &mut SqliteConnection,
    card_id: i64,
) -> Result<Vec<BlockEvent>, KanbanError> {
    let blocks = sqlx::query_as("SELECT * FROM blocks WHERE card_id = ? ORDER BY id ASC")
        .bind(card_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(blocks)
}
