#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use kanban_tracker::domain::{Board, NewCard, Priority};
use kanban_tracker::infrastructure::{db, SqliteGateway};
use kanban_tracker::services::{BoardService, LifecycleEngine, NewBoard};

/// A fresh migrated database in a temporary directory. Keep the `TempDir`
/// alive for as long as the pool is used.
pub async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temporary directory should be created");
    let url = format!("sqlite://{}", dir.path().join("kanban.db").display());
    let pool = db::init_db(&url, 2)
        .await
        .expect("Failed to create test database");

    (dir, pool)
}

/// INITIAL(0), PENDING(1), FINAL(2), CANCEL(3).
pub async fn standard_board(pool: &SqlitePool) -> Board {
    board_with_pending(pool, &["Doing"]).await
}

pub async fn board_with_pending(pool: &SqlitePool, pending: &[&str]) -> Board {
    BoardService::create(
        pool,
        NewBoard {
            name: "Personal".into(),
            initial_column: "To do".into(),
            pending_columns: pending.iter().map(|s| s.to_string()).collect(),
            final_column: "Done".into(),
            cancel_column: "Dropped".into(),
        },
    )
    .await
    .expect("board should be created")
}

pub async fn engine(pool: &SqlitePool) -> LifecycleEngine<SqliteGateway> {
    LifecycleEngine::new(
        SqliteGateway::begin(pool)
            .await
            .expect("transaction should begin"),
    )
}

pub fn new_card(title: &str) -> NewCard {
    NewCard {
        title: title.into(),
        description: format!("{} description", title),
        priority: Some(Priority::High),
        due_date: None,
    }
}

pub async fn create_card(pool: &SqlitePool, board: &Board, title: &str) -> i64 {
    engine(pool)
        .await
        .create(new_card(title), board.layout.initial().id)
        .await
        .expect("card should be created")
        .id
}
