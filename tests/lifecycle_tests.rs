mod common;

use kanban_tracker::domain::{ColumnRole, IllegalState, KanbanError, NewCard, Priority};
use kanban_tracker::services::CardService;

use common::{create_card, engine, standard_board};

#[tokio::test]
async fn test_created_card_sits_unblocked_in_supplied_column() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let initial = board.layout.initial().clone();

    let card = engine(&pool)
        .await
        .create(
            NewCard {
                title: "Plan week".into(),
                description: "Pick three goals".into(),
                priority: None,
                due_date: Some(kanban_tracker::domain::card::parse_due_date("2026-11-02 09:00").unwrap()),
            },
            initial.id,
        )
        .await
        .unwrap();

    assert_eq!(card.board_column_id, initial.id);
    assert_eq!(card.priority, "MEDIUM");
    assert_eq!(card.due_date.as_deref(), Some("2026-11-02 09:00"));

    let details = CardService::details(&pool, card.id).await.unwrap().unwrap();
    assert_eq!(details.column_id, initial.id);
    assert_eq!(details.column_role, ColumnRole::Initial);
    assert!(!details.blocked);
    assert_eq!(details.blocks_amount, 0);
}

#[tokio::test]
async fn test_create_rejects_invalid_text_without_writing() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;

    let err = engine(&pool)
        .await
        .create(
            NewCard {
                title: "x".repeat(256),
                description: "fine".into(),
                priority: Some(Priority::Low),
                due_date: None,
            },
            board.layout.initial().id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, KanbanError::Validation(_)));

    let page = CardService::column_cards(&pool, board.layout.initial().id, 1, 10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.total_cards, 0);
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let layout = &board.layout;
    let card_id = create_card(&pool, &board, "Write report").await;

    let next = engine(&pool).await.move_to_next(card_id, layout).await.unwrap();
    assert_eq!(next.role, ColumnRole::Pending);

    engine(&pool).await.block(card_id, "waiting", layout).await.unwrap();
    let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
    assert!(details.blocked);
    assert_eq!(details.block_reason.as_deref(), Some("waiting"));

    let err = engine(&pool).await.move_to_next(card_id, layout).await.unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::CardBlocked { card_id }));

    engine(&pool).await.unblock(card_id, "done").await.unwrap();
    let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
    assert!(!details.blocked);

    let next = engine(&pool).await.move_to_next(card_id, layout).await.unwrap();
    assert_eq!(next.role, ColumnRole::Final);

    let err = engine(&pool).await.move_to_next(card_id, layout).await.unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::AlreadyFinished { card_id }));

    let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
    assert_eq!(details.column_id, layout.final_column().id);
}

#[tokio::test]
async fn test_blocked_card_never_changes_column() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let layout = &board.layout;
    let card_id = create_card(&pool, &board, "Stuck").await;

    engine(&pool).await.block(card_id, "vendor", layout).await.unwrap();

    for _ in 0..3 {
        let err = engine(&pool).await.move_to_next(card_id, layout).await.unwrap_err();
        assert_eq!(err.illegal_state(), Some(&IllegalState::CardBlocked { card_id }));
    }
    let err = engine(&pool)
        .await
        .cancel(card_id, layout.cancel().id, layout)
        .await
        .unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::CardBlocked { card_id }));

    let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
    assert_eq!(details.column_id, layout.initial().id);
    assert!(details.blocked);
}

#[tokio::test]
async fn test_repeated_moves_visit_increasing_positions() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = common::board_with_pending(&pool, &["Design", "Build", "Review"]).await;
    let layout = &board.layout;
    let card_id = create_card(&pool, &board, "Ship feature").await;

    let mut positions = vec![layout.initial().position];
    loop {
        match engine(&pool).await.move_to_next(card_id, layout).await {
            Ok(column) => positions.push(column.position),
            Err(err) => {
                assert_eq!(
                    err.illegal_state(),
                    Some(&IllegalState::AlreadyFinished { card_id })
                );
                break;
            }
        }
    }

    assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    assert_eq!(*positions.last().unwrap(), layout.final_column().position);
}

#[tokio::test]
async fn test_block_unblock_round_trip_counts_blocks() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let layout = &board.layout;
    let card_id = create_card(&pool, &board, "Flaky").await;
    engine(&pool).await.move_to_next(card_id, layout).await.unwrap();

    for round in 1..=2 {
        engine(&pool).await.block(card_id, "waiting", layout).await.unwrap();
        engine(&pool).await.unblock(card_id, "resolved").await.unwrap();

        let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
        assert!(!details.blocked);
        assert_eq!(details.block_reason, None);
        assert_eq!(details.blocks_amount, round);
        assert_eq!(details.column_role, ColumnRole::Pending);
    }

    let history = CardService::block_history(&pool, card_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|b| !b.is_open()));
    assert_eq!(history[0].unblock_reason.as_deref(), Some("resolved"));
}

#[tokio::test]
async fn test_double_block_and_needless_unblock_are_refused() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let layout = &board.layout;
    let card_id = create_card(&pool, &board, "Twice").await;

    let err = engine(&pool).await.unblock(card_id, "nothing").await.unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::NotBlocked { card_id }));

    engine(&pool).await.block(card_id, "first", layout).await.unwrap();
    let err = engine(&pool).await.block(card_id, "second", layout).await.unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::AlreadyBlocked { card_id }));

    let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
    assert_eq!(details.blocks_amount, 1);
    assert_eq!(details.block_reason.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_block_fails_in_terminal_columns() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let layout = &board.layout;

    let finished = create_card(&pool, &board, "Finished").await;
    engine(&pool).await.move_to_next(finished, layout).await.unwrap();
    engine(&pool).await.move_to_next(finished, layout).await.unwrap();

    let cancelled = create_card(&pool, &board, "Cancelled").await;
    engine(&pool)
        .await
        .cancel(cancelled, layout.cancel().id, layout)
        .await
        .unwrap();

    for (card_id, role) in [(finished, ColumnRole::Final), (cancelled, ColumnRole::Cancel)] {
        let err = engine(&pool).await.block(card_id, "nope", layout).await.unwrap_err();
        assert_eq!(
            err.illegal_state(),
            Some(&IllegalState::TerminalColumn { card_id, role })
        );
        let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
        assert!(!details.blocked);
    }
}

#[tokio::test]
async fn test_cancel_from_any_open_column_and_cancel_is_terminal() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = common::board_with_pending(&pool, &["Design", "Build"]).await;
    let layout = &board.layout;
    let cancel_id = layout.cancel().id;

    let from_initial = create_card(&pool, &board, "Early").await;
    let from_pending = create_card(&pool, &board, "Midway").await;
    engine(&pool).await.move_to_next(from_pending, layout).await.unwrap();
    engine(&pool).await.move_to_next(from_pending, layout).await.unwrap();

    for card_id in [from_initial, from_pending] {
        let target = engine(&pool).await.cancel(card_id, cancel_id, layout).await.unwrap();
        assert_eq!(target.id, cancel_id);

        let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
        assert_eq!(details.column_role, ColumnRole::Cancel);

        let err = engine(&pool).await.move_to_next(card_id, layout).await.unwrap_err();
        assert_eq!(err.illegal_state(), Some(&IllegalState::Cancelled { card_id }));

        let err = engine(&pool).await.cancel(card_id, cancel_id, layout).await.unwrap_err();
        assert_eq!(err.illegal_state(), Some(&IllegalState::Cancelled { card_id }));
    }
}

#[tokio::test]
async fn test_finished_card_cannot_be_cancelled() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let layout = &board.layout;
    let card_id = create_card(&pool, &board, "Done already").await;
    engine(&pool).await.move_to_next(card_id, layout).await.unwrap();
    engine(&pool).await.move_to_next(card_id, layout).await.unwrap();

    let err = engine(&pool)
        .await
        .cancel(card_id, layout.cancel().id, layout)
        .await
        .unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::AlreadyFinished { card_id }));
}

#[tokio::test]
async fn test_card_from_another_board_is_rejected() {
    let (_dir, pool) = common::setup_test_db().await;
    let home = standard_board(&pool).await;
    let work = standard_board(&pool).await;
    let card_id = create_card(&pool, &home, "Wrong board").await;

    let err = engine(&pool).await.move_to_next(card_id, &work.layout).await.unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::ForeignBoard { card_id }));

    let err = engine(&pool)
        .await
        .block(card_id, "waiting", &work.layout)
        .await
        .unwrap_err();
    assert_eq!(err.illegal_state(), Some(&IllegalState::ForeignBoard { card_id }));
}

#[tokio::test]
async fn test_missing_card_and_bad_ids() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;

    let err = engine(&pool).await.move_to_next(404, &board.layout).await.unwrap_err();
    assert!(matches!(err, KanbanError::NotFound(_)));
    assert_eq!(err.to_string(), "not found: Card with id 404 was not found");

    let err = engine(&pool).await.unblock(0, "reason").await.unwrap_err();
    assert!(matches!(err, KanbanError::Validation(_)));

    let err = engine(&pool).await.block(1, "  ", &board.layout).await.unwrap_err();
    assert!(matches!(err, KanbanError::Validation(_)));
}

#[tokio::test]
async fn test_create_in_missing_column_is_not_found() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = standard_board(&pool).await;
    let card_id = create_card(&pool, &board, "Survivor").await;

    let err = engine(&pool).await.create(common::new_card("Orphan"), 9_999).await.unwrap_err();
    assert!(matches!(err, KanbanError::NotFound(_)));
    assert_eq!(err.to_string(), "not found: Column with id 9999 was not found");
    assert_eq!(err.exit_code(), 3);
    assert!(!err.is_retryable());

    let details = CardService::details(&pool, card_id).await.unwrap().unwrap();
    assert_eq!(details.column_id, board.layout.initial().id);
    let page = CardService::column_cards(&pool, board.layout.initial().id, 1, 10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.total_cards, 1);
}

#[tokio::test]
async fn test_board_layout_is_read_through_the_gateway() {
    let (_dir, pool) = common::setup_test_db().await;
    let board = common::board_with_pending(&pool, &["Design"]).await;

    let mut engine = engine(&pool).await;
    let layout = engine.board_layout(board.id).await.unwrap();
    assert_eq!(layout, board.layout);

    let err = engine.board_layout(board.id + 100).await.unwrap_err();
    assert!(matches!(err, KanbanError::NotFound(_)));
}
