mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use frontoffice::db::{swap_repo, trade_repo};
use frontoffice::engine::{executor, limits, responses, reversal, validator};
use frontoffice::errors::AppError;
use frontoffice::models::{ResponseStatus, SwapKind, TradeDetail, TradeStatus};

use common::{
    admin_caller, pick_asset, player_asset, seed_pick, seed_player, seed_season, seed_team,
    setup_test_db, team_caller, two_team_proposal,
};

async fn player_team(pool: &PgPool, id: Uuid) -> Uuid {
    let row: (Uuid,) = sqlx::query_as("SELECT team_id FROM players WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("player missing");
    row.0
}

async fn pick_owner(pool: &PgPool, id: Uuid) -> Uuid {
    let row: (Uuid,) = sqlx::query_as("SELECT current_team_id FROM picks WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("pick missing");
    row.0
}

async fn movement_count(pool: &PgPool, trade_id: Uuid) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM trade_asset_movements WHERE trade_id = $1")
            .bind(trade_id)
            .fetch_one(pool)
            .await
            .expect("count failed");
    row.0
}

fn participant_id(detail: &TradeDetail, team_id: Uuid) -> Uuid {
    detail
        .participants
        .iter()
        .find(|p| p.team_id == team_id)
        .expect("participant missing")
        .id
}

/// Scenario from the drawing board: team A sends player P1 to team B for
/// B's first-round pick. Both accept, admin executes, admin reverts, and
/// ownership is back exactly where it started.
#[tokio::test]
async fn test_execute_then_revert_restores_ownership() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 12_000_000).await;
    let pick12 = seed_pick(&pool, season.id, team_b.id, 1, 12).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![pick_asset(pick12.id)],
    );

    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");
    assert_eq!(detail.trade.status, TradeStatus::Proposed);
    assert_eq!(detail.participants.len(), 2);
    assert_eq!(detail.assets.len(), 2);

    // Creator is pre-accepted, counterparty still pending.
    let a_part = detail
        .participants
        .iter()
        .find(|p| p.team_id == team_a.id)
        .unwrap();
    assert!(a_part.is_initiator);
    assert_eq!(a_part.response_status, ResponseStatus::Accepted);

    // Counterparty accepts — the trade becomes executable but nothing moves.
    let b_participant = participant_id(&detail, team_b.id);
    let detail = responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .expect("response failed");
    assert_eq!(detail.trade.status, TradeStatus::Pending);
    assert_eq!(player_team(&pool, p1.id).await, team_a.id);

    // Execute: both assets move, two movement rows, timestamps stamped.
    let detail = executor::execute(&pool, detail.trade.id)
        .await
        .expect("execution failed");
    assert_eq!(detail.trade.status, TradeStatus::Executed);
    assert!(detail.trade.executed_at.is_some());
    assert_eq!(player_team(&pool, p1.id).await, team_b.id);
    assert_eq!(pick_owner(&pool, pick12.id).await, team_a.id);
    assert_eq!(movement_count(&pool, detail.trade.id).await, 2);

    // Revert: ownership restored, inverse movements appended.
    let reverting_user = Uuid::new_v4();
    let detail = reversal::revert(&pool, detail.trade.id, reverting_user)
        .await
        .expect("reversal failed");
    assert_eq!(detail.trade.status, TradeStatus::Reverted);
    assert!(detail.trade.reverted_at.is_some());
    assert_eq!(detail.trade.reverted_by_user, Some(reverting_user));
    assert_eq!(player_team(&pool, p1.id).await, team_a.id);
    assert_eq!(pick_owner(&pool, pick12.id).await, team_b.id);
    assert_eq!(movement_count(&pool, detail.trade.id).await, 4);
}

#[tokio::test]
async fn test_proposal_after_deadline_persists_nothing() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() - Duration::seconds(1), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );

    let err = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect_err("deadline should reject the proposal");
    assert!(matches!(err, AppError::Validation(_)));

    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trades")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, 0);
}

#[tokio::test]
async fn test_proposal_rejects_foreign_player() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    // Contributed by A but actually on B's roster.
    let stray = seed_player(&pool, team_b.id, "N. Webb", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(stray.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );

    let err = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect_err("foreign player should be rejected");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_proposal_rejects_pick_inside_swap() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let pick_a = seed_pick(&pool, season.id, team_a.id, 1, 5).await;
    let pick_b = seed_pick(&pool, season.id, team_a.id, 2, 35).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    swap_repo::create_swap(&pool, pick_a.id, pick_b.id, SwapKind::TakeBetter, team_a.id)
        .await
        .expect("swap creation failed");

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![pick_asset(pick_a.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );

    let err = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect_err("swapped pick should be rejected");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_asset_cannot_join_two_open_trades() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;
    let p3 = seed_player(&pool, team_b.id, "J. Armand", 1_000_000).await;

    let first = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    validator::propose(&pool, &team_caller(&team_a), &first)
        .await
        .expect("first proposal failed");

    // Same player offered again while the first trade is still open.
    let second = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p3.id)],
    );
    let err = validator::propose(&pool, &team_caller(&team_a), &second)
        .await
        .expect_err("double-booked asset should be rejected");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_rejection_is_terminal() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");

    let b_participant = participant_id(&detail, team_b.id);
    let detail = responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Rejected,
    )
    .await
    .expect("rejection failed");
    assert_eq!(detail.trade.status, TradeStatus::Rejected);

    // The response is write-once and the trade is closed.
    let err = responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .expect_err("second response should fail");
    assert!(matches!(err, AppError::Validation(_)));

    // Execution is permanently unavailable.
    let err = executor::execute(&pool, detail.trade.id)
        .await
        .expect_err("rejected trade must not execute");
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(movement_count(&pool, detail.trade.id).await, 0);
}

#[tokio::test]
async fn test_execute_requires_unanimous_acceptance() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");

    // Still proposed — the counterparty has not answered.
    let err = executor::execute(&pool, detail.trade.id)
        .await
        .expect_err("unaccepted trade must not execute");
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(player_team(&pool, p1.id).await, team_a.id);
}

#[tokio::test]
async fn test_double_execution_fails_without_side_effects() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");
    let b_participant = participant_id(&detail, team_b.id);
    responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .expect("response failed");

    executor::execute(&pool, detail.trade.id)
        .await
        .expect("execution failed");

    let err = executor::execute(&pool, detail.trade.id)
        .await
        .expect_err("second execution must fail");
    assert!(matches!(err, AppError::Validation(_)));

    // Exactly one execution's worth of movements, ownership unchanged.
    assert_eq!(movement_count(&pool, detail.trade.id).await, 2);
    assert_eq!(player_team(&pool, p1.id).await, team_b.id);
    assert_eq!(player_team(&pool, p2.id).await, team_a.id);
}

#[tokio::test]
async fn test_stale_ownership_aborts_execution() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let team_c = seed_team(&pool, season.id, "Riverside Rims").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");
    let b_participant = participant_id(&detail, team_b.id);
    responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .expect("response failed");

    // A waiver claim moves the player while the trade sits accepted.
    sqlx::query("UPDATE players SET team_id = $2 WHERE id = $1")
        .bind(p1.id)
        .bind(team_c.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = executor::execute(&pool, detail.trade.id)
        .await
        .expect_err("stale ownership must abort execution");
    assert!(matches!(err, AppError::Conflict(_)));

    // Zero side effects: no movements, no ownership change, still pending.
    assert_eq!(movement_count(&pool, detail.trade.id).await, 0);
    assert_eq!(player_team(&pool, p1.id).await, team_c.id);
    assert_eq!(player_team(&pool, p2.id).await, team_b.id);
    let trade = trade_repo::get_trade(&pool, detail.trade.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trade.status, TradeStatus::Pending);
}

#[tokio::test]
async fn test_revert_requires_executed_status() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");

    let err = reversal::revert(&pool, detail.trade.id, Uuid::new_v4())
        .await
        .expect_err("unexecuted trade must not revert");
    assert!(matches!(err, AppError::Validation(_)));

    // Execute, revert once, then a second revert must fail too.
    let b_participant = participant_id(&detail, team_b.id);
    responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .unwrap();
    executor::execute(&pool, detail.trade.id).await.unwrap();
    reversal::revert(&pool, detail.trade.id, Uuid::new_v4())
        .await
        .unwrap();

    let err = reversal::revert(&pool, detail.trade.id, Uuid::new_v4())
        .await
        .expect_err("second reversal must fail");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_reversal_forces_asset_back_after_intervening_move() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let team_c = seed_team(&pool, season.id, "Riverside Rims").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .expect("proposal failed");
    let b_participant = participant_id(&detail, team_b.id);
    responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .unwrap();
    executor::execute(&pool, detail.trade.id).await.unwrap();

    // The player moves again outside this trade.
    sqlx::query("UPDATE players SET team_id = $2 WHERE id = $1")
        .bind(p1.id)
        .bind(team_c.id)
        .execute(&pool)
        .await
        .unwrap();

    // Reversal restores from the movement log, last writer wins.
    reversal::revert(&pool, detail.trade.id, Uuid::new_v4())
        .await
        .expect("reversal failed");
    assert_eq!(player_team(&pool, p1.id).await, team_a.id);
}

#[tokio::test]
async fn test_trade_limit_report() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 1).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;
    let p3 = seed_player(&pool, team_a.id, "J. Armand", 1_000_000).await;
    let p4 = seed_player(&pool, team_b.id, "N. Webb", 1_000_000).await;

    // Execute one trade; the season allows one per team.
    let first = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &first)
        .await
        .unwrap();
    let b_participant = participant_id(&detail, team_b.id);
    responses::respond(
        &pool,
        &team_caller(&team_b),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .unwrap();
    executor::execute(&pool, detail.trade.id).await.unwrap();

    // A second proposal is allowed — the limit informs, it does not block.
    let second = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p3.id)],
        team_b.id,
        vec![player_asset(p4.id)],
    );
    let second_detail = validator::propose(&pool, &team_caller(&team_a), &second)
        .await
        .expect("limit must not block proposals");

    let report = limits::check_limits(&pool, second_detail.trade.id)
        .await
        .expect("limit check failed");
    assert_eq!(report.len(), 2);
    for entry in &report {
        assert_eq!(entry.executed_in_window, 1);
        assert_eq!(entry.trade_limit, 1);
        assert!(entry.at_limit);
    }

    let in_window = limits::count_executed_trades(
        &pool,
        team_a.id,
        season.starts_at,
        season.ends_at,
    )
    .await
    .unwrap();
    assert_eq!(in_window, 1);

    // A window before the execution sees nothing.
    let before = limits::count_executed_trades(
        &pool,
        team_a.id,
        season.starts_at,
        Utc::now() - Duration::days(1),
    )
    .await
    .unwrap();
    assert_eq!(before, 0);
}

#[tokio::test]
async fn test_deadline_sweep_cancels_open_trades() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .unwrap();

    // The deadline passes with the trade still open.
    sqlx::query("UPDATE seasons SET trade_deadline = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(season.id)
        .execute(&pool)
        .await
        .unwrap();

    let swept = trade_repo::cancel_open_after_deadline(&pool).await.unwrap();
    assert_eq!(swept, 1);

    let trade = trade_repo::get_trade(&pool, detail.trade.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trade.status, TradeStatus::Cancelled);
}

#[tokio::test]
async fn test_response_authorization() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let p1 = seed_player(&pool, team_a.id, "P. Laurent", 1_000_000).await;
    let p2 = seed_player(&pool, team_b.id, "T. Okafor", 1_000_000).await;

    let req = two_team_proposal(
        season.id,
        team_a.id,
        vec![player_asset(p1.id)],
        team_b.id,
        vec![player_asset(p2.id)],
    );
    let detail = validator::propose(&pool, &team_caller(&team_a), &req)
        .await
        .unwrap();
    let b_participant = participant_id(&detail, team_b.id);

    // Team A cannot answer for team B.
    let err = responses::respond(
        &pool,
        &team_caller(&team_a),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .expect_err("wrong team must not respond");
    assert!(matches!(err, AppError::Authorization(_)));

    // An administrator can.
    responses::respond(
        &pool,
        &admin_caller(),
        b_participant,
        ResponseStatus::Accepted,
    )
    .await
    .expect("admin override failed");
}

#[tokio::test]
async fn test_swap_registry_lifecycle() {
    let pool = setup_test_db().await;
    let season = seed_season(&pool, Utc::now() + Duration::days(10), 7).await;
    let team_a = seed_team(&pool, season.id, "Hilltop Hawks").await;
    let team_b = seed_team(&pool, season.id, "Dockside Dunkers").await;
    let pick_a = seed_pick(&pool, season.id, team_a.id, 1, 5).await;
    let pick_b = seed_pick(&pool, season.id, team_b.id, 1, 12).await;
    let pick_c = seed_pick(&pool, season.id, team_b.id, 2, 42).await;

    let swap = swap_repo::create_swap(&pool, pick_a.id, pick_b.id, SwapKind::TakeBetter, team_a.id)
        .await
        .expect("swap creation failed");
    assert_eq!(swap.kind, SwapKind::TakeBetter);

    let row: (bool,) = sqlx::query_as("SELECT in_swap FROM picks WHERE id = $1")
        .bind(pick_a.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(row.0);

    // A pick can sit in only one swap at a time.
    let err = swap_repo::create_swap(&pool, pick_a.id, pick_c.id, SwapKind::TakeWorse, team_a.id)
        .await
        .expect_err("pick already in a swap");
    assert!(matches!(err, AppError::Validation(_)));

    // The owner must hold at least one of the picks.
    let err = swap_repo::create_swap(&pool, pick_c.id, pick_c.id, SwapKind::TakeWorse, team_a.id)
        .await
        .expect_err("same pick twice");
    assert!(matches!(err, AppError::Validation(_)));

    // Transferring the right moves no picks.
    let moved = swap_repo::transfer_ownership(&pool, swap.id, team_b.id)
        .await
        .expect("transfer failed");
    assert_eq!(moved.owner_team_id, team_b.id);
    let row: (Uuid,) = sqlx::query_as("SELECT current_team_id FROM picks WHERE id = $1")
        .bind(pick_a.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, team_a.id);

    // Deletion thaws both picks.
    swap_repo::delete_swap(&pool, swap.id).await.expect("delete failed");
    let row: (bool, ) = sqlx::query_as("SELECT in_swap FROM picks WHERE id = $1")
        .bind(pick_b.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!row.0);
}
