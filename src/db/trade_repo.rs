use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    AssetKind, ResponseStatus, Trade, TradeAsset, TradeAssetMovement, TradeDetail,
    TradeParticipant, TradeStatus,
};

/// Filters for the trade list endpoint.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub season_id: Option<Uuid>,
    pub status: Option<TradeStatus>,
    pub team_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

// ---------------------------------------------------------------------------
// Proposal persistence
// ---------------------------------------------------------------------------

pub async fn insert_trade(
    conn: &mut PgConnection,
    season_id: Uuid,
    created_by_team_id: Uuid,
) -> sqlx::Result<Trade> {
    sqlx::query_as::<_, Trade>(
        r#"
        INSERT INTO trades (season_id, created_by_team_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(season_id)
    .bind(created_by_team_id)
    .fetch_one(conn)
    .await
}

pub async fn insert_participant(
    conn: &mut PgConnection,
    trade_id: Uuid,
    team_id: Uuid,
    is_initiator: bool,
    response: ResponseStatus,
) -> sqlx::Result<TradeParticipant> {
    sqlx::query_as::<_, TradeParticipant>(
        r#"
        INSERT INTO trade_participants (trade_id, team_id, is_initiator, response_status, responded_at)
        VALUES ($1, $2, $3, $4, CASE WHEN $4 = 'pending' THEN NULL ELSE NOW() END)
        RETURNING *
        "#,
    )
    .bind(trade_id)
    .bind(team_id)
    .bind(is_initiator)
    .bind(response)
    .fetch_one(conn)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_asset(
    conn: &mut PgConnection,
    trade_id: Uuid,
    participant_id: Uuid,
    kind: AssetKind,
    player_id: Option<Uuid>,
    pick_id: Option<Uuid>,
    to_team_id: Uuid,
) -> sqlx::Result<TradeAsset> {
    sqlx::query_as::<_, TradeAsset>(
        r#"
        INSERT INTO trade_assets (trade_id, participant_id, kind, player_id, pick_id, to_team_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(trade_id)
    .bind(participant_id)
    .bind(kind)
    .bind(player_id)
    .bind(pick_id)
    .bind(to_team_id)
    .fetch_one(conn)
    .await
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn get_trade(exec: impl sqlx::PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Trade>> {
    sqlx::query_as::<_, Trade>("SELECT * FROM trades WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// Fetch a trade under a row lock. All state transitions go through this,
/// so concurrent executors serialize on the trade row itself.
pub async fn lock_trade(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<Trade>> {
    sqlx::query_as::<_, Trade>("SELECT * FROM trades WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn get_participants(
    exec: impl sqlx::PgExecutor<'_>,
    trade_id: Uuid,
) -> sqlx::Result<Vec<TradeParticipant>> {
    sqlx::query_as::<_, TradeParticipant>(
        "SELECT * FROM trade_participants WHERE trade_id = $1 ORDER BY is_initiator DESC, id",
    )
    .bind(trade_id)
    .fetch_all(exec)
    .await
}

pub async fn get_participant(
    exec: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> sqlx::Result<Option<TradeParticipant>> {
    sqlx::query_as::<_, TradeParticipant>("SELECT * FROM trade_participants WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn get_assets(
    exec: impl sqlx::PgExecutor<'_>,
    trade_id: Uuid,
) -> sqlx::Result<Vec<TradeAsset>> {
    sqlx::query_as::<_, TradeAsset>("SELECT * FROM trade_assets WHERE trade_id = $1 ORDER BY id")
        .bind(trade_id)
        .fetch_all(exec)
        .await
}

/// Whether a player/pick already sits in a trade that is still open
/// (proposed or pending). Open trades hold an exclusive claim on their
/// assets.
pub async fn asset_in_open_trade(
    exec: impl sqlx::PgExecutor<'_>,
    kind: AssetKind,
    asset_id: Uuid,
) -> sqlx::Result<bool> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM trade_assets ta
            JOIN trades t ON t.id = ta.trade_id
            WHERE t.status IN ('proposed', 'pending')
              AND ta.kind = $1
              AND (ta.player_id = $2 OR ta.pick_id = $2)
        )
        "#,
    )
    .bind(kind)
    .bind(asset_id)
    .fetch_one(exec)
    .await?;

    Ok(row.0)
}

/// Trade row plus participants and assets, the full API view.
pub async fn get_detail(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<TradeDetail>> {
    let Some(trade) = get_trade(pool, id).await? else {
        return Ok(None);
    };
    let participants = get_participants(pool, id).await?;
    let assets = get_assets(pool, id).await?;

    Ok(Some(TradeDetail {
        trade,
        participants,
        assets,
    }))
}

pub async fn list_trades(pool: &PgPool, filter: &TradeFilter) -> sqlx::Result<Vec<Trade>> {
    let mut qb = QueryBuilder::new("SELECT * FROM trades WHERE TRUE");

    if let Some(season_id) = filter.season_id {
        qb.push(" AND season_id = ").push_bind(season_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(team_id) = filter.team_id {
        qb.push(" AND id IN (SELECT trade_id FROM trade_participants WHERE team_id = ")
            .push_bind(team_id)
            .push(")");
    }

    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    qb.build_query_as::<Trade>().fetch_all(pool).await
}

/// Trades a team participates in, newest first.
pub async fn trades_for_team(pool: &PgPool, team_id: Uuid) -> sqlx::Result<Vec<Trade>> {
    sqlx::query_as::<_, Trade>(
        r#"
        SELECT t.*
        FROM trades t
        JOIN trade_participants tp ON tp.trade_id = t.id
        WHERE tp.team_id = $1
        ORDER BY t.created_at DESC
        "#,
    )
    .bind(team_id)
    .fetch_all(pool)
    .await
}

pub async fn count_by_status(
    pool: &PgPool,
    season_id: Uuid,
) -> sqlx::Result<Vec<(TradeStatus, i64)>> {
    sqlx::query_as(
        "SELECT status, COUNT(*) FROM trades WHERE season_id = $1 GROUP BY status",
    )
    .bind(season_id)
    .fetch_all(pool)
    .await
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

pub async fn set_status(
    conn: &mut PgConnection,
    trade_id: Uuid,
    status: TradeStatus,
) -> sqlx::Result<Trade> {
    sqlx::query_as::<_, Trade>("UPDATE trades SET status = $2 WHERE id = $1 RETURNING *")
        .bind(trade_id)
        .bind(status)
        .fetch_one(conn)
        .await
}

pub async fn mark_executed(conn: &mut PgConnection, trade_id: Uuid) -> sqlx::Result<Trade> {
    sqlx::query_as::<_, Trade>(
        "UPDATE trades SET status = 'executed', executed_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(trade_id)
    .fetch_one(conn)
    .await
}

pub async fn mark_reverted(
    conn: &mut PgConnection,
    trade_id: Uuid,
    reverted_by_user: Uuid,
) -> sqlx::Result<Trade> {
    sqlx::query_as::<_, Trade>(
        r#"
        UPDATE trades
        SET status = 'reverted', reverted_at = NOW(), reverted_by_user = $2
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(trade_id)
    .bind(reverted_by_user)
    .fetch_one(conn)
    .await
}

/// Set the purely informational "settled" flag.
pub async fn set_settled(pool: &PgPool, trade_id: Uuid, settled: bool) -> sqlx::Result<Option<Trade>> {
    sqlx::query_as::<_, Trade>("UPDATE trades SET settled = $2 WHERE id = $1 RETURNING *")
        .bind(trade_id)
        .bind(settled)
        .fetch_optional(pool)
        .await
}

pub async fn set_response(
    conn: &mut PgConnection,
    participant_id: Uuid,
    response: ResponseStatus,
) -> sqlx::Result<TradeParticipant> {
    sqlx::query_as::<_, TradeParticipant>(
        r#"
        UPDATE trade_participants
        SET response_status = $2, responded_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(participant_id)
    .bind(response)
    .fetch_one(conn)
    .await
}

pub async fn count_pending_responses(
    conn: &mut PgConnection,
    trade_id: Uuid,
) -> sqlx::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM trade_participants WHERE trade_id = $1 AND response_status = 'pending'",
    )
    .bind(trade_id)
    .fetch_one(conn)
    .await?;

    Ok(row.0)
}

/// Cancel every still-open trade whose season deadline has passed.
/// Returns the number of trades swept.
pub async fn cancel_open_after_deadline(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE trades
        SET status = 'cancelled'
        WHERE status IN ('proposed', 'pending')
          AND season_id IN (SELECT id FROM seasons WHERE trade_deadline < NOW())
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Movement log
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub async fn insert_movement(
    conn: &mut PgConnection,
    trade_id: Uuid,
    kind: AssetKind,
    player_id: Option<Uuid>,
    pick_id: Option<Uuid>,
    from_team_id: Uuid,
    to_team_id: Uuid,
) -> sqlx::Result<TradeAssetMovement> {
    sqlx::query_as::<_, TradeAssetMovement>(
        r#"
        INSERT INTO trade_asset_movements (trade_id, kind, player_id, pick_id, from_team_id, to_team_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(trade_id)
    .bind(kind)
    .bind(player_id)
    .bind(pick_id)
    .bind(from_team_id)
    .bind(to_team_id)
    .fetch_one(conn)
    .await
}

/// Movements for a trade in insertion order.
pub async fn movements_for_trade(
    exec: impl sqlx::PgExecutor<'_>,
    trade_id: Uuid,
) -> sqlx::Result<Vec<TradeAssetMovement>> {
    sqlx::query_as::<_, TradeAssetMovement>(
        "SELECT * FROM trade_asset_movements WHERE trade_id = $1 ORDER BY seq",
    )
    .bind(trade_id)
    .fetch_all(exec)
    .await
}

// ---------------------------------------------------------------------------
// Trade-frequency accounting
// ---------------------------------------------------------------------------

/// Executed trades for a team whose execution timestamp falls inside the
/// window. Reverted trades count: they were executed once.
pub async fn count_executed_in_window(
    exec: impl sqlx::PgExecutor<'_>,
    team_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> sqlx::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM trades t
        JOIN trade_participants tp ON tp.trade_id = t.id
        WHERE tp.team_id = $1
          AND t.status IN ('executed', 'reverted')
          AND t.executed_at >= $2
          AND t.executed_at <= $3
        "#,
    )
    .bind(team_id)
    .bind(window_start)
    .bind(window_end)
    .fetch_one(exec)
    .await?;

    Ok(row.0)
}
