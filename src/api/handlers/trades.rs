use axum::extract::{Path, Query, State};
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::Caller;
use crate::api::ws_types::{ResponseUpdate, WsMessage};
use crate::db::trade_repo::{self, TradeFilter};
use crate::engine::{executor, limits, responses, reversal, validator};
use crate::errors::AppError;
use crate::models::{ResponseStatus, Trade, TradeDetail, TradeStatus};
use crate::AppState;

use super::check_throttle;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    })
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ListTradesQuery {
    pub season_id: Option<Uuid>,
    pub status: Option<TradeStatus>,
    pub team_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CountsQuery {
    pub season_id: Uuid,
}

#[derive(Serialize, Default)]
pub struct TradeCounts {
    pub proposed: i64,
    pub pending: i64,
    pub executed: i64,
    pub rejected: i64,
    pub cancelled: i64,
    pub reverted: i64,
    pub total: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespondRequest {
    pub response_status: ResponseStatus,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevertRequest {
    pub reverted_by_user: Uuid,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MadeRequest {
    pub settled: bool,
}

#[derive(Serialize)]
pub struct SweepResult {
    pub cancelled: u64,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/trades — paginated list, filterable by season, status, team
pub async fn list(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<ListTradesQuery>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let filter = TradeFilter {
        season_id: query.season_id,
        status: query.status,
        team_id: query.team_id,
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset: query.offset.unwrap_or(0).max(0),
    };

    let trades = trade_repo::list_trades(&state.db, &filter).await?;
    Ok(ok(trades))
}

/// GET /api/trades/counts — counts grouped by status for a season
pub async fn counts(
    State(state): State<AppState>,
    Query(query): Query<CountsQuery>,
) -> Result<Json<ApiResponse<TradeCounts>>, AppError> {
    let rows = trade_repo::count_by_status(&state.db, query.season_id).await?;

    let mut counts = TradeCounts::default();
    for (status, n) in rows {
        counts.total += n;
        match status {
            TradeStatus::Proposed => counts.proposed = n,
            TradeStatus::Pending => counts.pending = n,
            TradeStatus::Executed => counts.executed = n,
            TradeStatus::Rejected => counts.rejected = n,
            TradeStatus::Cancelled => counts.cancelled = n,
            TradeStatus::Reverted => counts.reverted = n,
        }
    }

    Ok(ok(counts))
}

/// GET /api/trades/my-trades — trades for the caller's team
pub async fn my_trades(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let team_id = caller
        .team_id
        .ok_or_else(|| AppError::Authorization("caller has no team".into()))?;

    let trades = trade_repo::trades_for_team(&state.db, team_id).await?;
    Ok(ok(trades))
}

/// GET /api/trades/team/{team_id} — trades scoped to a team
pub async fn team_trades(
    State(state): State<AppState>,
    caller: Caller,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    if !caller.owns_team(team_id) {
        return Err(AppError::Authorization(
            "not allowed to view this team's trades".into(),
        ));
    }

    let trades = trade_repo::trades_for_team(&state.db, team_id).await?;
    Ok(ok(trades))
}

/// GET /api/trades/{id} — full detail including participants and assets
pub async fn detail(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    let detail = trade_repo::get_detail(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    Ok(ok(detail))
}

/// GET /api/trades/{id}/trade-limits — per-participant limit report
pub async fn trade_limits(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<limits::ParticipantLimit>>>, AppError> {
    let report = limits::check_limits(&state.db, id).await?;
    Ok(ok(report))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/trades — propose a trade
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<validator::ProposeTradeRequest>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    check_throttle(&state, &caller).await?;

    let detail = validator::propose(&state.db, &caller, &body).await?;
    let _ = state.ws_tx.send(WsMessage::TradeProposed(detail.trade.clone()));

    Ok(ok(detail))
}

/// PATCH /api/trades/participants/{id} — record accept/reject
pub async fn respond(
    State(state): State<AppState>,
    caller: Caller,
    Path(participant_id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    check_throttle(&state, &caller).await?;

    let detail =
        responses::respond(&state.db, &caller, participant_id, body.response_status).await?;

    if let Some(participant) = detail
        .participants
        .iter()
        .find(|p| p.id == participant_id)
    {
        let _ = state.ws_tx.send(WsMessage::TradeResponse(ResponseUpdate {
            trade_id: detail.trade.id,
            participant_id,
            team_id: participant.team_id,
            response_status: participant.response_status,
            trade_status: detail.trade.status,
        }));
    }

    Ok(ok(detail))
}

/// POST /api/trades/{id}/execute — admin-gated atomic execution
pub async fn execute(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    caller.require_admin()?;
    check_throttle(&state, &caller).await?;

    let detail = executor::execute(&state.db, id).await?;
    let _ = state.ws_tx.send(WsMessage::TradeExecuted(detail.trade.clone()));

    Ok(ok(detail))
}

/// POST /api/trades/{id}/revert — admin-gated full reversal
pub async fn revert(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<RevertRequest>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    caller.require_admin()?;
    check_throttle(&state, &caller).await?;

    let detail = reversal::revert(&state.db, id, body.reverted_by_user).await?;
    let _ = state.ws_tx.send(WsMessage::TradeReverted(detail.trade.clone()));

    Ok(ok(detail))
}

/// POST /api/trades/reject-pending-after-deadline — bulk deadline sweep
pub async fn reject_pending_after_deadline(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApiResponse<SweepResult>>, AppError> {
    caller.require_admin()?;

    let cancelled = trade_repo::cancel_open_after_deadline(&state.db).await?;

    counter!("deadline_sweeps").increment(1);
    tracing::info!(cancelled, "Deadline sweep cancelled open trades");

    Ok(ok(SweepResult { cancelled }))
}

/// PATCH /api/trades/{id}/made — set the informational settled flag
pub async fn set_made(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<MadeRequest>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    caller.require_admin()?;

    let trade = trade_repo::set_settled(&state.db, id, body.settled)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    Ok(ok(trade))
}

/// DELETE /api/trades/{id}/cancel — cancel a non-executed trade
pub async fn cancel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TradeDetail>>, AppError> {
    check_throttle(&state, &caller).await?;

    let mut tx = state.db.begin().await?;

    let trade = trade_repo::lock_trade(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    if !caller.owns_team(trade.created_by_team_id) {
        return Err(AppError::Authorization(
            "only the creating team's owner or an administrator can cancel a trade".into(),
        ));
    }

    if !trade.status.is_open() {
        return Err(AppError::Validation(format!(
            "trade is {}, only open trades can be cancelled",
            trade.status
        )));
    }

    trade_repo::set_status(&mut *tx, id, TradeStatus::Cancelled).await?;
    tx.commit().await?;

    tracing::info!(trade_id = %id, "Trade cancelled");

    let detail = trade_repo::get_detail(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;
    let _ = state.ws_tx.send(WsMessage::TradeCancelled(detail.trade.clone()));

    Ok(ok(detail))
}
