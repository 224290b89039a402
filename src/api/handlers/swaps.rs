use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::auth::Caller;
use crate::db::swap_repo;
use crate::errors::AppError;
use crate::models::{PickSwap, SwapKind};
use crate::AppState;

use super::check_throttle;
use super::trades::ApiResponse;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSwapRequest {
    pub pick_a_id: Uuid,
    pub pick_b_id: Uuid,
    pub kind: SwapKind,
    pub owner_team_id: Uuid,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferSwapRequest {
    pub owner_team_id: Uuid,
}

fn ok<T: serde::Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    })
}

/// POST /api/pick-swaps — register a swap right over two picks
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<CreateSwapRequest>,
) -> Result<Json<ApiResponse<PickSwap>>, AppError> {
    caller.require_admin()?;
    check_throttle(&state, &caller).await?;

    let swap = swap_repo::create_swap(
        &state.db,
        body.pick_a_id,
        body.pick_b_id,
        body.kind,
        body.owner_team_id,
    )
    .await?;

    Ok(ok(swap))
}

/// DELETE /api/pick-swaps/{id} — delete a swap and thaw its picks
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    caller.require_admin()?;

    swap_repo::delete_swap(&state.db, id).await?;

    Ok(ok(()))
}

/// PATCH /api/pick-swaps/{id}/owner — transfer the right, picks stay put
pub async fn transfer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<TransferSwapRequest>,
) -> Result<Json<ApiResponse<PickSwap>>, AppError> {
    caller.require_admin()?;

    let swap = swap_repo::transfer_ownership(&state.db, id, body.owner_team_id).await?;

    Ok(ok(swap))
}
