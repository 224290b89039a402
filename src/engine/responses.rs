//! Per-participant accept/reject tracking. Responses are write-once; a
//! single rejection is terminal for the whole trade, and unanimity moves
//! the trade to `pending`, which makes it eligible for execution.
//! Ownership never changes here.

use metrics::{counter, gauge};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::Caller;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::{ResponseStatus, TradeDetail, TradeStatus};

/// Trade status implied by a newly recorded response, if any.
fn next_status(response: ResponseStatus, pending_remaining: i64) -> Option<TradeStatus> {
    match response {
        ResponseStatus::Rejected => Some(TradeStatus::Rejected),
        ResponseStatus::Accepted if pending_remaining == 0 => Some(TradeStatus::Pending),
        _ => None,
    }
}

pub async fn respond(
    pool: &PgPool,
    caller: &Caller,
    participant_id: Uuid,
    response: ResponseStatus,
) -> Result<TradeDetail, AppError> {
    if response == ResponseStatus::Pending {
        return Err(AppError::Validation(
            "response must be accepted or rejected".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    // First read just locates the trade; the second, under the trade lock,
    // is the one the decision is based on.
    let participant = trade_repo::get_participant(&mut *tx, participant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("participant not found".into()))?;

    let trade = trade_repo::lock_trade(&mut *tx, participant.trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    let participant = trade_repo::get_participant(&mut *tx, participant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("participant not found".into()))?;

    if !caller.is_admin && caller.team_id != Some(participant.team_id) {
        return Err(AppError::Authorization(
            "only the participant team's owner or an administrator can respond".into(),
        ));
    }

    if trade.status != TradeStatus::Proposed {
        return Err(AppError::Validation(format!(
            "trade is {}, responses are closed",
            trade.status
        )));
    }

    if participant.response_status != ResponseStatus::Pending {
        return Err(AppError::Validation(format!(
            "team already responded with {}",
            participant.response_status
        )));
    }

    trade_repo::set_response(&mut *tx, participant_id, response).await?;

    let pending_remaining = trade_repo::count_pending_responses(&mut *tx, trade.id).await?;
    if let Some(status) = next_status(response, pending_remaining) {
        trade_repo::set_status(&mut *tx, trade.id, status).await?;
        if status == TradeStatus::Pending {
            gauge!("pending_trades").increment(1.0);
        }
    }

    tx.commit().await?;

    counter!("responses_recorded").increment(1);
    tracing::info!(
        trade_id = %trade.id,
        participant_id = %participant_id,
        team_id = %participant.team_id,
        response = %response,
        "Trade response recorded"
    );

    trade_repo::get_detail(pool, trade.id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_terminal() {
        assert_eq!(
            next_status(ResponseStatus::Rejected, 3),
            Some(TradeStatus::Rejected)
        );
        assert_eq!(
            next_status(ResponseStatus::Rejected, 0),
            Some(TradeStatus::Rejected)
        );
    }

    #[test]
    fn test_acceptance_waits_for_unanimity() {
        assert_eq!(next_status(ResponseStatus::Accepted, 2), None);
        assert_eq!(
            next_status(ResponseStatus::Accepted, 0),
            Some(TradeStatus::Pending)
        );
    }
}
