//! Trade reversal. The movement log, not the proposal, is authoritative:
//! each movement is undone in reverse order by forcing the asset back to
//! its recorded `from` team. If an asset moved again after execution the
//! reversal still wins (deliberate last-writer-wins policy) and the forced
//! move is surfaced to operators at warn level. History is never deleted;
//! reversal appends inverse movement rows.

use metrics::counter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{ledger_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{AssetKind, TradeDetail, TradeStatus};

pub async fn revert(
    pool: &PgPool,
    trade_id: Uuid,
    reverted_by_user: Uuid,
) -> Result<TradeDetail, AppError> {
    let mut tx = pool.begin().await?;

    let trade = trade_repo::lock_trade(&mut *tx, trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    match trade.status {
        TradeStatus::Executed => {}
        TradeStatus::Reverted => {
            return Err(AppError::Validation(
                "trade has already been reverted".into(),
            ));
        }
        other => {
            return Err(AppError::Validation(format!(
                "trade is {other}, only executed trades can be reverted"
            )));
        }
    }

    let movements = trade_repo::movements_for_trade(&mut *tx, trade_id).await?;

    for movement in movements.iter().rev() {
        let asset_id = movement.asset_id().ok_or_else(|| {
            anyhow::anyhow!("movement {} has no player/pick id", movement.id)
        })?;

        let live_owner = match movement.kind {
            AssetKind::Player => {
                let player = ledger_repo::lock_player(&mut *tx, asset_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Conflict(format!("player {asset_id} no longer exists"))
                    })?;
                player.team_id
            }
            AssetKind::Pick => {
                let pick = ledger_repo::lock_pick(&mut *tx, asset_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Conflict(format!("pick {asset_id} no longer exists"))
                    })?;
                pick.current_team_id
            }
        };

        if live_owner != movement.to_team_id {
            tracing::warn!(
                trade_id = %trade_id,
                kind = %movement.kind,
                asset_id = %asset_id,
                recorded_to = %movement.to_team_id,
                live_owner = %live_owner,
                restored_to = %movement.from_team_id,
                "Asset moved again after execution; forcing it back"
            );
        }

        match movement.kind {
            AssetKind::Player => {
                ledger_repo::assign_player(&mut *tx, asset_id, movement.from_team_id).await?;
            }
            AssetKind::Pick => {
                ledger_repo::assign_pick(&mut *tx, asset_id, movement.from_team_id).await?;
            }
        }

        // Inverse row: from the owner we actually observed, back to the
        // recorded origin.
        trade_repo::insert_movement(
            &mut *tx,
            trade_id,
            movement.kind,
            movement.player_id,
            movement.pick_id,
            live_owner,
            movement.from_team_id,
        )
        .await?;
    }

    trade_repo::mark_reverted(&mut *tx, trade_id, reverted_by_user).await?;

    tx.commit().await?;

    counter!("trades_reverted").increment(1);
    tracing::info!(
        trade_id = %trade_id,
        reverted_by = %reverted_by_user,
        movements = movements.len(),
        "Trade reverted"
    );

    trade_repo::get_detail(pool, trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))
}
