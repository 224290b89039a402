//! Atomic trade execution. One transaction covers the whole unit of work:
//! lock the trade row, lock every referenced asset in (kind, id) order,
//! re-validate live ownership against the contributing participants, write
//! the movement log, reassign ownership, and stamp the trade executed.
//! Any failure rolls the entire transaction back; no partial state is ever
//! visible to other operations.

use std::collections::HashMap;

use metrics::{counter, gauge};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{ledger_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{AssetKind, TradeDetail, TradeStatus};

pub async fn execute(pool: &PgPool, trade_id: Uuid) -> Result<TradeDetail, AppError> {
    let mut tx = pool.begin().await?;

    let trade = trade_repo::lock_trade(&mut *tx, trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    match trade.status {
        TradeStatus::Pending => {}
        TradeStatus::Executed | TradeStatus::Reverted => {
            return Err(AppError::Validation(
                "trade has already been executed".into(),
            ));
        }
        other => {
            return Err(AppError::Validation(format!(
                "trade is {other}, only fully accepted trades can be executed"
            )));
        }
    }

    let participants = trade_repo::get_participants(&mut *tx, trade_id).await?;
    let contributor_of: HashMap<Uuid, Uuid> =
        participants.iter().map(|p| (p.id, p.team_id)).collect();

    let mut assets = trade_repo::get_assets(&mut *tx, trade_id).await?;
    assets.sort_by_key(|a| (a.kind, a.asset_id().unwrap_or_default()));

    // Step 1: lock every asset and re-validate ownership against the
    // contributing participant. Waivers or other trades may have moved an
    // asset since the proposal; any mismatch aborts with zero side effects.
    let mut observed_owner: Vec<Uuid> = Vec::with_capacity(assets.len());
    for asset in &assets {
        let asset_id = asset
            .asset_id()
            .ok_or_else(|| anyhow::anyhow!("trade asset {} has no player/pick id", asset.id))?;
        let contributor = contributor_of
            .get(&asset.participant_id)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("trade asset {} has no participant", asset.id))?;

        let live_owner = match asset.kind {
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
                if pick.in_swap {
                    counter!("trade_conflicts").increment(1);
                    return Err(AppError::Conflict(format!(
                        "pick {asset_id} entered a swap after the proposal"
                    )));
                }
                pick.current_team_id
            }
        };

        if live_owner != contributor {
            counter!("trade_conflicts").increment(1);
            return Err(AppError::Conflict(format!(
                "{} {} is owned by team {} now, not by the contributing team {}",
                asset.kind, asset_id, live_owner, contributor
            )));
        }

        observed_owner.push(live_owner);
    }

    // Steps 2+3: movement log first, then the ownership writes. `from` is
    // the owner observed under lock, not the proposal's contributor.
    for (asset, from_team) in assets.iter().zip(&observed_owner) {
        trade_repo::insert_movement(
            &mut *tx,
            trade_id,
            asset.kind,
            asset.player_id,
            asset.pick_id,
            *from_team,
            asset.to_team_id,
        )
        .await?;

        match asset.kind {
            AssetKind::Player => {
                if let Some(player_id) = asset.player_id {
                    ledger_repo::assign_player(&mut *tx, player_id, asset.to_team_id).await?;
                }
            }
            AssetKind::Pick => {
                if let Some(pick_id) = asset.pick_id {
                    ledger_repo::assign_pick(&mut *tx, pick_id, asset.to_team_id).await?;
                }
            }
        }
    }

    // Step 4: stamp the trade.
    trade_repo::mark_executed(&mut *tx, trade_id).await?;

    tx.commit().await?;

    counter!("trades_executed").increment(1);
    gauge!("pending_trades").decrement(1.0);
    tracing::info!(
        trade_id = %trade_id,
        assets = assets.len(),
        "Trade executed"
    );

    trade_repo::get_detail(pool, trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))
}
