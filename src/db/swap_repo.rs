//! Pick-swap registry: conditional rights over pairs of picks. Creating a
//! swap freezes both underlying picks (`in_swap`); deleting it thaws them.
//! Transferring the right is a pure metadata update; the picks themselves
//! do not move. Resolution of the right happens outside this service.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::ledger_repo;
use crate::errors::AppError;
use crate::models::{PickSwap, SwapKind};

pub async fn get_swap(exec: impl sqlx::PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<PickSwap>> {
    sqlx::query_as::<_, PickSwap>("SELECT * FROM pick_swaps WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// Register a swap right over two picks. Fails if either pick is already
/// inside a swap or an open trade, or if the owner team holds neither pick.
pub async fn create_swap(
    pool: &PgPool,
    pick_a_id: Uuid,
    pick_b_id: Uuid,
    kind: SwapKind,
    owner_team_id: Uuid,
) -> Result<PickSwap, AppError> {
    if pick_a_id == pick_b_id {
        return Err(AppError::Validation("a swap needs two distinct picks".into()));
    }

    let mut tx = pool.begin().await?;

    // Lock both picks in a stable order so concurrent swap creations
    // serialize instead of deadlocking.
    let (first, second) = if pick_a_id < pick_b_id {
        (pick_a_id, pick_b_id)
    } else {
        (pick_b_id, pick_a_id)
    };
    let lock_first = ledger_repo::lock_pick(&mut *tx, first)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("pick {first} not found")))?;
    let lock_second = ledger_repo::lock_pick(&mut *tx, second)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("pick {second} not found")))?;
    let (pick_a, pick_b) = if pick_a_id < pick_b_id {
        (lock_first, lock_second)
    } else {
        (lock_second, lock_first)
    };

    for pick in [&pick_a, &pick_b] {
        if pick.in_swap {
            return Err(AppError::Validation(format!(
                "pick {} is already part of a swap",
                pick.id
            )));
        }
        let in_trade = crate::db::trade_repo::asset_in_open_trade(
            &mut *tx,
            crate::models::AssetKind::Pick,
            pick.id,
        )
        .await?;
        if in_trade {
            return Err(AppError::Validation(format!(
                "pick {} is part of an open trade",
                pick.id
            )));
        }
    }

    if pick_a.current_team_id != owner_team_id && pick_b.current_team_id != owner_team_id {
        return Err(AppError::Validation(
            "swap owner must currently hold at least one of the two picks".into(),
        ));
    }

    let swap = sqlx::query_as::<_, PickSwap>(
        r#"
        INSERT INTO pick_swaps (pick_a_id, pick_b_id, kind, owner_team_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(pick_a_id)
    .bind(pick_b_id)
    .bind(kind)
    .bind(owner_team_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE picks SET in_swap = TRUE WHERE id = $1 OR id = $2")
        .bind(pick_a_id)
        .bind(pick_b_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        swap_id = %swap.id,
        pick_a = %pick_a_id,
        pick_b = %pick_b_id,
        kind = %kind,
        owner = %owner_team_id,
        "Pick swap registered"
    );

    Ok(swap)
}

/// Delete a swap and thaw both underlying picks.
pub async fn delete_swap(pool: &PgPool, swap_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let swap = get_swap(&mut *tx, swap_id)
        .await?
        .ok_or_else(|| AppError::NotFound("swap not found".into()))?;

    sqlx::query("UPDATE picks SET in_swap = FALSE WHERE id = $1 OR id = $2")
        .bind(swap.pick_a_id)
        .bind(swap.pick_b_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM pick_swaps WHERE id = $1")
        .bind(swap_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(swap_id = %swap_id, "Pick swap deleted");

    Ok(())
}

/// Move the swap right to another team. Metadata only.
pub async fn transfer_ownership(
    pool: &PgPool,
    swap_id: Uuid,
    new_owner_team_id: Uuid,
) -> Result<PickSwap, AppError> {
    let swap = sqlx::query_as::<_, PickSwap>(
        "UPDATE pick_swaps SET owner_team_id = $2 WHERE id = $1 RETURNING *",
    )
    .bind(swap_id)
    .bind(new_owner_team_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("swap not found".into()))?;

    tracing::info!(swap_id = %swap_id, new_owner = %new_owner_team_id, "Swap right transferred");

    Ok(swap)
}
