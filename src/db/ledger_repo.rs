//! Asset ledger: the authoritative mapping of which team owns each player
//! and each draft pick. Ownership moves only through `assign_player` /
//! `assign_pick`, always inside a caller-owned transaction.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{Pick, Player};

/// Fetch a player without locking (proposal-time validation reads).
pub async fn get_player(
    exec: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> sqlx::Result<Option<Player>> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// Fetch a pick without locking.
pub async fn get_pick(exec: impl sqlx::PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Pick>> {
    sqlx::query_as::<_, Pick>("SELECT * FROM picks WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// Fetch a player under a row lock held until the transaction ends.
pub async fn lock_player(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<Player>> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Fetch a pick under a row lock held until the transaction ends.
pub async fn lock_pick(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<Pick>> {
    sqlx::query_as::<_, Pick>("SELECT * FROM picks WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Reassign a player to a new team.
pub async fn assign_player(
    conn: &mut PgConnection,
    player_id: Uuid,
    team_id: Uuid,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE players SET team_id = $2 WHERE id = $1")
        .bind(player_id)
        .bind(team_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Reassign a pick's current owner. `original_team_id` is provenance and
/// is never touched.
pub async fn assign_pick(
    conn: &mut PgConnection,
    pick_id: Uuid,
    team_id: Uuid,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE picks SET current_team_id = $2 WHERE id = $1")
        .bind(pick_id)
        .bind(team_id)
        .execute(conn)
        .await?;

    Ok(())
}
