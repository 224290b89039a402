use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Season, Team};

/// Fetch a season by id.
pub async fn get_season(
    exec: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> sqlx::Result<Option<Season>> {
    sqlx::query_as::<_, Season>("SELECT * FROM seasons WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// Fetch a team by id.
pub async fn get_team(exec: impl sqlx::PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Team>> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// How many of the given team ids exist in the given season.
pub async fn count_teams_in_season(
    exec: impl sqlx::PgExecutor<'_>,
    season_id: Uuid,
    team_ids: &[Uuid],
) -> sqlx::Result<i64> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM teams WHERE season_id = $1 AND id = ANY($2)")
            .bind(season_id)
            .bind(team_ids)
            .fetch_one(exec)
            .await?;

    Ok(row.0)
}

/// Sum of player salaries currently on a team's roster.
pub async fn team_payroll(exec: impl sqlx::PgExecutor<'_>, team_id: Uuid) -> sqlx::Result<Decimal> {
    let row: (Decimal,) =
        sqlx::query_as("SELECT COALESCE(SUM(salary), 0) FROM players WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(exec)
            .await?;

    Ok(row.0)
}
