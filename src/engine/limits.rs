//! Trade-frequency and salary-cap accounting. Both figures are governance
//! signals for reviewers ahead of execution; the execution path itself is
//! gated only by the deadline and asset-consistency checks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{league_repo, trade_repo};
use crate::errors::AppError;

/// One participant's standing against the season's trade limit and its
/// salary cap.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantLimit {
    pub team_id: Uuid,
    pub team_name: String,
    pub executed_in_window: i64,
    pub trade_limit: i32,
    pub at_limit: bool,
    pub payroll: Decimal,
    pub salary_cap: Decimal,
    pub over_cap: bool,
}

/// Executed trades for a team inside a window. Reverted trades count:
/// they were executed once.
pub async fn count_executed_trades(
    pool: &PgPool,
    team_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<i64, AppError> {
    Ok(trade_repo::count_executed_in_window(pool, team_id, window_start, window_end).await?)
}

/// Per-participant limit report for a trade, over the trade's season
/// window.
pub async fn check_limits(pool: &PgPool, trade_id: Uuid) -> Result<Vec<ParticipantLimit>, AppError> {
    let trade = trade_repo::get_trade(pool, trade_id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    let season = league_repo::get_season(pool, trade.season_id)
        .await?
        .ok_or_else(|| AppError::NotFound("season not found".into()))?;

    let participants = trade_repo::get_participants(pool, trade_id).await?;

    let mut report = Vec::with_capacity(participants.len());
    for participant in participants {
        let team = league_repo::get_team(pool, participant.team_id)
            .await?
            .ok_or_else(|| AppError::NotFound("team not found".into()))?;

        let executed = trade_repo::count_executed_in_window(
            pool,
            participant.team_id,
            season.starts_at,
            season.ends_at,
        )
        .await?;

        let payroll = league_repo::team_payroll(pool, participant.team_id).await?;

        report.push(ParticipantLimit {
            team_id: team.id,
            team_name: team.name,
            executed_in_window: executed,
            trade_limit: season.trade_limit,
            at_limit: executed >= season.trade_limit as i64,
            payroll,
            salary_cap: team.salary_cap,
            over_cap: payroll > team.salary_cap,
        });
    }

    Ok(report)
}
