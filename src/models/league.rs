use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::SwapKind;

/// Database row for the seasons table. `trade_limit` is the per-team
/// executed-trade ceiling for the season window; it is a governance
/// signal, not an execution guard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub trade_deadline: DateTime<Utc>,
    pub trade_limit: i32,
}

/// Database row for the teams table. Owned and managed by the roster CRUD
/// outside this service; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub season_id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
    pub salary_cap: Decimal,
}

/// Database row for the players table. `team_id` is the only column the
/// trade engine writes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub salary: Decimal,
    pub team_id: Uuid,
}

/// Database row for the picks table. `current_team_id` is the ownership
/// FK moved by trades; `original_team_id` is permanent provenance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pick {
    pub id: Uuid,
    pub season_id: Uuid,
    pub round: i32,
    pub pick_number: i32,
    pub original_team_id: Uuid,
    pub current_team_id: Uuid,
    pub in_swap: bool,
}

/// A conditional right over two picks, not an asset itself. While a swap
/// exists both underlying picks are frozen (`in_swap`) and cannot enter a
/// trade or another swap.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PickSwap {
    pub id: Uuid,
    pub pick_a_id: Uuid,
    pub pick_b_id: Uuid,
    pub kind: SwapKind,
    pub owner_team_id: Uuid,
    pub created_at: DateTime<Utc>,
}
