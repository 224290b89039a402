pub mod league;
pub mod trade;

pub use league::{Pick, PickSwap, Player, Season, Team};
pub use trade::{Trade, TradeAsset, TradeAssetMovement, TradeDetail, TradeParticipant};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TradeStatus
// ---------------------------------------------------------------------------

/// Trade state machine:
/// `proposed -> pending -> executed -> reverted`, with `rejected` and
/// `cancelled` terminal from the proposed/pending side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TradeStatus {
    Proposed,
    Pending,
    Executed,
    Rejected,
    Cancelled,
    Reverted,
}

impl TradeStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TradeStatus::Rejected | TradeStatus::Cancelled | TradeStatus::Reverted
        )
    }

    /// Open trades hold claims on their assets: no other open trade or
    /// active swap may reference them.
    pub fn is_open(self) -> bool {
        matches!(self, TradeStatus::Proposed | TradeStatus::Pending)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeStatus::Proposed => "proposed",
            TradeStatus::Pending => "pending",
            TradeStatus::Executed => "executed",
            TradeStatus::Rejected => "rejected",
            TradeStatus::Cancelled => "cancelled",
            TradeStatus::Reverted => "reverted",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// ResponseStatus
// ---------------------------------------------------------------------------

/// Per-participant answer to a proposal. Write-once: pending -> accepted
/// or pending -> rejected, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ResponseStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseStatus::Pending => "pending",
            ResponseStatus::Accepted => "accepted",
            ResponseStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// AssetKind
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssetKind {
    Player,
    Pick,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Player => write!(f, "player"),
            AssetKind::Pick => write!(f, "pick"),
        }
    }
}

// ---------------------------------------------------------------------------
// SwapKind
// ---------------------------------------------------------------------------

/// What the holder of a pick-swap right gets to do once both picks land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SwapKind {
    TakeBetter,
    TakeWorse,
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapKind::TakeBetter => write!(f, "take_better"),
            SwapKind::TakeWorse => write!(f, "take_worse"),
        }
    }
}
