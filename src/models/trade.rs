use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{AssetKind, ResponseStatus, TradeStatus};

/// Database row for the trades table.
///
/// `executed_at` is set iff status is executed/reverted; `reverted_at` and
/// `reverted_by_user` only once the trade has been rolled back. `settled`
/// is administrative bookkeeping and never consulted by the state machine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub season_id: Uuid,
    pub status: TradeStatus,
    pub created_by_team_id: Uuid,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub reverted_at: Option<DateTime<Utc>>,
    pub reverted_by_user: Option<Uuid>,
}

/// One team's membership in a trade, carrying its accept/reject answer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeParticipant {
    pub id: Uuid,
    pub trade_id: Uuid,
    pub team_id: Uuid,
    pub is_initiator: bool,
    pub response_status: ResponseStatus,
    pub responded_at: Option<DateTime<Utc>>,
}

/// One item a participant contributes. Exactly one of `player_id` /
/// `pick_id` is set, matching `kind`. `to_team_id` is resolved at proposal
/// time (inferred as "the other team" in a two-team trade).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeAsset {
    pub id: Uuid,
    pub trade_id: Uuid,
    pub participant_id: Uuid,
    pub kind: AssetKind,
    pub player_id: Option<Uuid>,
    pub pick_id: Option<Uuid>,
    pub to_team_id: Uuid,
}

impl TradeAsset {
    /// The player or pick id, whichever this asset carries. The table CHECK
    /// guarantees exactly one is set for the matching kind.
    pub fn asset_id(&self) -> Option<Uuid> {
        match self.kind {
            AssetKind::Player => self.player_id,
            AssetKind::Pick => self.pick_id,
        }
    }
}

/// Append-only log entry written at execution time. `from_team_id` is the
/// owner observed under lock, which is authoritative for reversal even when
/// it differs from the originally proposed contributor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeAssetMovement {
    pub id: Uuid,
    pub seq: i64,
    pub trade_id: Uuid,
    pub kind: AssetKind,
    pub player_id: Option<Uuid>,
    pub pick_id: Option<Uuid>,
    pub from_team_id: Uuid,
    pub to_team_id: Uuid,
    pub moved_at: DateTime<Utc>,
}

impl TradeAssetMovement {
    /// The player or pick id, whichever this movement records.
    pub fn asset_id(&self) -> Option<Uuid> {
        match self.kind {
            AssetKind::Player => self.player_id,
            AssetKind::Pick => self.pick_id,
        }
    }
}

/// Full trade view returned by the API: the trade row plus its
/// participants and assets.
#[derive(Debug, Clone, Serialize)]
pub struct TradeDetail {
    #[serde(flatten)]
    pub trade: Trade,
    pub participants: Vec<TradeParticipant>,
    pub assets: Vec<TradeAsset>,
}
