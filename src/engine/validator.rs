//! Proposal validation. Everything is checked against a single transaction
//! snapshot, with row locks on the referenced assets so two concurrent
//! proposals cannot both claim the same player or pick. On success the
//! trade, its participants, and its assets are persisted together; no
//! ownership changes until execution.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::Caller;
use crate::db::{ledger_repo, league_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{AssetKind, ResponseStatus, TradeDetail};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProposeTradeRequest {
    pub season_id: Uuid,
    pub created_by_team_id: Uuid,
    pub participants: Vec<ParticipantRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticipantRequest {
    pub team_id: Uuid,
    pub assets: Vec<AssetRequest>,
}

/// Tagged asset variant. Unknown shapes are rejected at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum AssetRequest {
    Player {
        player_id: Uuid,
        #[serde(default)]
        to_team_id: Option<Uuid>,
    },
    Pick {
        pick_id: Uuid,
        #[serde(default)]
        to_team_id: Option<Uuid>,
    },
}

impl AssetRequest {
    fn kind(&self) -> AssetKind {
        match self {
            AssetRequest::Player { .. } => AssetKind::Player,
            AssetRequest::Pick { .. } => AssetKind::Pick,
        }
    }

    fn asset_id(&self) -> Uuid {
        match self {
            AssetRequest::Player { player_id, .. } => *player_id,
            AssetRequest::Pick { pick_id, .. } => *pick_id,
        }
    }

    fn explicit_destination(&self) -> Option<Uuid> {
        match self {
            AssetRequest::Player { to_team_id, .. } | AssetRequest::Pick { to_team_id, .. } => {
                *to_team_id
            }
        }
    }
}

/// An asset with its contributing team and resolved destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedAsset {
    contributor: Uuid,
    kind: AssetKind,
    asset_id: Uuid,
    to_team: Uuid,
}

// ---------------------------------------------------------------------------
// Pure shape checks
// ---------------------------------------------------------------------------

/// Validate the proposal's shape and resolve every asset's destination.
/// Returns the assets sorted by (kind, id), the lock order used everywhere
/// an engine touches multiple assets.
fn resolve_assets(req: &ProposeTradeRequest) -> Result<Vec<ResolvedAsset>, AppError> {
    if req.participants.len() < 2 {
        return Err(AppError::Validation(
            "a trade needs at least two participating teams".into(),
        ));
    }

    let team_ids: Vec<Uuid> = req.participants.iter().map(|p| p.team_id).collect();
    let distinct: HashSet<Uuid> = team_ids.iter().copied().collect();
    if distinct.len() != team_ids.len() {
        return Err(AppError::Validation(
            "each team may appear in a trade only once".into(),
        ));
    }
    if !distinct.contains(&req.created_by_team_id) {
        return Err(AppError::Validation(
            "the creating team must be a trade participant".into(),
        ));
    }

    let mut seen: HashSet<(AssetKind, Uuid)> = HashSet::new();
    let mut resolved = Vec::new();

    for participant in &req.participants {
        if participant.assets.is_empty() {
            return Err(AppError::Validation(format!(
                "team {} contributes no assets",
                participant.team_id
            )));
        }

        for asset in &participant.assets {
            if !seen.insert((asset.kind(), asset.asset_id())) {
                return Err(AppError::Validation(format!(
                    "{} {} appears in the trade more than once",
                    asset.kind(),
                    asset.asset_id()
                )));
            }

            let to_team = resolve_destination(
                participant.team_id,
                asset.explicit_destination(),
                &team_ids,
            )?;

            resolved.push(ResolvedAsset {
                contributor: participant.team_id,
                kind: asset.kind(),
                asset_id: asset.asset_id(),
                to_team,
            });
        }
    }

    resolved.sort_by_key(|a| (a.kind, a.asset_id));
    Ok(resolved)
}

/// Explicit destinations must name another participant; an omitted
/// destination means "the other team" and is only well-defined in a
/// two-team trade.
fn resolve_destination(
    contributor: Uuid,
    explicit: Option<Uuid>,
    team_ids: &[Uuid],
) -> Result<Uuid, AppError> {
    match explicit {
        Some(to) if to == contributor => Err(AppError::Validation(
            "an asset cannot be sent to the team contributing it".into(),
        )),
        Some(to) if !team_ids.contains(&to) => Err(AppError::Validation(format!(
            "destination team {to} is not a trade participant"
        ))),
        Some(to) => Ok(to),
        None => {
            if team_ids.len() == 2 {
                team_ids
                    .iter()
                    .copied()
                    .find(|t| *t != contributor)
                    .ok_or_else(|| {
                        AppError::Validation("could not infer destination team".into())
                    })
            } else {
                Err(AppError::Validation(
                    "destination team is required in a multi-team trade".into(),
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

pub async fn propose(
    pool: &PgPool,
    caller: &Caller,
    req: &ProposeTradeRequest,
) -> Result<TradeDetail, AppError> {
    let resolved = resolve_assets(req)?;

    if !caller.is_admin && caller.team_id != Some(req.created_by_team_id) {
        return Err(AppError::Authorization(
            "only the initiating team's owner or an administrator can propose a trade".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let season = league_repo::get_season(&mut *tx, req.season_id)
        .await?
        .ok_or_else(|| AppError::NotFound("season not found".into()))?;

    if Utc::now() >= season.trade_deadline {
        return Err(AppError::Validation("trade deadline has passed".into()));
    }

    let team_ids: Vec<Uuid> = req.participants.iter().map(|p| p.team_id).collect();
    let found = league_repo::count_teams_in_season(&mut *tx, req.season_id, &team_ids).await?;
    if found != team_ids.len() as i64 {
        return Err(AppError::Validation(
            "one or more teams do not exist in this season".into(),
        ));
    }

    // Lock and check each asset in (kind, id) order.
    for asset in &resolved {
        match asset.kind {
            AssetKind::Player => {
                let player = ledger_repo::lock_player(&mut *tx, asset.asset_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("player {} not found", asset.asset_id))
                    })?;
                if player.team_id != asset.contributor {
                    return Err(AppError::Validation(format!(
                        "player {} is not on team {}",
                        asset.asset_id, asset.contributor
                    )));
                }
            }
            AssetKind::Pick => {
                let pick = ledger_repo::lock_pick(&mut *tx, asset.asset_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("pick {} not found", asset.asset_id))
                    })?;
                if pick.current_team_id != asset.contributor {
                    return Err(AppError::Validation(format!(
                        "pick {} is not owned by team {}",
                        asset.asset_id, asset.contributor
                    )));
                }
                if pick.in_swap {
                    return Err(AppError::Validation(format!(
                        "pick {} is locked inside an active swap",
                        asset.asset_id
                    )));
                }
            }
        }

        if trade_repo::asset_in_open_trade(&mut *tx, asset.kind, asset.asset_id).await? {
            return Err(AppError::Validation(format!(
                "{} {} is already part of an open trade",
                asset.kind, asset.asset_id
            )));
        }
    }

    // Persist the trade, its participants, and its assets together.
    let trade = trade_repo::insert_trade(&mut *tx, req.season_id, req.created_by_team_id).await?;

    let mut participant_ids: HashMap<Uuid, Uuid> = HashMap::new();
    for participant in &req.participants {
        let is_initiator = participant.team_id == req.created_by_team_id;
        let response = if is_initiator {
            ResponseStatus::Accepted
        } else {
            ResponseStatus::Pending
        };
        let row = trade_repo::insert_participant(
            &mut *tx,
            trade.id,
            participant.team_id,
            is_initiator,
            response,
        )
        .await?;
        participant_ids.insert(participant.team_id, row.id);
    }

    for asset in &resolved {
        let participant_id = participant_ids
            .get(&asset.contributor)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("missing participant row for {}", asset.contributor))?;
        let (player_id, pick_id) = match asset.kind {
            AssetKind::Player => (Some(asset.asset_id), None),
            AssetKind::Pick => (None, Some(asset.asset_id)),
        };
        trade_repo::insert_asset(
            &mut *tx,
            trade.id,
            participant_id,
            asset.kind,
            player_id,
            pick_id,
            asset.to_team,
        )
        .await?;
    }

    tx.commit().await?;

    counter!("trades_proposed").increment(1);
    tracing::info!(
        trade_id = %trade.id,
        season_id = %req.season_id,
        teams = team_ids.len(),
        assets = resolved.len(),
        "Trade proposed"
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

    fn player_asset(id: Uuid, to: Option<Uuid>) -> AssetRequest {
        AssetRequest::Player {
            player_id: id,
            to_team_id: to,
        }
    }

    fn two_team_request(team_a: Uuid, team_b: Uuid) -> ProposeTradeRequest {
        ProposeTradeRequest {
            season_id: Uuid::new_v4(),
            created_by_team_id: team_a,
            participants: vec![
                ParticipantRequest {
                    team_id: team_a,
                    assets: vec![player_asset(Uuid::new_v4(), None)],
                },
                ParticipantRequest {
                    team_id: team_b,
                    assets: vec![player_asset(Uuid::new_v4(), None)],
                },
            ],
        }
    }

    #[test]
    fn test_two_team_destination_inferred() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolved = resolve_assets(&two_team_request(a, b)).unwrap();
        assert_eq!(resolved.len(), 2);
        for asset in resolved {
            assert_ne!(asset.contributor, asset.to_team);
            assert!(asset.to_team == a || asset.to_team == b);
        }
    }

    #[test]
    fn test_single_participant_rejected() {
        let a = Uuid::new_v4();
        let req = ProposeTradeRequest {
            season_id: Uuid::new_v4(),
            created_by_team_id: a,
            participants: vec![ParticipantRequest {
                team_id: a,
                assets: vec![player_asset(Uuid::new_v4(), None)],
            }],
        };
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let a = Uuid::new_v4();
        let mut req = two_team_request(a, Uuid::new_v4());
        req.participants[1].team_id = a;
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_creator_must_participate() {
        let mut req = two_team_request(Uuid::new_v4(), Uuid::new_v4());
        req.created_by_team_id = Uuid::new_v4();
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_asset_list_rejected() {
        let mut req = two_team_request(Uuid::new_v4(), Uuid::new_v4());
        req.participants[0].assets.clear();
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let mut req = two_team_request(Uuid::new_v4(), Uuid::new_v4());
        let dup = req.participants[0].assets[0].clone();
        req.participants[0].assets.push(dup);
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_multi_team_requires_explicit_destination() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let req = ProposeTradeRequest {
            season_id: Uuid::new_v4(),
            created_by_team_id: a,
            participants: vec![
                ParticipantRequest {
                    team_id: a,
                    assets: vec![player_asset(Uuid::new_v4(), None)],
                },
                ParticipantRequest {
                    team_id: b,
                    assets: vec![player_asset(Uuid::new_v4(), Some(c))],
                },
                ParticipantRequest {
                    team_id: c,
                    assets: vec![player_asset(Uuid::new_v4(), Some(a))],
                },
            ],
        };
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_destination_must_be_participant() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut req = two_team_request(a, b);
        req.participants[0].assets = vec![player_asset(Uuid::new_v4(), Some(Uuid::new_v4()))];
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_destination_cannot_be_contributor() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut req = two_team_request(a, b);
        req.participants[0].assets = vec![player_asset(Uuid::new_v4(), Some(a))];
        assert!(matches!(
            resolve_assets(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_asset_shape_rejected() {
        let raw = serde_json::json!({
            "kind": "mascot",
            "mascot_id": "7b7f7c1e-0000-0000-0000-000000000000"
        });
        assert!(serde_json::from_value::<AssetRequest>(raw).is_err());

        let extra_field = serde_json::json!({
            "kind": "player",
            "player_id": "7b7f7c1e-0000-0000-0000-000000000000",
            "salary_retained": 100
        });
        assert!(serde_json::from_value::<AssetRequest>(extra_field).is_err());
    }
}
