use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::errors::AppError;

/// Bearer-token authentication middleware.
///
/// If `API_TOKEN` is set, every request must carry
/// `Authorization: Bearer <token>` matching that value.
/// If `API_TOKEN` is empty / unset, authentication is disabled (dev mode).
pub async fn require_auth(req: Request, next: Next) -> Response {
    let expected = std::env::var("API_TOKEN").unwrap_or_default();

    // No token configured → auth disabled (dev / legacy mode)
    if expected.is_empty() {
        return next.run(req).await;
    }

    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) if value.starts_with("Bearer ") => {
            let token = &value[7..];
            if token == expected {
                next.run(req).await
            } else {
                (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
            }
        }
        _ => (StatusCode::UNAUTHORIZED, "Missing or invalid Authorization header").into_response(),
    }
}

/// Caller identity asserted by the upstream auth gateway. The gateway
/// authenticates users and forwards who they are; this service only
/// decides what that identity may do to a trade.
///
/// Headers: `x-user-id` (required), `x-team-id` (the team the user owns,
/// if any), `x-admin` (`true`/`1` for league administrators).
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
    pub is_admin: bool,
}

impl Caller {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "administrator privileges required".into(),
            ))
        }
    }

    /// Whether the caller may act for the given team.
    pub fn owns_team(&self, team_id: Uuid) -> bool {
        self.is_admin || self.team_id == Some(team_id)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let user_id = header("x-user-id")
            .ok_or_else(|| AppError::Authorization("missing x-user-id header".into()))?;
        let user_id = Uuid::parse_str(&user_id)
            .map_err(|_| AppError::Authorization("invalid x-user-id header".into()))?;

        let team_id = match header("x-team-id") {
            Some(raw) => Some(
                Uuid::parse_str(&raw)
                    .map_err(|_| AppError::Authorization("invalid x-team-id header".into()))?,
            ),
            None => None,
        };

        let is_admin = header("x-admin")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Caller {
            user_id,
            team_id,
            is_admin,
        })
    }
}
