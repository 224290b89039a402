use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Trades
        .route("/api/trades", get(handlers::trades::list).post(handlers::trades::create))
        .route("/api/trades/counts", get(handlers::trades::counts))
        .route("/api/trades/my-trades", get(handlers::trades::my_trades))
        .route("/api/trades/team/:team_id", get(handlers::trades::team_trades))
        .route(
            "/api/trades/reject-pending-after-deadline",
            post(handlers::trades::reject_pending_after_deadline),
        )
        .route("/api/trades/participants/:id", patch(handlers::trades::respond))
        .route("/api/trades/:id", get(handlers::trades::detail))
        .route("/api/trades/:id/trade-limits", get(handlers::trades::trade_limits))
        .route("/api/trades/:id/execute", post(handlers::trades::execute))
        .route("/api/trades/:id/revert", post(handlers::trades::revert))
        .route("/api/trades/:id/made", patch(handlers::trades::set_made))
        .route("/api/trades/:id/cancel", delete(handlers::trades::cancel))
        // Pick swaps
        .route("/api/pick-swaps", post(handlers::swaps::create))
        .route("/api/pick-swaps/:id", delete(handlers::swaps::delete))
        .route("/api/pick-swaps/:id/owner", patch(handlers::swaps::transfer))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn(require_auth));

    // CORS: allow same-origin + common dashboard origins
    let cors = CorsLayer::new()
        .allow_origin(Any) // nginx proxies from same origin; direct API access needs token
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
