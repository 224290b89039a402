pub mod health;
pub mod metrics;
pub mod swaps;
pub mod trades;
pub mod ws;

use crate::api::auth::Caller;
use crate::errors::AppError;
use crate::AppState;

/// Count one mutating request against the caller's throttle window.
/// No-op when no counter store is configured (dev mode).
pub(crate) async fn check_throttle(state: &AppState, caller: &Caller) -> Result<(), AppError> {
    if let Some(throttle) = &state.throttle {
        throttle.check(&caller.user_id.to_string()).await?;
    }
    Ok(())
}
