//! Throttle Router

use axum::{Router, middleware, routing::post};

use crate::domain::repository::AttemptStateRepository;
use crate::presentation::handlers::{self, ThrottleAppState};
use crate::presentation::middleware::require_attempt_allowance;

/// Routes under `/api/throttle`
pub fn throttle_router<R>(state: ThrottleAppState<R>) -> Router
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/check", post(handlers::check_attempt::<R>))
        .with_state(state)
}

/// Put every route of `routes` behind the attempt guard
///
/// Uses `route_layer`, so unmatched paths still 404 without spending an attempt.
pub fn guarded<R, S>(routes: Router<S>, state: ThrottleAppState<R>) -> Router<S>
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    routes.route_layer(middleware::from_fn_with_state(
        state,
        require_attempt_allowance::<R>,
    ))
}
