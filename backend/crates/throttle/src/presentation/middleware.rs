//! Throttle Middleware
//!
//! Guard for sensitive routes (login, password recovery). Every request
//! through the guard counts as one attempt of the caller's session.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::domain::repository::AttemptStateRepository;
use crate::error::ThrottleError;
use crate::presentation::handlers::{ThrottleAppState, resolve_session};

/// Refuse the request with 429 once the session ran out of attempts
///
/// Allowed requests carry the session's `Identity` as a request extension,
/// so the guarded handler can `reset` it after a successful login.
/// A state store failure yields a 5xx, never a 429.
///
/// ```ignore
/// let login = Router::new()
///     .route("/login", post(login))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         require_attempt_allowance::<MemoryAttemptStore>,
///     ));
/// ```
pub async fn require_attempt_allowance<R>(
    State(state): State<ThrottleAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
{
    let session = resolve_session(req.headers(), &state.cookie);

    let verdict = match state
        .throttle
        .check_attempt_verdict(&session.identity)
        .await
    {
        Ok(verdict) => verdict,
        Err(e) => return e.into_response(),
    };

    let mut response = if verdict.allowed {
        req.extensions_mut().insert(session.identity.clone());
        next.run(req).await
    } else {
        ThrottleError::TooManyAttempts {
            retry_after_secs: verdict.retry_after_secs,
        }
        .into_response()
    };

    session.attach_cookie(&mut response);
    response
}
