//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use kernel::id::SessionId;
use platform::clock::Clock;
use platform::cookie::SessionCookie;

use crate::application::check_attempt::AttemptThrottle;
use crate::application::config::ThrottleConfig;
use crate::domain::repository::AttemptStateRepository;
use crate::domain::value_objects::Identity;
use crate::error::ThrottleResult;
use crate::presentation::dto::CheckAttemptResponse;

/// Shared state for throttle handlers and the guard middleware
#[derive(Clone)]
pub struct ThrottleAppState<R>
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
{
    pub throttle: AttemptThrottle<R>,
    pub cookie: Arc<SessionCookie>,
}

impl<R> ThrottleAppState<R>
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, clock: Arc<dyn Clock>, config: &ThrottleConfig) -> ThrottleResult<Self> {
        Ok(Self {
            throttle: AttemptThrottle::new(Arc::new(repo), clock, config)?,
            cookie: Arc::new(config.session_cookie()),
        })
    }
}

/// Identity of the calling browser session
pub struct ResolvedSession {
    pub identity: Identity,
    /// Set-Cookie for a freshly minted session
    set_cookie: Option<HeaderValue>,
}

impl ResolvedSession {
    pub fn is_new(&self) -> bool {
        self.set_cookie.is_some()
    }

    /// Hand a freshly minted session id to the client
    pub fn attach_cookie(&self, response: &mut Response) {
        if let Some(cookie) = &self.set_cookie {
            response
                .headers_mut()
                .append(header::SET_COOKIE, cookie.clone());
        }
    }
}

/// Read the session id from its cookie, minting a new one when missing or malformed
pub fn resolve_session(headers: &HeaderMap, cookie: &SessionCookie) -> ResolvedSession {
    let existing = cookie
        .read(headers)
        .and_then(|value| SessionId::parse(&value))
        .map(Identity::from);

    if let Some(identity) = existing {
        return ResolvedSession {
            identity,
            set_cookie: None,
        };
    }

    let session_id = SessionId::new();
    let identity = Identity::from(session_id);
    tracing::debug!(identity = %identity.redacted(), "Minted throttle session");

    ResolvedSession {
        set_cookie: cookie.header_value(identity.as_str()),
        identity,
    }
}

/// POST /api/throttle/check
pub async fn check_attempt<R>(
    State(state): State<ThrottleAppState<R>>,
    headers: HeaderMap,
) -> ThrottleResult<Response>
where
    R: AttemptStateRepository + Clone + Send + Sync + 'static,
{
    let session = resolve_session(&headers, &state.cookie);

    let verdict = state
        .throttle
        .check_attempt_verdict(&session.identity)
        .await?;

    let body = CheckAttemptResponse {
        allowed: verdict.allowed,
        attempt_count: verdict.state.attempt_count,
        max_attempts: state.throttle.policy().max_attempts(),
        retry_after_secs: (!verdict.allowed).then_some(verdict.retry_after_secs),
    };

    let mut response = Json(body).into_response();
    session.attach_cookie(&mut response);
    Ok(response)
}
