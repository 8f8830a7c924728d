use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use postboard_auth::{AccessGuard, GateOutcome, Role};

use crate::app::errors::rejection_to_response;
use crate::context::IdentityContext;

#[derive(Clone)]
pub struct AuthState {
    pub guard: AccessGuard,
}

/// Routes whose gate also requires one of a fixed set of roles.
#[derive(Clone)]
pub struct RoleState {
    pub guard: AccessGuard,
    pub allowed: &'static [Role],
}

/// `authenticate` gate: a valid bearer token, or 401 before any handler runs.
pub async fn auth_middleware(State(state): State<AuthState>, req: Request, next: Next) -> Response {
    run_gate(&state.guard, None, req, next).await
}

/// `authorize(allowed)` gate: 401 for a bad token, 403 for a role outside `allowed`.
pub async fn role_middleware(State(state): State<RoleState>, req: Request, next: Next) -> Response {
    run_gate(&state.guard, Some(state.allowed), req, next).await
}

async fn run_gate(guard: &AccessGuard, allowed: Option<&[Role]>, mut req: Request, next: Next) -> Response {
    let outcome = guard.gate(extract_bearer(req.headers()), allowed, Utc::now());
    match outcome {
        GateOutcome::Proceed(identity) => {
            req.extensions_mut().insert(IdentityContext::new(identity));
            next.run(req).await
        }
        GateOutcome::Reject(rejection) => rejection_to_response(rejection),
    }
}

/// `None` for an absent, non-UTF-8, non-Bearer or empty Authorization header.
///
/// The scheme name is matched case-insensitively.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
