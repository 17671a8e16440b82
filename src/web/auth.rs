use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::error::{Error, Result};
use crate::store::tokens::TokenIdentity;
use crate::store::types::Role;

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

fn identify(state: &AppState, req: &Request<Body>) -> Result<TokenIdentity> {
    let raw = bearer_token(req).ok_or_else(|| {
        Error::Unauthorized("missing Authorization header, use: Bearer <token>".to_string())
    })?;
    state
        .newsroom
        .store()
        .validate_api_token(raw)?
        .ok_or_else(|| Error::Unauthorized("invalid API token".to_string()))
}

/// Admin namespace: editor tokens only.
pub async fn require_editor(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match identify(&state, &req) {
        Ok(identity) if identity.role == Role::Editor => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Ok(_) => Error::Forbidden("editor role required".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Agent namespace: agent tokens and editor tokens.
pub async fn require_agent_or_editor(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match identify(&state, &req) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// The agent a request acts as. Agent tokens act as their bound agent;
/// editor tokens must name one explicitly.
pub fn acting_agent_id(identity: &TokenIdentity, explicit: Option<&str>) -> Result<String> {
    match identity.role {
        Role::Agent => {
            let bound = identity.agent_id.clone().ok_or_else(|| {
                Error::Forbidden("agent token has no bound agent".to_string())
            })?;
            if let Some(requested) = explicit
                && requested != bound
            {
                return Err(Error::Forbidden(
                    "token is bound to a different agent".to_string(),
                ));
            }
            Ok(bound)
        }
        Role::Editor => explicit.map(str::to_string).ok_or_else(|| {
            Error::Validation("agent_id is required for editor tokens".to_string())
        }),
    }
}
