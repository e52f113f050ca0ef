use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::COOKIE, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::TokenService, repo_types::Role},
    error::AppError,
    state::AppState,
};

/// Decoded session payload, valid for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub full_name: String,
}

/// Who is making the request. An invalid token yields `Anonymous`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(IdentityContext),
}

impl Identity {
    pub fn context(&self) -> Option<&IdentityContext> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(ctx) => Some(ctx),
        }
    }

    pub fn require(&self) -> Result<&IdentityContext, AppError> {
        self.context().ok_or(AppError::AuthRequired)
    }
}

/// Resolves the identity for one request from its cookie header.
pub fn resolve_identity(tokens: &TokenService, cookie_name: &str, headers: &HeaderMap) -> Identity {
    let Some(token) = read_cookie(headers, cookie_name) else {
        return Identity::Anonymous;
    };
    match tokens.validate(token) {
        Ok(ctx) => Identity::Authenticated(ctx),
        Err(e) => {
            // cookie is left in place
            warn!(error = %e, cookie = cookie_name, "ignoring invalid session cookie");
            Identity::Anonymous
        }
    }
}

/// Middleware attaching an [`Identity`] to every request. Never rejects.
pub async fn identify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = resolve_identity(&state.tokens, &state.config.cookie_name, req.headers());
    if let Some(ctx) = identity.context() {
        debug!(user_id = %ctx.user_id, "request authenticated");
    }
    req.extensions_mut().insert(identity);
    next.run(req).await
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(name: &str, token: &str) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
