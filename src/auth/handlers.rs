use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, ChangePasswordRequest, LoginRequest, PublicUser, RegisterRequest},
        identity::{expired_cookie, session_cookie, Identity, IdentityContext},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(register))
        .route("/user/signin", post(login))
        .route("/user/logout", get(logout))
        .route("/user/password", post(change_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let user = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = services::authenticate(&state, &payload.email, &payload.password).await?;
    let token = services::issue_session(&state, &user)?;
    let cookie = session_cookie(&state.config.cookie_name, &token);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, expired_cookie(&state.config.cookie_name))],
        Redirect::to("/"),
    )
}

#[instrument(skip(state, identity, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    services::change_password(
        &state,
        &identity,
        &payload.current_password,
        payload.new_password,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_me(identity: Identity) -> Result<Json<IdentityContext>, AppError> {
    Ok(Json(identity.require()?.clone()))
}
