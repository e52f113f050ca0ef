use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::identity::Identity,
    comments::{repo_types::CommentView, services},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

pub fn comment_routes() -> Router<AppState> {
    Router::new().route("/blog/:id/comments", post(create_comment))
}

#[instrument(skip(state, identity, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    identity: Identity,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let comment = services::create(&state, &identity, post_id, payload.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
