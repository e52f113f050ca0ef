use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    attachments::{Upload, MAX_ATTACHMENT_BYTES},
    auth::identity::Identity,
    error::AppError,
    posts::{
        dto::{AddPostPage, CreatePostInput, HomeResponse, PostPage},
        repo_types::Post,
        services,
    },
    state::AppState,
};

const COVER_FIELD: &str = "coverImage";

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/blog/add-new", get(add_new_page))
        .route("/blog/:id", get(get_post).delete(delete_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/blog", post(create_post))
        // room for the form fields on top of a max-size image
        .layer(DefaultBodyLimit::max(MAX_ATTACHMENT_BYTES * 2))
}

#[instrument(skip(state, identity))]
pub async fn home(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<HomeResponse>, AppError> {
    let blogs = services::list_all(&state).await?;
    Ok(Json(HomeResponse {
        user: identity.context().cloned(),
        blogs,
    }))
}

/// Restricted page: anonymous visitors are sent to sign in.
pub async fn add_new_page(identity: Identity) -> Response {
    match identity {
        Identity::Authenticated(user) => Json(AddPostPage { user }).into_response(),
        Identity::Anonymous => Redirect::to("/user/signin").into_response(),
    }
}

/// POST /blog (multipart): `title`, `body`, optional single `coverImage`.
#[instrument(skip(state, identity, mp))]
pub async fn create_post(
    State(state): State<AppState>,
    identity: Identity,
    mut mp: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut title = None;
    let mut body = None;
    let mut cover_image = None;

    while let Some(field) = mp.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await.map_err(bad_multipart)?),
            Some("body") => body = Some(field.text().await.map_err(bad_multipart)?),
            Some(COVER_FIELD) => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field
                    .content_type()
                    .map(str::to_owned)
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(bad_multipart)?;
                // browsers send an empty part when no file was picked
                if data.is_empty() {
                    continue;
                }
                if cover_image.is_some() {
                    return Err(AppError::validation("Only one cover image is allowed"));
                }
                cover_image = Some(Upload {
                    file_name,
                    content_type,
                    body: data,
                });
            }
            _ => {}
        }
    }

    let input = CreatePostInput {
        title: title.unwrap_or_default(),
        body: body.unwrap_or_default(),
        cover_image,
    };
    let post: Post = services::create(&state, &identity, input).await?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/blog/{}", post.id))],
        Json(post),
    ))
}

#[instrument(skip(state, identity))]
pub async fn get_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<PostPage>, AppError> {
    let blog = services::get_by_id(&state, id).await?;
    Ok(Json(PostPage {
        user: identity.context().cloned(),
        blog,
    }))
}

#[instrument(skip(state, identity))]
pub async fn delete_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete(&state, &identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn bad_multipart(e: MultipartError) -> AppError {
    warn!(error = %e, "malformed multipart body");
    AppError::validation(format!("Invalid form data: {}", e.body_text()))
}
