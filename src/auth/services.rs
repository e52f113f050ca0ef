use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::RegisterRequest,
        identity::{Identity, IdentityContext},
        password::{hash_password, verify_password, PasswordDigest},
        repo_types::{NewUser, Role, User},
    },
    error::AppError,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl From<&User> for IdentityContext {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id,
            email: u.email.clone(),
            role: u.role,
            full_name: u.full_name.clone(),
        }
    }
}

// Argon2 is CPU bound, keep it off the async workers.
async fn hash_blocking(plain: String) -> Result<PasswordDigest, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("join hash task")
        .and_then(|r| r)
        .map_err(AppError::Store)
}

async fn verify_blocking(plain: String, user: &User) -> Result<bool, AppError> {
    let (salt, hash) = (user.salt.clone(), user.password_hash.clone());
    tokio::task::spawn_blocking(move || verify_password(&plain, &salt, &hash))
        .await
        .context("join verify task")
        .and_then(|r| r)
        .map_err(AppError::Store)
}

#[instrument(skip(st, req), fields(email = %req.email))]
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);
    let full_name = req.full_name.trim().to_string();

    if full_name.is_empty() {
        return Err(AppError::validation("Full name is required"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation("Password too short"));
    }

    if st
        .store
        .find_user_by_email(&email)
        .await
        .map_err(AppError::Store)?
        .is_some()
    {
        warn!(email = %email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let credentials = hash_blocking(req.password).await?;
    let user = st
        .store
        .insert_user(NewUser {
            full_name,
            email,
            credentials,
            profile_pic_url: None,
            role: Role::User,
        })
        .await
        .map_err(AppError::Store)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks an email/password pair.
///
/// Unknown email and wrong password both yield `InvalidCredentials`; only the
/// log line tells them apart.
#[instrument(skip(st, password))]
pub async fn authenticate(st: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let email = normalize_email(email);

    let Some(user) = st
        .store
        .find_user_by_email(&email)
        .await
        .map_err(AppError::Store)?
    else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_blocking(password.to_owned(), &user).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

/// Issues a session token for `user`.
pub fn issue_session(st: &AppState, user: &User) -> Result<String, AppError> {
    st.tokens
        .issue(&IdentityContext::from(user))
        .map_err(AppError::Store)
}

/// Re-hashes credentials for the signed-in user after checking the current password.
#[instrument(skip_all)]
pub async fn change_password(
    st: &AppState,
    identity: &Identity,
    current_password: &str,
    new_password: String,
) -> Result<(), AppError> {
    let who = identity.require()?;
    let user = st
        .store
        .find_user_by_id(who.user_id)
        .await
        .map_err(AppError::Store)?
        .ok_or(AppError::AuthRequired)?;

    if !verify_blocking(current_password.to_owned(), &user).await? {
        warn!(user_id = %user.id, "password change with wrong current password");
        return Err(AppError::InvalidCredentials);
    }
    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }
    if new_password == current_password {
        // unchanged password keeps the existing salt and hash
        return Ok(());
    }

    let credentials = hash_blocking(new_password).await?;
    st.store
        .update_password(user.id, &credentials)
        .await
        .map_err(AppError::Store)?;
    info!(user_id = %user.id, "password changed");
    Ok(())
}
