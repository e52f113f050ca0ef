use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::Role;

/// JWT payload carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,         // user ID
    pub email: String,     // user email
    pub role: Role,        // account role
    pub full_name: String, // display name
    pub iat: usize,        // issued at (unix timestamp)
    pub iss: String,       // issuer
    pub aud: String,       // audience
}
