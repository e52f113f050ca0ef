use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    auth::{claims::Claims, identity::IdentityContext},
    config::JwtConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens with a secret fixed at startup.
///
/// Tokens carry no expiry; a token stays valid for as long as the secret does.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<Keys>,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            inner: Arc::new(Keys {
                encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
                decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
                issuer: cfg.issuer.clone(),
                audience: cfg.audience.clone(),
            }),
        }
    }

    pub fn issue(&self, identity: &IdentityContext) -> anyhow::Result<String> {
        let claims = Claims {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            full_name: identity.full_name.clone(),
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
            iss: self.inner.issuer.clone(),
            aud: self.inner.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)?;
        debug!(user_id = %identity.user_id, "session token signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<IdentityContext, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.set_audience(std::slice::from_ref(&self.inner.audience));
        validation.set_issuer(std::slice::from_ref(&self.inner.issuer));
        let data = decode::<Claims>(token, &self.inner.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims.into())
    }
}

impl From<Claims> for IdentityContext {
    fn from(c: Claims) -> Self {
        Self {
            user_id: c.sub,
            email: c.email,
            role: c.role,
            full_name: c.full_name,
        }
    }
}
