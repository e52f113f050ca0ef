use argon2::{
    password_hash::{Output, PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Salt and digest pair as persisted on a user row.
///
/// Only [`hash_password`] constructs one, so a stored hash always went through
/// the hashing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: String,
    hash: String,
}

impl PasswordDigest {
    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Hashes `plain` with a fresh 128-bit random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<PasswordDigest> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = digest(plain, &salt)?;
    Ok(PasswordDigest {
        salt: salt.as_str().to_owned(),
        hash: hash.to_string(),
    })
}

/// Recomputes the digest for `plain` under the stored salt and compares.
pub fn verify_password(plain: &str, salt: &str, hash: &str) -> anyhow::Result<bool> {
    let salt = SaltString::from_b64(salt).map_err(|e| {
        error!(error = %e, "stored salt is malformed");
        anyhow::anyhow!(e.to_string())
    })?;
    let expected = Output::b64_decode(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!(e.to_string())
    })?;
    // Output's PartialEq is constant-time.
    Ok(digest(plain, &salt)? == expected)
}

fn digest(plain: &str, salt: &SaltString) -> anyhow::Result<Output> {
    Argon2::default()
        .hash_password(plain.as_bytes(), salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .hash
        .ok_or_else(|| anyhow::anyhow!("argon2 produced no output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let digest = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, digest.salt(), digest.hash()).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let digest = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", digest.salt(), digest.hash())
            .expect("verify should not error"));
    }

    #[test]
    fn salts_are_fresh_per_hash() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.hash(), b.hash());
        // 16 random bytes rendered as unpadded B64
        assert_eq!(a.salt().len(), 22);
    }

    #[test]
    fn verify_with_other_users_salt_fails() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert!(!verify_password("hunter22", b.salt(), a.hash()).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let digest = hash_password("anything").unwrap();
        let err = verify_password("anything", digest.salt(), "not a valid hash!").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(verify_password("anything", "", digest.hash()).is_err());
    }
}
