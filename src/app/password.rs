use anyhow::Context;
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use secrecy::{ExposeSecret, SecretString};

use crate::app::error::AppError;
use crate::telemetry::spawn_blocking_with_tracing;

/// Hash a password with argon2id.
///
/// Every call draws its own salt, two hashes of the same password never match.
#[tracing::instrument(name = "Compute password hash", skip_all)]
pub async fn compute_password_hash(password: SecretString) -> Result<String, AppError> {
    let hash = spawn_blocking_with_tracing(move || -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let params = Params::new(15000, 2, 1, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?;

        let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?
            .to_string();

        Ok(hash)
    })
    .await
    .context("panic in computing password hash")??;

    Ok(hash)
}

/// Check `candidate` against a stored PHC hash string.
#[tracing::instrument(name = "Verify password hash", skip_all)]
pub async fn verify_password_hash(
    expected_password_hash: SecretString,
    candidate: SecretString,
) -> Result<bool, AppError> {
    let matches = spawn_blocking_with_tracing(move || -> anyhow::Result<bool> {
        let hash = PasswordHash::new(expected_password_hash.expose_secret())
            .map_err(|e| anyhow::anyhow!("invalid password hash: {}", e))?;

        match Argon2::default().verify_password(candidate.expose_secret().as_bytes(), &hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("failed to verify password hash: {}", e)),
        }
    })
    .await
    .context("panic in verifying password hash")??;

    Ok(matches)
}
