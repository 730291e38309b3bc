use tracing::warn;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{User, UserId},
    },
    error::ApiError,
};

fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::invalid(format!("{field} is required"))),
    }
}

/// Creates a user after validating both fields; the store decides uniqueness.
pub async fn register(
    users: &dyn UserStore,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<UserId, ApiError> {
    let username = require(username, "username")?;
    let password = require(password, "password")?;

    let hash = hash_password(password.to_string()).await?;
    let id = users.create(username, &hash).await.map_err(|e| {
        warn!(username, error = %e, "registration rejected");
        e
    })?;
    Ok(id)
}

/// Returns the stored account when the password matches.
pub async fn authenticate(
    users: &dyn UserStore,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<User, ApiError> {
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::InvalidCredentials);
    };

    let Some(user) = users.find_by_username(username).await? else {
        warn!(username, "login unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password.to_string(), user.password_hash.clone()).await? {
        warn!(username, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }
    Ok(user)
}
