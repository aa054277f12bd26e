use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use rand_core::OsRng;
use axum::{body::Bytes, extract::State, http::StatusCode};
use tracing::{error, info};

use minitwit_types::api::RegisterRequest;

use crate::db;
use crate::error::ApiError;
use crate::json;
use crate::state::AppState;

pub const MISSING_USERNAME: &str = "You have to enter a username";
pub const INVALID_EMAIL: &str = "You have to enter a valid email address";
pub const MISSING_PASSWORD: &str = "You have to enter a password";
pub const USERNAME_TAKEN: &str = "The username is already taken";

/// Field checks that need no storage access, in reporting order.
pub fn validate(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.username.is_empty() {
        return Err(ApiError::Validation(MISSING_USERNAME));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(ApiError::Validation(INVALID_EMAIL));
    }
    if req.pwd.is_empty() {
        return Err(ApiError::Validation(MISSING_PASSWORD));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let req: RegisterRequest = json::lenient(&body);
    validate(&req)?;

    let pwd = req.pwd;
    let pw_hash = tokio::task::spawn_blocking(move || hash_password(&pwd))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })??;

    // The uniqueness check and the insert share one locked call, so
    // concurrent registrations of the same name cannot both succeed.
    let username = req.username.clone();
    let email = req.email;
    let created = db::write(&state, move |db| {
        db.create_user_if_absent(&username, &email, &pw_hash)
    })
    .await?;

    let Some(user_id) = created else {
        info!("Registration refused: username {:?} is taken", req.username);
        return Err(ApiError::Validation(USERNAME_TAKEN));
    };

    info!("Registered user {:?} with id {}", req.username, user_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(username: &str, email: &str, pwd: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            pwd: pwd.into(),
        }
    }

    fn message(result: Result<(), ApiError>) -> &'static str {
        match result {
            Err(ApiError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn first_failing_check_wins() {
        assert_eq!(message(validate(&req("", "", ""))), MISSING_USERNAME);
        assert_eq!(message(validate(&req("a", "", ""))), INVALID_EMAIL);
        assert_eq!(message(validate(&req("a", "no-at-sign", ""))), INVALID_EMAIL);
        assert_eq!(message(validate(&req("a", "a@b", ""))), MISSING_PASSWORD);
    }

    #[test]
    fn complete_request_passes() {
        assert!(validate(&req("a", "a@b", "pw")).is_ok());
    }

    #[test]
    fn hashes_are_salted_phc_strings() {
        let first = hash_password("pw").unwrap();
        let second = hash_password("pw").unwrap();
        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
    }
}
