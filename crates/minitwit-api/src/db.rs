//! Run blocking storage calls off the async runtime.

use minitwit_db::{Database, DbError};
use tracing::error;

use crate::error::ApiError;
use crate::state::AppState;

async fn run<F, T>(state: &AppState, f: F) -> Result<Result<T, DbError>, ApiError>
where
    F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })
}

/// A query whose failure surfaces as 500.
pub(crate) async fn read<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    run(state, f).await?.map_err(ApiError::Storage)
}

/// A statement whose failure surfaces as 403.
pub(crate) async fn write<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    run(state, f).await?.map_err(ApiError::WriteFailed)
}

/// Resolve a username to its id, or 404.
pub(crate) async fn require_user(state: &AppState, username: &str) -> Result<i64, ApiError> {
    let name = username.to_owned();
    read(state, move |db| db.get_user_id(&name))
        .await?
        .ok_or(ApiError::NotFound)
}
