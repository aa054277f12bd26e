use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use minitwit_types::api::{FollowRequest, FollowsResponse};

use crate::db;
use crate::error::ApiError;
use crate::json;
use crate::pagination::PageLimit;
use crate::state::AppState;

pub const MISSING_TARGET: &str = "You have to provide a user to follow or unfollow";

enum FollowAction {
    Follow(String),
    Unfollow(String),
}

impl FollowAction {
    /// `follow` takes precedence when both fields are set. Empty names count
    /// as absent.
    fn from_request(req: FollowRequest) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        non_empty(req.follow)
            .map(Self::Follow)
            .or_else(|| non_empty(req.unfollow).map(Self::Unfollow))
    }
}

/// GET /api/fllws/{username}
pub async fn list_follows(
    State(state): State<AppState>,
    Path(username): Path<String>,
    PageLimit(limit): PageLimit,
) -> Result<Json<FollowsResponse>, ApiError> {
    let user_id = db::require_user(&state, &username).await?;
    let rows = db::read(&state, move |db| db.followees(user_id, limit)).await?;
    Ok(Json(FollowsResponse {
        follows: rows.into_iter().map(|row| row.username).collect(),
    }))
}

/// POST /api/fllws/{username} with either `{"follow": name}` or `{"unfollow": name}`.
pub async fn update_follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let who_id = db::require_user(&state, &username).await?;
    let action = FollowAction::from_request(json::lenient(&body))
        .ok_or(ApiError::Validation(MISSING_TARGET))?;

    match action {
        FollowAction::Follow(target) => {
            let whom_id = db::require_user(&state, &target).await?;
            let affected = db::write(&state, move |db| db.follow(who_id, whom_id)).await?;
            info!("{:?} now follows {:?} (affected rows: {})", username, target, affected);
        }
        FollowAction::Unfollow(target) => {
            let whom_id = db::require_user(&state, &target).await?;
            let affected = db::write(&state, move |db| db.unfollow(who_id, whom_id)).await?;
            info!("{:?} unfollowed {:?} (affected rows: {})", username, target, affected);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(follow: Option<&str>, unfollow: Option<&str>) -> Option<FollowAction> {
        FollowAction::from_request(FollowRequest {
            follow: follow.map(String::from),
            unfollow: unfollow.map(String::from),
        })
    }

    #[test]
    fn picks_follow_before_unfollow() {
        assert!(matches!(action(Some("a"), Some("b")), Some(FollowAction::Follow(n)) if n == "a"));
        assert!(matches!(action(None, Some("b")), Some(FollowAction::Unfollow(n)) if n == "b"));
        assert!(matches!(action(Some(""), Some("b")), Some(FollowAction::Unfollow(n)) if n == "b"));
    }

    #[test]
    fn empty_request_has_no_action() {
        assert!(action(None, None).is_none());
        assert!(action(Some(""), Some("")).is_none());
    }
}
