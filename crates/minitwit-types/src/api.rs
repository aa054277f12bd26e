use serde::{Deserialize, Serialize};

// -- Registration --

/// Body of `POST /api/register`. Missing fields decode as empty strings so
/// the handler can report them through its validation chain.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(alias = "password")]
    pub pwd: String,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostMessageRequest {
    pub content: String,
}

/// A single non-flagged message as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message_id: i64,
    pub author_id: i64,
    /// Author's username, joined in from the user table.
    pub user: String,
    pub text: String,
    /// Unix seconds.
    pub pub_date: i64,
    pub flagged: u8,
}

// -- Follows --

/// Body of `POST /api/fllws/{username}`. Exactly one of the fields is expected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FollowRequest {
    pub follow: Option<String>,
    pub unfollow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowsResponse {
    pub follows: Vec<String>,
}

// -- Cursor --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestResponse {
    pub latest: i64,
}

// -- Errors --

/// Error body for validation failures.
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub status: u16,
    pub error_msg: String,
}

/// Error body for a rejected simulator credential.
#[derive(Debug, Serialize)]
pub struct AuthErrorBody {
    pub status: u16,
    pub error: &'static str,
}

/// Bare status envelope used for not-found, write and storage failures.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: u16,
}
