use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{debug, info};

use minitwit_db::models::MessageRow;
use minitwit_types::api::{MessageResponse, PostMessageRequest};

use crate::db;
use crate::error::ApiError;
use crate::json;
use crate::pagination::PageLimit;
use crate::state::AppState;

fn to_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        message_id: row.message_id,
        author_id: row.author_id,
        user: row.username,
        text: row.text,
        pub_date: row.pub_date,
        flagged: row.flagged,
    }
}

/// GET /api/msgs
pub async fn list_messages(
    State(state): State<AppState>,
    PageLimit(limit): PageLimit,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let rows = db::read(&state, move |db| db.public_messages(limit)).await?;
    debug!("Listing {} public messages (limit {})", rows.len(), limit);
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// GET /api/msgs/{username}
pub async fn list_user_messages(
    State(state): State<AppState>,
    Path(username): Path<String>,
    PageLimit(limit): PageLimit,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let user_id = db::require_user(&state, &username).await?;
    let rows = db::read(&state, move |db| db.user_messages(user_id, limit)).await?;
    debug!("Listing {} messages of {:?} (limit {})", rows.len(), username, limit);
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// POST /api/msgs/{username}
pub async fn post_message(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let author_id = db::require_user(&state, &username).await?;
    let req: PostMessageRequest = json::lenient(&body);
    let pub_date = chrono::Utc::now().timestamp();

    let text = req.content;
    let message_id =
        db::write(&state, move |db| db.insert_message(author_id, &text, pub_date)).await?;

    info!("Inserted message {} by {:?}", message_id, username);
    Ok(StatusCode::NO_CONTENT)
}
