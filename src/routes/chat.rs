//! Chat webhook route.

use axum::{Json, Router, extract::State, routing::post};
use time::OffsetDateTime;

use crate::{
    dto::chat::{ChatReply, ChatUpdate},
    error::AppError,
    services::chat_service,
    state::SharedState,
};

/// Webhook receiving updates forwarded by the chat transport.
pub fn router() -> Router<SharedState> {
    Router::new().route("/chat/updates", post(chat_update))
}

/// Handle one chat update and return the reply to post, if any.
#[utoipa::path(
    post,
    path = "/chat/updates",
    tag = "chat",
    request_body = ChatUpdate,
    responses(
        (status = 200, description = "Update processed", body = ChatReply),
        (status = 503, description = "Update applied but not persisted")
    )
)]
pub async fn chat_update(
    State(state): State<SharedState>,
    Json(update): Json<ChatUpdate>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = chat_service::handle_update(&state, update, OffsetDateTime::now_utc()).await?;
    Ok(Json(reply))
}
