use axum::http::HeaderMap;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::warn;
use uuid::Uuid;

use parley_db::models::MessageRow;
use parley_types::api::CreateChatResponse;
use parley_types::events::GatewayEvent;
use parley_types::models::{Message, NewMessage};

use crate::auth::AppState;
use crate::error::{ApiError, blocking_err};
use crate::token;

pub async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Message>>, ApiError> {
    token::authorize(&headers, &state.jwt_secret)?;

    let rows = {
        let db = state.db.clone();
        tokio::task::spawn_blocking(move || db.all_messages())
            .await
            .map_err(blocking_err)??
    };

    Ok(Json(rows.into_iter().map(row_to_message).collect()))
}

pub async fn list_room_chats(
    State(state): State<AppState>,
    Path(room): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Message>>, ApiError> {
    token::authorize(&headers, &state.jwt_secret)?;

    let rows = {
        let db = state.db.clone();
        tokio::task::spawn_blocking(move || db.messages_in_room(&room))
            .await
            .map_err(blocking_err)??
    };

    Ok(Json(rows.into_iter().map(row_to_message).collect()))
}

pub async fn create_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut draft): Json<NewMessage>,
) -> Result<Json<CreateChatResponse>, ApiError> {
    let claims = token::authorize(&headers, &state.jwt_secret)?;

    draft.validate().map_err(ApiError::Validation)?;

    // The verified identity wins over anything the client put in the body.
    draft.sender_id = Some(claims.sub);

    let msg = draft.into_message();
    {
        let db = state.db.clone();
        let msg = msg.clone();
        tokio::task::spawn_blocking(move || db.insert_message(&msg))
            .await
            .map_err(blocking_err)??;
    }

    state
        .dispatcher
        .publish(&msg.room, GatewayEvent::NewMessage(msg.clone()))
        .await;

    Ok(Json(CreateChatResponse {
        message: "chat added".into(),
        chat: msg,
    }))
}

/// Map a stored row back to the wire model. Corrupt rows are reported but
/// never take the listing down.
fn row_to_message(row: MessageRow) -> Message {
    let id = row.id.parse().unwrap_or_else(|e| {
        warn!("corrupt message id '{}': {}", row.id, e);
        Uuid::default()
    });
    let time = row.time.parse().unwrap_or_else(|e| {
        warn!("corrupt time on message '{}': {}", row.id, e);
        chrono::DateTime::default()
    });

    Message {
        id,
        time,
        room: row.room,
        name: row.name,
        text: row.body,
        avatar: row.avatar,
        sender_id: row.sender_id.as_deref().and_then(|id| id.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MessageRow {
        MessageRow {
            id: Uuid::new_v4().to_string(),
            room: "general".into(),
            name: "alice".into(),
            body: "hi".into(),
            time: "2026-01-01T12:00:00+00:00".into(),
            avatar: None,
            sender_id: Some(Uuid::new_v4().to_string()),
        }
    }

    #[test]
    fn well_formed_row_maps_cleanly() {
        let row = row();
        let expected_id = row.id.clone();
        let msg = row_to_message(row);
        assert_eq!(msg.id.to_string(), expected_id);
        assert_eq!(msg.text, "hi");
        assert!(msg.sender_id.is_some());
    }

    #[test]
    fn corrupt_fields_fall_back_instead_of_panicking() {
        let mut bad = row();
        bad.id = "not-a-uuid".into();
        bad.time = "yesterday-ish".into();
        bad.sender_id = Some("also-not-a-uuid".into());

        let msg = row_to_message(bad);
        assert_eq!(msg.id, Uuid::default());
        assert_eq!(msg.time, chrono::DateTime::<chrono::Utc>::default());
        assert!(msg.sender_id.is_none());
    }
}
