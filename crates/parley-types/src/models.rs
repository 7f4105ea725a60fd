use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted chat message. The text body travels as `message` on the
/// wire; `senderId` is a weak reference to a user — never enforced by the
/// store, only by caller convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub room: String,
    pub name: String,
    #[serde(rename = "message")]
    pub text: String,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "senderId", skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Uuid>,
}

/// Message fields as submitted by a client, before an id and timestamp are
/// assigned. Both the HTTP post path and the socket send path go through
/// this type so validation and storage stay identical.
///
/// String fields default to empty when absent, so a missing field fails
/// `validate` instead of failing JSON extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "message")]
    pub text: String,
    pub avatar: Option<String>,
    #[serde(rename = "senderId")]
    pub sender_id: Option<Uuid>,
}

impl NewMessage {
    /// Every message needs a room, a name and a body.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.text.trim().is_empty() {
            return Err("message is required");
        }
        if self.room.trim().is_empty() {
            return Err("room is required");
        }
        Ok(())
    }

    /// Assign an id and creation time, producing the message to persist.
    pub fn into_message(self) -> Message {
        Message {
            id: Uuid::new_v4(),
            room: self.room,
            name: self.name,
            text: self.text,
            time: Utc::now(),
            avatar: self.avatar,
            sender_id: self.sender_id,
        }
    }
}
