use serde::{Deserialize, Serialize};

use crate::models::{Message, NewMessage};

/// Commands sent FROM client TO server over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum GatewayCommand {
    /// Subscribe this connection to a room
    JoinRoom(String),

    /// Persist a message and broadcast it to its room
    SendMessage(NewMessage),
}

/// Events sent FROM server TO clients over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum GatewayEvent {
    /// A new message was persisted in a room this connection subscribed to
    NewMessage(Message),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_wire_format() {
        let cmd: GatewayCommand =
            serde_json::from_str(r#"{"type":"joinRoom","data":"general"}"#).unwrap();
        match cmd {
            GatewayCommand::JoinRoom(room) => assert_eq!(room, "general"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn send_message_wire_format() {
        let cmd: GatewayCommand = serde_json::from_str(
            r#"{"type":"sendMessage","data":{"room":"general","name":"bob","message":"yo"}}"#,
        )
        .unwrap();
        match cmd {
            GatewayCommand::SendMessage(draft) => {
                assert_eq!(draft.room, "general");
                assert_eq!(draft.text, "yo");
                assert!(draft.sender_id.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn new_message_event_is_tagged() {
        let draft: NewMessage =
            serde_json::from_str(r#"{"room":"general","name":"bob","message":"yo"}"#).unwrap();
        let event = GatewayEvent::NewMessage(draft.into_message());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "newMessage");
        assert_eq!(json["data"]["message"], "yo");
    }
}
