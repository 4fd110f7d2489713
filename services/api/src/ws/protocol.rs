//! Defines the WebSocket message protocol between the voice runtime and the server.
//!
//! Only plain text crosses this boundary: the runtime delivers transcribed
//! utterances and receives reply strings to synthesize.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which dialogue core drives the conversation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    Shopping,
    Improv,
}

/// Messages sent from the voice runtime to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Starts a conversation. This must be the first message.
    #[serde(rename = "init")]
    Init { mode: ConversationMode },
    /// One transcribed utterance from the user.
    #[serde(rename = "user_message")]
    UserMessage { text: String },
}

/// Messages sent from the server to the voice runtime.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful initialization and carries the opening line.
    Initialized {
        session_id: Uuid,
        mode: ConversationMode,
        greeting: String,
    },
    /// The reply to speak for the latest utterance.
    Reply { text: String },
    /// Reports a protocol or internal error.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_message_deserializes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"init","mode":"shopping"}"#).unwrap();
        match msg {
            ClientMessage::Init { mode } => assert_eq!(mode, ConversationMode::Shopping),
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn user_message_deserializes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"user_message","text":"add 2 bread"}"#).unwrap();
        match msg {
            ClientMessage::UserMessage { text } => assert_eq!(text, "add 2 bread"),
            _ => panic!("expected user_message"),
        }
    }

    #[test]
    fn unknown_client_message_is_an_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"set_voice_enabled","enabled":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn reply_serializes_with_snake_case_tag() {
        let json = serde_json::to_string(&ServerMessage::Reply {
            text: "Added 2 x Whole Wheat Bread".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"reply""#));
        assert!(json.contains("Whole Wheat Bread"));
    }

    #[test]
    fn initialized_carries_mode_and_greeting() {
        let json = serde_json::to_string(&ServerMessage::Initialized {
            session_id: Uuid::nil(),
            mode: ConversationMode::Improv,
            greeting: "Welcome!".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""mode":"improv""#));
        assert!(json.contains(r#""type":"initialized""#));
    }
}
