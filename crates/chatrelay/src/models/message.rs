use super::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPart {
    pub text: String,
}

/// An attachment referenced by URL, as uploaded through the chat UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub url: String,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FilePart {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// One typed part of a chat message. Attachments travel as `File` parts.
pub enum MessagePart {
    Text(TextPart),
    File(FilePart),
}

impl MessagePart {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessagePart::Text(TextPart { text: text.into() })
    }

    pub fn file<S: Into<String>, T: Into<String>>(url: S, media_type: T) -> Self {
        MessagePart::File(FilePart {
            url: url.into(),
            media_type: media_type.into(),
            name: None,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessagePart::Text(part) => Some(&part.text),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FilePart> {
        match self {
            MessagePart::File(part) => Some(part),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A message stored as part of a chat. Never mutated once saved.
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create an empty message with a fresh id and the current timestamp
    pub fn new<S: Into<String>>(chat_id: S, role: Role) -> Self {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            role,
            parts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn user<S: Into<String>>(chat_id: S) -> Self {
        Self::new(chat_id, Role::User)
    }

    pub fn assistant<S: Into<String>>(chat_id: S) -> Self {
        Self::new(chat_id, Role::Assistant)
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_part(mut self, part: MessagePart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_part(MessagePart::text(text))
    }

    pub fn with_file<S: Into<String>, T: Into<String>>(self, url: S, media_type: T) -> Self {
        self.with_part(MessagePart::file(url, media_type))
    }

    /// All text parts joined by newlines
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(MessagePart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_text(&self) -> bool {
        self.parts.iter().any(|part| part.as_text().is_some())
    }

    /// The first attached image, if any
    pub fn image_attachment(&self) -> Option<&FilePart> {
        self.parts
            .iter()
            .filter_map(MessagePart::as_file)
            .find(|file| file.is_image())
    }

    pub fn to_turn(&self) -> ConversationTurn {
        ConversationTurn {
            role: self.role,
            content: self.text(),
        }
    }
}

/// The flattened shape a provider adapter receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user<S: Into<String>>(content: S) -> Self {
        ConversationTurn {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        ConversationTurn {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_joins_text_parts_only() {
        let message = ChatMessage::user("chat-1")
            .with_text("first")
            .with_file("https://example.com/a.pdf", "application/pdf")
            .with_text("second");

        assert_eq!(message.text(), "first\nsecond");
        assert!(message.has_text());
        assert!(message.image_attachment().is_none());
    }

    #[test]
    fn test_image_attachment_found_among_files() {
        let message = ChatMessage::user("chat-1")
            .with_file("https://example.com/a.pdf", "application/pdf")
            .with_file("https://example.com/cat.png", "image/png");

        let image = message.image_attachment().unwrap();
        assert_eq!(image.url, "https://example.com/cat.png");
        assert!(!message.has_text());
    }

    #[test]
    fn test_part_wire_shape() {
        let parts: Vec<MessagePart> = serde_json::from_value(json!([
            {"type": "text", "text": "hi"},
            {"type": "file", "url": "https://x/y.jpg", "mediaType": "image/jpeg", "name": "y.jpg"}
        ]))
        .unwrap();

        assert_eq!(parts[0].as_text(), Some("hi"));
        let file = parts[1].as_file().unwrap();
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.name.as_deref(), Some("y.jpg"));
    }

    #[test]
    fn test_stored_message_keeps_files_in_parts() {
        let message = ChatMessage::user("chat-1")
            .with_id("m1")
            .with_text("what is this?")
            .with_file("https://x/cat.png", "image/png");

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["chatId"], "chat-1");
        assert!(value.get("attachments").is_none());
        assert_eq!(
            value["parts"][1],
            json!({"type": "file", "url": "https://x/cat.png", "mediaType": "image/png"})
        );

        let back: ChatMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_to_turn() {
        let message = ChatMessage::assistant("chat-1").with_text("hello");
        assert_eq!(message.to_turn(), ConversationTurn::assistant("hello"));
    }
}
