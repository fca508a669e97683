//! Chat transcript: an ordered, append-only log of exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only within a session; entries are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message. Returns the entry id.
    pub fn append_user(&mut self, content: &str) -> Uuid {
        self.append(ChatRole::User, content)
    }

    /// Append an assistant reply. Returns the entry id.
    pub fn append_assistant(&mut self, content: &str) -> Uuid {
        self.append(ChatRole::Assistant, content)
    }

    fn append(&mut self, role: ChatRole, content: &str) -> Uuid {
        let entry = ChatEntry {
            id: Uuid::new_v4(),
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// All entries in order, newest last.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }

    #[test]
    fn appends_in_order_newest_last() {
        let mut transcript = Transcript::new();
        let user_id = transcript.append_user("What is the dose?");
        let assistant_id = transcript.append_assistant("100mg/m2 over one hour.");

        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, user_id);
        assert_eq!(entries[0].role, ChatRole::User);
        assert_eq!(entries[1].id, assistant_id);
        assert_eq!(entries[1].role, ChatRole::Assistant);
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn roles_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn entry_serializes_with_content() {
        let mut transcript = Transcript::new();
        transcript.append_user("hello");
        let json = serde_json::to_value(&transcript.entries()[0]).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
        assert!(json.get("timestamp").is_some());
    }
}
