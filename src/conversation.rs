use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub const WELCOME_MESSAGE: &str = "👋 Welcome to Web Wizard! I'm your AI assistant for website editing, code operations, and development help, specializing in Laravel, PHP, and frontend technologies. What would you like help with today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

/// Append-only transcript. Messages are never mutated or removed, and
/// insertion order is display order.
pub struct Conversation {
    messages: Vec<Message>,
    last_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            last_id: 0,
        };
        conversation.append(Role::Assistant, WELCOME_MESSAGE.to_string());
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append_user(&mut self, content: String) {
        self.append(Role::User, content);
    }

    pub fn append_assistant(&mut self, content: String) {
        self.append(Role::Assistant, content);
    }

    pub fn latest_user_turn(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
    }

    fn append(&mut self, role: Role, content: String) {
        let id = self.next_id();
        self.messages.push(Message {
            id,
            role,
            content,
            timestamp: unix_timestamp(),
        });
    }

    // Millisecond clock with a monotonic bump, so two appends inside the
    // same millisecond still get strictly increasing ids.
    fn next_id(&mut self) -> u64 {
        let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_millis() as u64,
            Err(_) => 0,
        };
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }
}

fn unix_timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs().to_string(),
        Err(_) => "0".to_string(),
    }
}
