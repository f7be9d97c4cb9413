use chrono::{DateTime, Utc};

use super::user::UserId;

/// A message sent to a channel. Owned by that channel and never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(sender_id: UserId, content: String) -> Self {
        Self::with_timestamp(sender_id, content, Utc::now())
    }

    pub fn with_timestamp(sender_id: UserId, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender_id,
            content,
            timestamp,
        }
    }
}
