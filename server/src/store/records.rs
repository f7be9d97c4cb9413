//! On-disk record shapes. Each record is one JSON line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::channel::{Channel, ChannelKind};
use crate::engine::message::Message;
use crate::engine::server::Server;
use crate::engine::user::{User, UserId};

/// First line of every data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelKindRecord {
    Text,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub sender_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    pub kind: ChannelKindRecord,
    /// All messages for text channels; zero or one for voice channels.
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub invite_code: String,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(default)]
    pub channels: Vec<ChannelRecord>,
}

// ── Entity -> record ────────────────────────────────────────────────

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        }
    }
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            sender_id: message.sender_id,
            timestamp: message.timestamp,
            content: message.content.clone(),
        }
    }
}

impl From<&Channel> for ChannelRecord {
    fn from(channel: &Channel) -> Self {
        Self {
            name: channel.name().to_string(),
            kind: match channel.kind() {
                ChannelKind::Text => ChannelKindRecord::Text,
                ChannelKind::Voice => ChannelKindRecord::Voice,
            },
            messages: channel.messages().iter().map(MessageRecord::from).collect(),
        }
    }
}

impl From<&Server> for ServerRecord {
    fn from(server: &Server) -> Self {
        Self {
            owner_id: server.owner_id,
            name: server.name.clone(),
            description: server.description.clone(),
            invite_code: server.invite_code.clone(),
            members: server.members().to_vec(),
            channels: server.channels().iter().map(ChannelRecord::from).collect(),
        }
    }
}

// ── Record -> entity ────────────────────────────────────────────────

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        User::new(r.id, r.name, r.email, r.password)
    }
}

impl From<MessageRecord> for Message {
    fn from(r: MessageRecord) -> Self {
        Message::with_timestamp(r.sender_id, r.content, r.timestamp)
    }
}

impl From<ChannelRecord> for Channel {
    fn from(r: ChannelRecord) -> Self {
        let messages = r.messages.into_iter().map(Message::from);
        match r.kind {
            ChannelKindRecord::Text => Channel::Text {
                name: r.name,
                messages: messages.collect(),
            },
            ChannelKindRecord::Voice => Channel::Voice {
                name: r.name,
                last: messages.last(),
            },
        }
    }
}

impl From<ServerRecord> for Server {
    fn from(r: ServerRecord) -> Self {
        Server::restore(
            r.owner_id,
            r.name,
            r.description,
            r.invite_code,
            r.members,
            r.channels.into_iter().map(Channel::from).collect(),
        )
    }
}
