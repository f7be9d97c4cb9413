use chrono::{DateTime, Utc};
use serde::Serialize;

use super::channel::ChannelKind;
use super::user::UserId;

/// A message as shown to the user, with the sender resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// What a successful command did. Rendered by the console as text or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    UserCreated {
        id: UserId,
        email: String,
    },
    LoggedIn {
        email: String,
    },
    Disconnected {
        email: String,
    },
    ServerCreated {
        name: String,
    },
    DescriptionChanged {
        server: String,
    },
    InviteCodeChanged {
        server: String,
        removed: bool,
    },
    ServerList {
        servers: Vec<String>,
    },
    ServerRemoved {
        name: String,
    },
    ServerJoined {
        name: String,
        /// True if this entry added the user to the member list.
        new_member: bool,
    },
    ServerLeft {
        name: String,
    },
    Participants {
        names: Vec<String>,
    },
    ChannelList {
        text: Vec<String>,
        voice: Vec<String>,
    },
    ChannelCreated {
        name: String,
        kind: ChannelKind,
    },
    ChannelJoined {
        name: String,
        kind: ChannelKind,
    },
    ChannelLeft {
        name: String,
    },
    MessageSent {
        channel: String,
    },
    MessageList {
        messages: Vec<MessageView>,
    },
    Farewell,
}

impl Outcome {
    /// Whether the directory changed and should be persisted.
    pub fn mutates(&self) -> bool {
        match self {
            Self::UserCreated { .. }
            | Self::ServerCreated { .. }
            | Self::DescriptionChanged { .. }
            | Self::InviteCodeChanged { .. }
            | Self::ServerRemoved { .. }
            | Self::ChannelCreated { .. }
            | Self::MessageSent { .. } => true,
            Self::ServerJoined { new_member, .. } => *new_member,
            _ => false,
        }
    }
}
