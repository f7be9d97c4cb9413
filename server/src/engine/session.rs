use serde::Serialize;

use super::channel::ChannelKind;
use super::user::UserId;

/// The four states that gate which commands are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Guest,
    LoggedIn,
    InServer,
    InChannel,
}

/// Name-and-kind reference to the channel being viewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub name: String,
    pub kind: ChannelKind,
}

/// The single active session. Holds IDs and names only; the entities
/// themselves live in the directory and are resolved on every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Guest,
    LoggedIn {
        user_id: UserId,
    },
    InServer {
        user_id: UserId,
        server: String,
    },
    InChannel {
        user_id: UserId,
        server: String,
        channel: ChannelRef,
    },
}

impl Session {
    pub fn state(&self) -> SessionState {
        match self {
            Self::Guest => SessionState::Guest,
            Self::LoggedIn { .. } => SessionState::LoggedIn,
            Self::InServer { .. } => SessionState::InServer,
            Self::InChannel { .. } => SessionState::InChannel,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Guest => None,
            Self::LoggedIn { user_id }
            | Self::InServer { user_id, .. }
            | Self::InChannel { user_id, .. } => Some(*user_id),
        }
    }

    pub fn server(&self) -> Option<&str> {
        match self {
            Self::InServer { server, .. } | Self::InChannel { server, .. } => Some(server),
            _ => None,
        }
    }

    pub fn channel(&self) -> Option<&ChannelRef> {
        match self {
            Self::InChannel { channel, .. } => Some(channel),
            _ => None,
        }
    }

    pub fn login(&mut self, user_id: UserId) {
        *self = Self::LoggedIn { user_id };
    }

    /// Back to Guest, dropping user, server and channel.
    pub fn disconnect(&mut self) {
        *self = Self::Guest;
    }

    pub fn enter_server(&mut self, server: String) {
        if let Some(user_id) = self.user_id() {
            *self = Self::InServer { user_id, server };
        }
    }

    /// Drops the current server and any channel inside it.
    pub fn leave_server(&mut self) {
        if let Some(user_id) = self.user_id() {
            *self = Self::LoggedIn { user_id };
        }
    }

    pub fn enter_channel(&mut self, channel: ChannelRef) {
        if let Self::InServer { user_id, server } | Self::InChannel { user_id, server, .. } = self {
            *self = Self::InChannel {
                user_id: *user_id,
                server: std::mem::take(server),
                channel,
            };
        }
    }

    pub fn leave_channel(&mut self) {
        if let Self::InChannel { user_id, server, .. } = self {
            *self = Self::InServer {
                user_id: *user_id,
                server: std::mem::take(server),
            };
        }
    }
}
