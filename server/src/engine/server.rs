use tracing::warn;

use super::channel::{Channel, ChannelKind};
use super::user::UserId;

/// In-memory state for a server (guild).
///
/// The owner is always a member. Channel names are unique per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    /// Empty means the server is open.
    pub invite_code: String,
    /// Member user IDs in join order (persistent membership).
    members: Vec<UserId>,
    channels: Vec<Channel>,
}

impl Server {
    pub fn new(owner_id: UserId, name: String) -> Self {
        Self {
            owner_id,
            name,
            description: String::new(),
            invite_code: String::new(),
            members: vec![owner_id],
            channels: Vec::new(),
        }
    }

    /// Rebuild a server from stored parts, re-establishing the owner and
    /// uniqueness invariants.
    pub fn restore(
        owner_id: UserId,
        name: String,
        description: String,
        invite_code: String,
        members: Vec<UserId>,
        channels: Vec<Channel>,
    ) -> Self {
        let mut server = Self::new(owner_id, name);
        server.description = description;
        server.invite_code = invite_code;
        for id in members {
            server.add_member(id);
        }
        for channel in channels {
            if server.channel_exists(channel.name(), channel.kind()) {
                warn!(server = %server.name, channel = %channel.name(), "skipping duplicate channel");
                continue;
            }
            server.channels.push(channel);
        }
        server
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Returns true if the user was not a member before.
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.has_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        true
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn has_invite(&self) -> bool {
        !self.invite_code.is_empty()
    }

    /// Whether `user_id` may enter with the given code.
    pub fn admits(&self, user_id: UserId, code: Option<&str>) -> bool {
        !self.has_invite()
            || self.is_owned_by(user_id)
            || self.has_member(user_id)
            || code == Some(self.invite_code.as_str())
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_of(&self, kind: ChannelKind) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(move |c| c.kind() == kind)
    }

    /// First channel with this name (in creation order), optionally of one kind.
    pub fn find_channel(&self, name: &str, kind: Option<ChannelKind>) -> Option<&Channel> {
        self.channels.iter().find(|c| c.matches(name, kind))
    }

    pub fn find_channel_mut(&mut self, name: &str, kind: Option<ChannelKind>) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.matches(name, kind))
    }

    pub fn channel_exists(&self, name: &str, kind: ChannelKind) -> bool {
        self.find_channel(name, Some(kind)).is_some()
    }

    /// Append a channel. Callers check `channel_exists` first.
    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.push(channel);
    }
}
