use tracing::{info, warn};

use super::channel::{Channel, ChannelKind};
use super::server::Server;
use super::user::{User, UserId, UserLookup};

/// Owns every user and server and answers lookups over them.
///
/// Lookups are linear scans; "not found" is `None`, never an error.
#[derive(Debug, Default)]
pub struct Directory {
    users: Vec<User>,
    servers: Vec<Server>,
    last_user_id: UserId,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted collections. Records that would break email or
    /// server-name uniqueness are dropped.
    pub fn restore(users: Vec<User>, servers: Vec<Server>) -> Self {
        let mut directory = Self::new();

        for user in users {
            // Ids start at 1, and the highest id must leave room for the next one.
            if user.id == 0 || user.id == UserId::MAX {
                warn!(
                    user_id = user.id,
                    email = %user.email,
                    "skipping user record with out-of-range id"
                );
                continue;
            }
            if directory.user_exists(&user.email)
                || directory.find_user(UserLookup::Id(user.id)).is_some()
            {
                warn!(
                    user_id = user.id,
                    email = %user.email,
                    "skipping duplicate user record"
                );
                continue;
            }
            directory.last_user_id = directory.last_user_id.max(user.id);
            directory.users.push(user);
        }

        for server in servers {
            if directory.server_exists(&server.name) {
                warn!(server = %server.name, "skipping duplicate server record");
                continue;
            }
            directory.servers.push(server);
        }

        info!(
            users = directory.users.len(),
            servers = directory.servers.len(),
            "directory restored"
        );
        directory
    }

    // ── Users ───────────────────────────────────────────────────────

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, lookup: UserLookup<'_>) -> Option<&User> {
        self.users.iter().find(|u| u.matches(lookup))
    }

    pub fn user_exists(&self, email: &str) -> bool {
        self.find_user(UserLookup::Email(email)).is_some()
    }

    /// Display name for a user ID, if that user exists.
    pub fn user_name(&self, id: UserId) -> Option<&str> {
        self.find_user(UserLookup::Id(id)).map(|u| u.name.as_str())
    }

    /// Append a user under the next sequential ID. Callers check
    /// `user_exists` first.
    pub fn insert_user(&mut self, name: String, email: String, password: String) -> UserId {
        self.last_user_id += 1;
        let id = self.last_user_id;
        self.users.push(User::new(id, name, email, password));
        id
    }

    // ── Servers ─────────────────────────────────────────────────────

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn find_server(&self, name: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.matches_name(name))
    }

    pub fn find_server_mut(&mut self, name: &str) -> Option<&mut Server> {
        self.servers.iter_mut().find(|s| s.matches_name(name))
    }

    pub fn server_exists(&self, name: &str) -> bool {
        self.find_server(name).is_some()
    }

    /// Append a server. Callers check `server_exists` first.
    pub fn insert_server(&mut self, server: Server) {
        self.servers.push(server);
    }

    /// Remove a server together with its channels and messages.
    pub fn remove_server(&mut self, name: &str) -> Option<Server> {
        let idx = self.servers.iter().position(|s| s.matches_name(name))?;
        Some(self.servers.remove(idx))
    }

    // ── Channels ────────────────────────────────────────────────────

    pub fn find_channel(
        &self,
        server: &str,
        name: &str,
        kind: Option<ChannelKind>,
    ) -> Option<&Channel> {
        self.find_server(server)?.find_channel(name, kind)
    }

    pub fn find_channel_mut(
        &mut self,
        server: &str,
        name: &str,
        kind: Option<ChannelKind>,
    ) -> Option<&mut Channel> {
        self.find_server_mut(server)?.find_channel_mut(name, kind)
    }

    pub fn channel_exists(&self, server: &str, name: &str, kind: ChannelKind) -> bool {
        self.find_server(server)
            .is_some_and(|s| s.channel_exists(name, kind))
    }
}
