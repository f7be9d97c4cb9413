use tracing::{debug, info};

use super::channel::{Channel, ChannelKind};
use super::command::{Command, CommandLine, CommandName};
use super::directory::Directory;
use super::error::CommandError;
use super::message::Message;
use super::outcome::{MessageView, Outcome};
use super::server::Server;
use super::session::{ChannelRef, Session, SessionState};
use super::user::{User, UserId, UserLookup};
use super::validation::{self, Limits};

pub type CommandResult = Result<Outcome, CommandError>;

/// The command dispatcher and session state machine.
///
/// Sole mutator of the directory. Every command either succeeds with an
/// [`Outcome`] or fails with a [`CommandError`] and changes nothing.
pub struct System {
    directory: Directory,
    session: Session,
    limits: Limits,
}

impl System {
    pub fn new(directory: Directory, limits: Limits) -> Self {
        Self {
            directory,
            session: Session::default(),
            limits,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Parse and run one input line.
    pub fn execute(&mut self, line: &str) -> CommandResult {
        let line = CommandLine::parse(line).map_err(|_| CommandError::UnknownCommand)?;
        let name = CommandName::parse(line.command).ok_or(CommandError::UnknownCommand)?;
        self.check_allowed(name)?;
        let command = Command::parse(name, line.args)?;
        self.run(command)
    }

    fn check_allowed(&self, name: CommandName) -> Result<(), CommandError> {
        let state = self.state();
        if name.is_allowed_in(state) {
            return Ok(());
        }
        debug!(command = %name, ?state, "command not allowed in current state");
        Err(match (name, state) {
            (CommandName::Disconnect, SessionState::Guest) => CommandError::NotConnected,
            (_, SessionState::Guest) => CommandError::LoginRequired,
            _ => CommandError::NotAllowedNow,
        })
    }

    /// Run an already-parsed command, enforcing the state table.
    pub fn run(&mut self, command: Command) -> CommandResult {
        self.check_allowed(command.name())?;

        match command {
            Command::CreateUser {
                email,
                password,
                name,
            } => self.create_user(email, password, name),
            Command::Login { email, password } => self.login(&email, &password),
            Command::Disconnect => self.disconnect(),
            Command::CreateServer { name } => self.create_server(name),
            Command::SetServerDesc { name, description } => {
                self.change_description(&name, description)
            }
            Command::SetServerInviteCode { name, code } => self.change_invite(&name, code),
            Command::ListServers => Ok(self.list_servers()),
            Command::RemoveServer { name } => self.remove_server(&name),
            Command::EnterServer { name, code } => self.enter_server(name, code.as_deref()),
            Command::LeaveServer => self.leave_server(),
            Command::ListParticipants => self.list_participants(),
            Command::ListChannels => self.list_channels(),
            Command::CreateChannel { name, kind } => self.create_channel(name, kind),
            Command::EnterChannel { name, kind } => self.enter_channel(&name, kind),
            Command::LeaveChannel => self.leave_channel(),
            Command::SendMessage { content } => self.send_message(content),
            Command::ListMessages => self.list_messages(),
            Command::Quit => Ok(Outcome::Farewell),
        }
    }

    // ── Session resolution ──────────────────────────────────────────

    fn current_user_id(&self) -> Result<UserId, CommandError> {
        self.session.user_id().ok_or(CommandError::NotConnected)
    }

    fn current_user(&self) -> Result<&User, CommandError> {
        let id = self.current_user_id()?;
        self.directory
            .find_user(UserLookup::Id(id))
            .ok_or(CommandError::NotConnected)
    }

    fn current_server_name(&self) -> Result<&str, CommandError> {
        self.session.server().ok_or(CommandError::NotAllowedNow)
    }

    fn current_server(&self) -> Result<&Server, CommandError> {
        let name = self.current_server_name()?;
        self.directory
            .find_server(name)
            .ok_or_else(|| CommandError::ServerNotFound(name.to_string()))
    }

    fn current_server_mut(&mut self) -> Result<&mut Server, CommandError> {
        let name = self.session.server().ok_or(CommandError::NotAllowedNow)?;
        self.directory
            .find_server_mut(name)
            .ok_or_else(|| CommandError::ServerNotFound(name.to_string()))
    }

    fn current_channel(&self) -> Result<&Channel, CommandError> {
        let channel = self.session.channel().ok_or(CommandError::NotInChannel)?;
        self.current_server()?
            .find_channel(&channel.name, Some(channel.kind))
            .ok_or_else(|| CommandError::ChannelNotFound(channel.name.clone()))
    }

    fn current_channel_mut(&mut self) -> Result<&mut Channel, CommandError> {
        let server = self.session.server().ok_or(CommandError::NotAllowedNow)?;
        let channel = self.session.channel().ok_or(CommandError::NotInChannel)?;
        self.directory
            .find_channel_mut(server, &channel.name, Some(channel.kind))
            .ok_or_else(|| CommandError::ChannelNotFound(channel.name.clone()))
    }

    // ── Users ───────────────────────────────────────────────────────

    fn create_user(&mut self, email: String, password: String, name: String) -> CommandResult {
        validation::validate_email(&email)?;
        validation::validate_user_name(&name, &self.limits)?;

        if self.directory.user_exists(&email) {
            debug!(%email, "rejected duplicate email");
            return Err(CommandError::UserExists);
        }

        let id = self.directory.insert_user(name, email.clone(), password);
        info!(user_id = id, %email, "user created");
        Ok(Outcome::UserCreated { id, email })
    }

    fn login(&mut self, email: &str, password: &str) -> CommandResult {
        let user = self
            .directory
            .users()
            .iter()
            .find(|u| u.check_credentials(email, password))
            .ok_or(CommandError::BadCredentials)?;

        let user_id = user.id;
        self.session.login(user_id);
        info!(user_id, %email, "logged in");
        Ok(Outcome::LoggedIn {
            email: email.to_string(),
        })
    }

    fn disconnect(&mut self) -> CommandResult {
        let email = self
            .current_user()
            .map(|u| u.email.clone())
            .unwrap_or_default();
        self.session.disconnect();
        info!(%email, "disconnected");
        Ok(Outcome::Disconnected { email })
    }

    // ── Servers ─────────────────────────────────────────────────────

    fn create_server(&mut self, name: String) -> CommandResult {
        validation::validate_server_name(&name, &self.limits)?;
        let owner_id = self.current_user_id()?;

        if self.directory.server_exists(&name) {
            return Err(CommandError::ServerExists);
        }

        self.directory.insert_server(Server::new(owner_id, name.clone()));
        info!(server = %name, owner_id, "server created");
        Ok(Outcome::ServerCreated { name })
    }

    /// Look up a server the caller must own, or fail with `forbidden`.
    fn owned_server_mut(
        &mut self,
        name: &str,
        forbidden: CommandError,
    ) -> Result<&mut Server, CommandError> {
        let user_id = self.current_user_id()?;
        let server = self
            .directory
            .find_server_mut(name)
            .ok_or_else(|| CommandError::ServerNotFound(name.to_string()))?;
        if !server.is_owned_by(user_id) {
            debug!(server = %name, user_id, "non-owner attempted server change");
            return Err(forbidden);
        }
        Ok(server)
    }

    fn change_description(&mut self, name: &str, description: String) -> CommandResult {
        let server = self.owned_server_mut(name, CommandError::DescriptionForbidden)?;
        server.description = description;
        info!(server = %name, "description changed");
        Ok(Outcome::DescriptionChanged {
            server: name.to_string(),
        })
    }

    fn change_invite(&mut self, name: &str, code: Option<String>) -> CommandResult {
        let server = self.owned_server_mut(name, CommandError::InviteCodeForbidden)?;
        server.invite_code = code.unwrap_or_default();
        let removed = !server.has_invite();
        info!(server = %name, removed, "invite code changed");
        Ok(Outcome::InviteCodeChanged {
            server: name.to_string(),
            removed,
        })
    }

    fn list_servers(&self) -> Outcome {
        Outcome::ServerList {
            servers: self
                .directory
                .servers()
                .iter()
                .map(|s| s.name.clone())
                .collect(),
        }
    }

    fn remove_server(&mut self, name: &str) -> CommandResult {
        self.owned_server_mut(name, CommandError::RemoveForbidden)?;
        self.directory.remove_server(name);
        info!(server = %name, "server removed");
        Ok(Outcome::ServerRemoved {
            name: name.to_string(),
        })
    }

    fn enter_server(&mut self, name: String, code: Option<&str>) -> CommandResult {
        let user_id = self.current_user_id()?;
        let server = self
            .directory
            .find_server_mut(&name)
            .ok_or_else(|| CommandError::ServerNotFound(name.clone()))?;

        if !server.admits(user_id, code) {
            debug!(server = %name, user_id, "invite code required");
            return Err(CommandError::InviteRequired);
        }

        let new_member = server.add_member(user_id);
        self.session.enter_server(name.clone());
        info!(server = %name, user_id, new_member, "entered server");
        Ok(Outcome::ServerJoined { name, new_member })
    }

    fn leave_server(&mut self) -> CommandResult {
        let name = self.current_server_name()?.to_string();
        self.session.leave_server();
        Ok(Outcome::ServerLeft { name })
    }

    fn list_participants(&self) -> CommandResult {
        let server = self.current_server()?;
        let names = server
            .members()
            .iter()
            .filter_map(|id| self.directory.user_name(*id))
            .map(str::to_string)
            .collect();
        Ok(Outcome::Participants { names })
    }

    // ── Channels ────────────────────────────────────────────────────

    fn list_channels(&self) -> CommandResult {
        let server = self.current_server()?;
        let names = |kind: ChannelKind| -> Vec<String> {
            server
                .channels_of(kind)
                .map(|c| c.name().to_string())
                .collect()
        };
        Ok(Outcome::ChannelList {
            text: names(ChannelKind::Text),
            voice: names(ChannelKind::Voice),
        })
    }

    fn create_channel(&mut self, name: String, kind: ChannelKind) -> CommandResult {
        validation::validate_channel_name(&name, &self.limits)?;
        let server = self.current_server_mut()?;

        if server.channel_exists(&name, kind) {
            return Err(CommandError::ChannelExists { name, kind });
        }

        server.add_channel(Channel::new(name.clone(), kind));
        info!(server = %server.name, channel = %name, %kind, "channel created");
        Ok(Outcome::ChannelCreated { name, kind })
    }

    fn enter_channel(&mut self, name: &str, kind: Option<ChannelKind>) -> CommandResult {
        let kind = self
            .current_server()?
            .find_channel(name, kind)
            .map(Channel::kind)
            .ok_or_else(|| CommandError::ChannelNotFound(name.to_string()))?;

        self.session.enter_channel(ChannelRef {
            name: name.to_string(),
            kind,
        });
        Ok(Outcome::ChannelJoined {
            name: name.to_string(),
            kind,
        })
    }

    fn leave_channel(&mut self) -> CommandResult {
        let name = self
            .session
            .channel()
            .map(|c| c.name.clone())
            .ok_or(CommandError::NotInChannel)?;
        self.session.leave_channel();
        Ok(Outcome::ChannelLeft { name })
    }

    // ── Messages ────────────────────────────────────────────────────

    fn send_message(&mut self, content: String) -> CommandResult {
        validation::validate_message(&content, &self.limits)?;
        let sender_id = self.current_user_id()?;
        let channel = self.current_channel_mut()?;

        channel.send(Message::new(sender_id, content));
        debug!(channel = %channel.name(), sender_id, "message sent");
        Ok(Outcome::MessageSent {
            channel: channel.name().to_string(),
        })
    }

    fn list_messages(&self) -> CommandResult {
        let channel = self.current_channel()?;
        let messages = channel
            .messages()
            .iter()
            .map(|m| MessageView {
                sender: self
                    .directory
                    .user_name(m.sender_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("user#{}", m.sender_id)),
                content: m.content.clone(),
                timestamp: m.timestamp,
            })
            .collect();
        Ok(Outcome::MessageList { messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> System {
        System::new(Directory::new(), Limits::default())
    }

    /// Run a sequence of lines, panicking on the first failure.
    fn run_all(sys: &mut System, lines: &[&str]) {
        for line in lines {
            if let Err(e) = sys.execute(line) {
                panic!("{line:?} failed: {e}");
            }
        }
    }

    /// System with alice (id 1) and bob (id 2) registered, nobody logged in.
    fn with_two_users() -> System {
        let mut sys = system();
        run_all(
            &mut sys,
            &[
                "create-user alice@x.com pw Alice",
                "create-user bob@x.com pw Bob",
            ],
        );
        sys
    }

    #[test]
    fn test_create_user_rejects_duplicate_email() {
        let mut sys = system();
        assert_eq!(
            sys.execute("create-user alice@x.com pw Alice"),
            Ok(Outcome::UserCreated {
                id: 1,
                email: "alice@x.com".into()
            })
        );
        assert_eq!(
            sys.execute("create-user alice@x.com pw2 Alice2"),
            Err(CommandError::UserExists)
        );
        assert_eq!(sys.directory().users().len(), 1);
        assert_eq!(sys.state(), SessionState::Guest);
    }

    #[test]
    fn test_create_user_validates_email() {
        let mut sys = system();
        assert!(matches!(
            sys.execute("create-user not-an-email pw Alice"),
            Err(CommandError::Invalid(_))
        ));
        assert!(sys.directory().users().is_empty());
    }

    #[test]
    fn test_login_requires_exact_credentials() {
        let mut sys = with_two_users();
        assert_eq!(
            sys.execute("login alice@x.com wrong"),
            Err(CommandError::BadCredentials)
        );
        assert_eq!(
            sys.execute("login carol@x.com pw"),
            Err(CommandError::BadCredentials)
        );
        assert_eq!(sys.state(), SessionState::Guest);

        assert!(sys.execute("login alice@x.com pw").is_ok());
        assert_eq!(sys.state(), SessionState::LoggedIn);
        assert_eq!(sys.session().user_id(), Some(1));
    }

    #[test]
    fn test_unknown_and_illegal_commands() {
        let mut sys = with_two_users();
        assert_eq!(sys.execute("dance"), Err(CommandError::UnknownCommand));
        assert_eq!(sys.execute("   "), Err(CommandError::UnknownCommand));
        assert_eq!(
            sys.execute("create-server S1"),
            Err(CommandError::LoginRequired)
        );
        assert_eq!(sys.execute("disconnect"), Err(CommandError::NotConnected));

        run_all(&mut sys, &["login alice@x.com pw"]);
        assert_eq!(
            sys.execute("login bob@x.com pw"),
            Err(CommandError::NotAllowedNow)
        );
        assert_eq!(
            sys.execute("send-message hi"),
            Err(CommandError::NotAllowedNow)
        );
        assert_eq!(sys.state(), SessionState::LoggedIn);
    }

    #[test]
    fn test_create_server_and_disconnect() {
        let mut sys = with_two_users();
        run_all(&mut sys, &["login alice@x.com pw"]);
        assert_eq!(
            sys.execute("create-server S1"),
            Ok(Outcome::ServerCreated { name: "S1".into() })
        );
        assert_eq!(
            sys.execute("create-server S1"),
            Err(CommandError::ServerExists)
        );

        let server = sys.directory().find_server("S1").unwrap();
        assert!(server.is_owned_by(1));
        assert!(server.has_member(1));

        assert_eq!(
            sys.execute("disconnect"),
            Ok(Outcome::Disconnected {
                email: "alice@x.com".into()
            })
        );
        assert_eq!(*sys.session(), Session::Guest);
    }

    #[test]
    fn test_only_owner_mutates_server() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "disconnect",
                "login bob@x.com pw",
            ],
        );

        assert_eq!(
            sys.execute("set-server-desc S1 hijacked"),
            Err(CommandError::DescriptionForbidden)
        );
        assert_eq!(
            sys.execute("set-server-invite-code S1 abc"),
            Err(CommandError::InviteCodeForbidden)
        );
        assert_eq!(
            sys.execute("remove-server S1"),
            Err(CommandError::RemoveForbidden)
        );
        assert_eq!(
            sys.execute("remove-server S9"),
            Err(CommandError::ServerNotFound("S9".into()))
        );

        let server = sys.directory().find_server("S1").unwrap();
        assert_eq!(server.description, "");
        assert!(!server.has_invite());
    }

    #[test]
    fn test_extra_arguments_change_nothing() {
        let mut sys = with_two_users();
        run_all(&mut sys, &["login alice@x.com pw", "create-server My"]);

        assert!(matches!(
            sys.execute("create-server My Server"),
            Err(CommandError::Invalid(_))
        ));
        assert!(matches!(
            sys.execute("remove-server My Server"),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            sys.execute("set-server-invite-code My a b"),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            sys.execute("enter-server My a b"),
            Err(CommandError::Usage(_))
        ));
        let names: Vec<&str> = sys
            .directory()
            .servers()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["My"]);
        assert!(!sys.directory().find_server("My").unwrap().has_invite());
        assert_eq!(sys.state(), SessionState::LoggedIn);

        run_all(&mut sys, &["enter-server My"]);
        assert!(matches!(
            sys.execute("create-channel a b text"),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            sys.execute("create-channel a text junk"),
            Err(CommandError::Usage(_))
        ));
        assert!(sys.directory().find_server("My").unwrap().channels().is_empty());
    }

    #[test]
    fn test_owner_changes_description_and_invite() {
        let mut sys = with_two_users();
        run_all(&mut sys, &["login alice@x.com pw", "create-server S1"]);

        assert_eq!(
            sys.execute("set-server-desc S1 Rust   talk"),
            Ok(Outcome::DescriptionChanged { server: "S1".into() })
        );
        assert_eq!(
            sys.execute("set-server-invite-code S1 xyz"),
            Ok(Outcome::InviteCodeChanged {
                server: "S1".into(),
                removed: false
            })
        );
        let server = sys.directory().find_server("S1").unwrap();
        assert_eq!(server.description, "Rust   talk");
        assert_eq!(server.invite_code, "xyz");

        assert_eq!(
            sys.execute("set-server-invite-code S1"),
            Ok(Outcome::InviteCodeChanged {
                server: "S1".into(),
                removed: true
            })
        );
        assert!(!sys.directory().find_server("S1").unwrap().has_invite());
    }

    #[test]
    fn test_remove_server_cascades() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "enter-server S1",
                "create-channel general text",
                "enter-channel general",
                "send-message hello",
                "disconnect",
                "login alice@x.com pw",
            ],
        );
        assert_eq!(
            sys.execute("remove-server S1"),
            Ok(Outcome::ServerRemoved { name: "S1".into() })
        );
        assert!(sys.directory().servers().is_empty());
        assert_eq!(
            sys.execute("enter-server S1"),
            Err(CommandError::ServerNotFound("S1".into()))
        );
    }

    #[test]
    fn test_invite_code_flow() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "set-server-invite-code S1 xyz",
                "disconnect",
                "login bob@x.com pw",
            ],
        );

        assert_eq!(
            sys.execute("enter-server S1"),
            Err(CommandError::InviteRequired)
        );
        assert_eq!(
            sys.execute("enter-server S1 nope"),
            Err(CommandError::InviteRequired)
        );
        assert!(sys.session().server().is_none());

        assert_eq!(
            sys.execute("enter-server S1 xyz"),
            Ok(Outcome::ServerJoined {
                name: "S1".into(),
                new_member: true
            })
        );
        assert_eq!(sys.state(), SessionState::InServer);
        assert!(sys.directory().find_server("S1").unwrap().has_member(2));

        // Members come back without the code.
        run_all(&mut sys, &["leave-server"]);
        assert_eq!(
            sys.execute("enter-server S1"),
            Ok(Outcome::ServerJoined {
                name: "S1".into(),
                new_member: false
            })
        );
    }

    #[test]
    fn test_leave_server_keeps_membership() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "disconnect",
                "login bob@x.com pw",
                "enter-server S1",
            ],
        );
        assert_eq!(
            sys.execute("leave-server"),
            Ok(Outcome::ServerLeft { name: "S1".into() })
        );
        assert_eq!(sys.state(), SessionState::LoggedIn);
        assert!(sys.directory().find_server("S1").unwrap().has_member(2));
        assert_eq!(sys.execute("leave-server"), Err(CommandError::NotAllowedNow));
    }

    #[test]
    fn test_list_participants_in_join_order() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login bob@x.com pw",
                "create-server S1",
                "disconnect",
                "login alice@x.com pw",
                "enter-server S1",
            ],
        );
        assert_eq!(
            sys.execute("list-participants"),
            Ok(Outcome::Participants {
                names: vec!["Bob".into(), "Alice".into()]
            })
        );
    }

    #[test]
    fn test_channels_unique_by_name_and_kind() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &["login alice@x.com pw", "create-server S1", "enter-server S1"],
        );

        assert!(sys.execute("create-channel general text").is_ok());
        assert_eq!(
            sys.execute("create-channel general text"),
            Err(CommandError::ChannelExists {
                name: "general".into(),
                kind: ChannelKind::Text
            })
        );
        assert!(sys.execute("create-channel general voice").is_ok());
        assert!(sys.execute("create-channel lobby voice").is_ok());

        assert_eq!(
            sys.execute("list-channels"),
            Ok(Outcome::ChannelList {
                text: vec!["general".into()],
                voice: vec!["general".into(), "lobby".into()],
            })
        );
    }

    #[test]
    fn test_enter_and_leave_channel() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "enter-server S1",
                "create-channel general text",
                "create-channel general voice",
            ],
        );

        assert_eq!(
            sys.execute("leave-channel"),
            Err(CommandError::NotInChannel)
        );
        assert_eq!(
            sys.execute("enter-channel random"),
            Err(CommandError::ChannelNotFound("random".into()))
        );
        assert_eq!(
            sys.execute("enter-channel general voice"),
            Ok(Outcome::ChannelJoined {
                name: "general".into(),
                kind: ChannelKind::Voice
            })
        );
        assert_eq!(sys.state(), SessionState::InChannel);
        assert_eq!(
            sys.execute("leave-channel"),
            Ok(Outcome::ChannelLeft {
                name: "general".into()
            })
        );
        assert_eq!(sys.state(), SessionState::InServer);

        // Without a kind, the first-created channel wins.
        run_all(&mut sys, &["enter-channel general"]);
        assert_eq!(
            sys.session().channel().map(|c| c.kind),
            Some(ChannelKind::Text)
        );
    }

    #[test]
    fn test_text_channel_preserves_send_order() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "enter-server S1",
                "create-channel general text",
                "enter-channel general",
            ],
        );
        assert_eq!(
            sys.execute("list-messages"),
            Ok(Outcome::MessageList { messages: vec![] })
        );

        run_all(
            &mut sys,
            &[
                "send-message first",
                "send-message second  with   spaces",
                "send-message third",
            ],
        );

        let Ok(Outcome::MessageList { messages }) = sys.execute("list-messages") else {
            panic!("expected message list");
        };
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second  with   spaces", "third"]);
        assert!(messages.iter().all(|m| m.sender == "Alice"));
    }

    #[test]
    fn test_voice_channel_exposes_only_last_message() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "enter-server S1",
                "create-channel lobby voice",
                "enter-channel lobby",
            ],
        );
        for i in 1..=4 {
            run_all(&mut sys, &[format!("send-message take {i}").as_str()]);
        }

        let Ok(Outcome::MessageList { messages }) = sys.execute("list-messages") else {
            panic!("expected message list");
        };
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "take 4");
    }

    #[test]
    fn test_send_message_validation() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "enter-server S1",
                "create-channel general text",
                "enter-channel general",
            ],
        );
        let long = format!("send-message {}", "x".repeat(2001));
        assert!(matches!(sys.execute(&long), Err(CommandError::Invalid(_))));
        assert_eq!(
            sys.execute("list-messages"),
            Ok(Outcome::MessageList { messages: vec![] })
        );
    }

    #[test]
    fn test_disconnect_from_channel_clears_session() {
        let mut sys = with_two_users();
        run_all(
            &mut sys,
            &[
                "login alice@x.com pw",
                "create-server S1",
                "enter-server S1",
                "create-channel general text",
                "enter-channel general",
                "disconnect",
            ],
        );
        assert_eq!(*sys.session(), Session::Guest);
        assert_eq!(
            sys.execute("list-messages"),
            Err(CommandError::LoginRequired)
        );
    }

    #[test]
    fn test_quit_is_always_allowed() {
        let mut sys = system();
        assert_eq!(sys.execute("quit"), Ok(Outcome::Farewell));
        assert_eq!(sys.run(Command::Quit), Ok(Outcome::Farewell));
    }

    #[test]
    fn test_run_enforces_state_table() {
        let mut sys = system();
        assert_eq!(
            sys.run(Command::ListServers),
            Err(CommandError::LoginRequired)
        );
    }
}
