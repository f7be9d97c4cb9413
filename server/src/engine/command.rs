//! Command-line parsing.
//!
//! A line is `<command> [arguments...]`. The command token runs up to the
//! first whitespace; the rest is handed to the per-command argument parser,
//! where leading positional fields take one token each and a final free-text
//! field takes the remainder verbatim.

use std::fmt;

use super::channel::ChannelKind;
use super::error::CommandError;
use super::session::SessionState;

/// A raw line split into command token and unparsed arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    pub command: &'a str,
    pub args: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Parse a single line (without the trailing newline).
    pub fn parse(line: &'a str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        match line.split_once(char::is_whitespace) {
            Some((command, args)) => Ok(Self {
                command,
                args: args.trim_start(),
            }),
            None => Ok(Self {
                command: line,
                args: "",
            }),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    Empty,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty line"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Every command name the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    CreateUser,
    Login,
    Disconnect,
    CreateServer,
    SetServerDesc,
    SetServerInviteCode,
    ListServers,
    RemoveServer,
    EnterServer,
    LeaveServer,
    ListParticipants,
    ListChannels,
    CreateChannel,
    EnterChannel,
    LeaveChannel,
    SendMessage,
    ListMessages,
    Quit,
}

impl CommandName {
    pub const ALL: [CommandName; 18] = [
        Self::CreateUser,
        Self::Login,
        Self::Disconnect,
        Self::CreateServer,
        Self::SetServerDesc,
        Self::SetServerInviteCode,
        Self::ListServers,
        Self::RemoveServer,
        Self::EnterServer,
        Self::LeaveServer,
        Self::ListParticipants,
        Self::ListChannels,
        Self::CreateChannel,
        Self::EnterChannel,
        Self::LeaveChannel,
        Self::SendMessage,
        Self::ListMessages,
        Self::Quit,
    ];

    /// Exact, case-sensitive match on the command token.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "create-user",
            Self::Login => "login",
            Self::Disconnect => "disconnect",
            Self::CreateServer => "create-server",
            Self::SetServerDesc => "set-server-desc",
            Self::SetServerInviteCode => "set-server-invite-code",
            Self::ListServers => "list-servers",
            Self::RemoveServer => "remove-server",
            Self::EnterServer => "enter-server",
            Self::LeaveServer => "leave-server",
            Self::ListParticipants => "list-participants",
            Self::ListChannels => "list-channels",
            Self::CreateChannel => "create-channel",
            Self::EnterChannel => "enter-channel",
            Self::LeaveChannel => "leave-channel",
            Self::SendMessage => "send-message",
            Self::ListMessages => "list-messages",
            Self::Quit => "quit",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Self::CreateUser => "create-user <email> <password> <name>",
            Self::Login => "login <email> <password>",
            Self::Disconnect => "disconnect",
            Self::CreateServer => "create-server <name>",
            Self::SetServerDesc => "set-server-desc <name> <description>",
            Self::SetServerInviteCode => "set-server-invite-code <name> [code]",
            Self::ListServers => "list-servers",
            Self::RemoveServer => "remove-server <name>",
            Self::EnterServer => "enter-server <name> [code]",
            Self::LeaveServer => "leave-server",
            Self::ListParticipants => "list-participants",
            Self::ListChannels => "list-channels",
            Self::CreateChannel => "create-channel <name> <text|voice>",
            Self::EnterChannel => "enter-channel <name> [text|voice]",
            Self::LeaveChannel => "leave-channel",
            Self::SendMessage => "send-message <text>",
            Self::ListMessages => "list-messages",
            Self::Quit => "quit",
        }
    }

    /// Whether the command is legal in the given session state.
    pub fn is_allowed_in(self, state: SessionState) -> bool {
        use SessionState::*;

        match self {
            Self::Quit => true,
            Self::Disconnect => state != Guest,
            Self::CreateUser | Self::Login => state == Guest,
            Self::CreateServer
            | Self::SetServerDesc
            | Self::SetServerInviteCode
            | Self::ListServers
            | Self::RemoveServer
            | Self::EnterServer => state == LoggedIn,
            Self::LeaveServer
            | Self::ListParticipants
            | Self::ListChannels
            | Self::CreateChannel
            | Self::EnterChannel => state == InServer,
            Self::LeaveChannel => state >= InServer,
            Self::SendMessage | Self::ListMessages => state == InChannel,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parsed command with its structured arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateUser {
        email: String,
        password: String,
        name: String,
    },
    Login {
        email: String,
        password: String,
    },
    Disconnect,
    CreateServer {
        name: String,
    },
    SetServerDesc {
        name: String,
        description: String,
    },
    /// `None` removes the code and opens the server.
    SetServerInviteCode {
        name: String,
        code: Option<String>,
    },
    ListServers,
    RemoveServer {
        name: String,
    },
    EnterServer {
        name: String,
        code: Option<String>,
    },
    LeaveServer,
    ListParticipants,
    ListChannels,
    CreateChannel {
        name: String,
        kind: ChannelKind,
    },
    EnterChannel {
        name: String,
        kind: Option<ChannelKind>,
    },
    LeaveChannel,
    SendMessage {
        content: String,
    },
    ListMessages,
    Quit,
}

impl Command {
    /// Build the structured command from its name and raw argument text.
    pub fn parse(name: CommandName, args: &str) -> Result<Self, CommandError> {
        let mut args = Args::new(args);
        let usage = || CommandError::Usage(name.usage());

        let command = match name {
            CommandName::CreateUser => {
                let email = args.token().ok_or_else(usage)?;
                let password = args.token().ok_or_else(usage)?;
                let name = args.remainder().ok_or_else(usage)?;
                Self::CreateUser {
                    email,
                    password,
                    name,
                }
            }
            CommandName::Login => {
                let email = args.token().ok_or_else(usage)?;
                let password = args.token().ok_or_else(usage)?;
                args.finish().ok_or_else(usage)?;
                Self::Login { email, password }
            }
            CommandName::Disconnect => Self::Disconnect,
            // Whole remainder, so a name with spaces reaches validation.
            CommandName::CreateServer => Self::CreateServer {
                name: args.remainder().ok_or_else(usage)?,
            },
            CommandName::SetServerDesc => Self::SetServerDesc {
                name: args.token().ok_or_else(usage)?,
                description: args.remainder().unwrap_or_default(),
            },
            CommandName::SetServerInviteCode => {
                let name = args.token().ok_or_else(usage)?;
                let code = args.token();
                args.finish().ok_or_else(usage)?;
                Self::SetServerInviteCode { name, code }
            }
            CommandName::ListServers => Self::ListServers,
            CommandName::RemoveServer => {
                let name = args.token().ok_or_else(usage)?;
                args.finish().ok_or_else(usage)?;
                Self::RemoveServer { name }
            }
            CommandName::EnterServer => {
                let name = args.token().ok_or_else(usage)?;
                let code = args.token();
                args.finish().ok_or_else(usage)?;
                Self::EnterServer { name, code }
            }
            CommandName::LeaveServer => Self::LeaveServer,
            CommandName::ListParticipants => Self::ListParticipants,
            CommandName::ListChannels => Self::ListChannels,
            CommandName::CreateChannel => {
                let name = args.token().ok_or_else(usage)?;
                let kind = args.token().ok_or_else(usage)?;
                args.finish().ok_or_else(usage)?;
                Self::CreateChannel {
                    name,
                    kind: parse_kind(&kind)?,
                }
            }
            CommandName::EnterChannel => {
                let name = args.token().ok_or_else(usage)?;
                let kind = args.token();
                args.finish().ok_or_else(usage)?;
                Self::EnterChannel {
                    name,
                    kind: kind.map(|k| parse_kind(&k)).transpose()?,
                }
            }
            CommandName::LeaveChannel => Self::LeaveChannel,
            CommandName::SendMessage => Self::SendMessage {
                content: args.remainder().ok_or_else(usage)?,
            },
            CommandName::ListMessages => Self::ListMessages,
            CommandName::Quit => Self::Quit,
        };

        Ok(command)
    }

    pub fn name(&self) -> CommandName {
        match self {
            Self::CreateUser { .. } => CommandName::CreateUser,
            Self::Login { .. } => CommandName::Login,
            Self::Disconnect => CommandName::Disconnect,
            Self::CreateServer { .. } => CommandName::CreateServer,
            Self::SetServerDesc { .. } => CommandName::SetServerDesc,
            Self::SetServerInviteCode { .. } => CommandName::SetServerInviteCode,
            Self::ListServers => CommandName::ListServers,
            Self::RemoveServer { .. } => CommandName::RemoveServer,
            Self::EnterServer { .. } => CommandName::EnterServer,
            Self::LeaveServer => CommandName::LeaveServer,
            Self::ListParticipants => CommandName::ListParticipants,
            Self::ListChannels => CommandName::ListChannels,
            Self::CreateChannel { .. } => CommandName::CreateChannel,
            Self::EnterChannel { .. } => CommandName::EnterChannel,
            Self::LeaveChannel => CommandName::LeaveChannel,
            Self::SendMessage { .. } => CommandName::SendMessage,
            Self::ListMessages => CommandName::ListMessages,
            Self::Quit => CommandName::Quit,
        }
    }
}

fn parse_kind(s: &str) -> Result<ChannelKind, CommandError> {
    ChannelKind::parse(s).ok_or_else(|| CommandError::InvalidChannelKind(s.to_string()))
}

/// Cursor over the argument text.
struct Args<'a> {
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            rest: raw.trim_start(),
        }
    }

    /// Next whitespace-delimited token.
    fn token(&mut self) -> Option<String> {
        if self.rest.is_empty() {
            return None;
        }
        let (token, rest) = self
            .rest
            .split_once(char::is_whitespace)
            .unwrap_or((self.rest, ""));
        self.rest = rest.trim_start();
        Some(token.to_string())
    }

    /// `Some` when every token has been consumed.
    fn finish(&self) -> Option<()> {
        self.rest.is_empty().then_some(())
    }

    /// Everything left, verbatim. `None` if nothing is left.
    fn remainder(self) -> Option<String> {
        (!self.rest.is_empty()).then(|| self.rest.to_string())
    }
}
