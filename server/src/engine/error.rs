use serde::Serialize;
use thiserror::Error;

use super::channel::ChannelKind;

/// Broad failure category of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    InvalidState,
    BadCredentials,
    InvalidArgument,
}

/// Why a command was rejected. None of these are fatal: the command is a
/// no-op and the `Display` text is reported back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    // ── InvalidState ──
    #[error("Invalid command")]
    UnknownCommand,
    #[error("You have to login to run that command")]
    LoginRequired,
    #[error("You can't do that right now")]
    NotAllowedNow,
    #[error("Not connected")]
    NotConnected,
    #[error("You are not visualizing any channel")]
    NotInChannel,

    // ── BadCredentials ──
    #[error("User or password invalid!")]
    BadCredentials,

    // ── Conflict ──
    #[error("User already exist!")]
    UserExists,
    #[error("There is already a server with that name")]
    ServerExists,
    #[error("{} Channel '{}' already exists", .kind.label(), .name)]
    ChannelExists { name: String, kind: ChannelKind },

    // ── NotFound ──
    #[error("Server '{0}' doesn't exist")]
    ServerNotFound(String),
    #[error("Channel '{0}' doesn't exist")]
    ChannelNotFound(String),

    // ── Forbidden ──
    #[error("You can't change the description of a server that isn't yours")]
    DescriptionForbidden,
    #[error("You can't change the invite code of a server that isn't yours")]
    InviteCodeForbidden,
    #[error("You can't remove a server that isn't yours")]
    RemoveForbidden,
    #[error("Server requires invite code")]
    InviteRequired,

    // ── InvalidArgument ──
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid channel type '{0}' (expected text or voice)")]
    InvalidChannelKind(String),
    #[error("{0}")]
    Invalid(String),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCommand
            | Self::LoginRequired
            | Self::NotAllowedNow
            | Self::NotConnected
            | Self::NotInChannel => ErrorKind::InvalidState,
            Self::BadCredentials => ErrorKind::BadCredentials,
            Self::UserExists | Self::ServerExists | Self::ChannelExists { .. } => {
                ErrorKind::Conflict
            }
            Self::ServerNotFound(_) | Self::ChannelNotFound(_) => ErrorKind::NotFound,
            Self::DescriptionForbidden
            | Self::InviteCodeForbidden
            | Self::RemoveForbidden
            | Self::InviteRequired => ErrorKind::Forbidden,
            Self::Usage(_) | Self::InvalidChannelKind(_) | Self::Invalid(_) => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

impl From<String> for CommandError {
    fn from(msg: String) -> Self {
        Self::Invalid(msg)
    }
}
