//! Feedback rendering. All functions return lines ready to write (caller
//! appends the newline).

use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::engine::error::CommandError;
use crate::engine::outcome::{MessageView, Outcome};
use crate::engine::system::CommandResult;

/// Printed when the session ends on `quit` or end of input.
pub const FAREWELL: &str = "Leaving Concordo";

/// Printed when an input line exceeds the read limit.
pub const LINE_TOO_LONG: &str = "Line too long";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How feedback is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render the result of one command as a feedback block.
pub fn render(result: &CommandResult, mode: OutputMode) -> Vec<String> {
    match (result, mode) {
        (Ok(outcome), OutputMode::Text) => outcome_lines(outcome),
        (Err(err), OutputMode::Text) => vec![err.to_string()],
        (Ok(outcome), OutputMode::Json) => vec![outcome_json(outcome)],
        (Err(err), OutputMode::Json) => vec![error_json(err)],
    }
}

/// A one-off notice outside any command (farewell, oversized line).
pub fn notice(text: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Text => text.to_string(),
        OutputMode::Json => json!({ "type": "notice", "message": text }).to_string(),
    }
}

pub fn outcome_lines(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::UserCreated { .. } => vec!["User created".into()],
        Outcome::LoggedIn { email } => vec![format!("Logged-in as {email}")],
        Outcome::Disconnected { email } => vec![format!("Disconnecting user {email}")],
        Outcome::ServerCreated { .. } => vec!["Server created".into()],
        Outcome::DescriptionChanged { server } => {
            vec![format!("Description of server '{server}' was changed!")]
        }
        Outcome::InviteCodeChanged { server, removed } => {
            let what = if *removed { "removed" } else { "changed" };
            vec![format!("Invite code of server '{server}' was {what}!")]
        }
        Outcome::ServerList { servers } if servers.is_empty() => {
            vec!["No servers to show".into()]
        }
        Outcome::ServerList { servers } => servers.clone(),
        Outcome::ServerRemoved { name } => vec![format!("Server '{name}' was removed")],
        Outcome::ServerJoined { .. } => vec!["Joined server with success".into()],
        Outcome::ServerLeft { name } => vec![format!("Leaving server '{name}'")],
        Outcome::Participants { names } => names.clone(),
        Outcome::ChannelList { text, voice } => {
            let mut lines = Vec::with_capacity(text.len() + voice.len() + 2);
            lines.push("#Text Channels".to_string());
            lines.extend(text.iter().cloned());
            lines.push("#Voice Channels".to_string());
            lines.extend(voice.iter().cloned());
            lines
        }
        Outcome::ChannelCreated { name, kind } => {
            vec![format!("{} Channel '{name}' created", kind.label())]
        }
        Outcome::ChannelJoined { name, .. } => vec![format!("Joined '{name}' channel")],
        Outcome::ChannelLeft { .. } => vec!["Leaving channel".into()],
        Outcome::MessageSent { .. } => vec!["Message sent".into()],
        Outcome::MessageList { messages } if messages.is_empty() => {
            vec!["No message to show".into()]
        }
        Outcome::MessageList { messages } => messages.iter().map(message_line).collect(),
        Outcome::Farewell => vec![FAREWELL.into()],
    }
}

/// Alice<2024-01-01 12:00:00>: hello
pub fn message_line(message: &MessageView) -> String {
    format!(
        "{}<{}>: {}",
        message.sender,
        message.timestamp.format(TIMESTAMP_FORMAT),
        message.content
    )
}

fn outcome_json(outcome: &Outcome) -> String {
    match serde_json::to_string(outcome) {
        Ok(line) => line,
        Err(e) => {
            error!(error = %e, "failed to serialize outcome");
            json!({ "type": "error", "kind": "internal", "message": e.to_string() }).to_string()
        }
    }
}

fn error_json(err: &CommandError) -> String {
    json!({
        "type": "error",
        "kind": err.kind(),
        "message": err.to_string(),
    })
    .to_string()
}
