use std::fmt;

use serde::Serialize;

use super::message::Message;

/// The two kinds of channel a server can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
}

impl ChannelKind {
    /// Parse a kind argument (`text` / `voice`, case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("text") {
            Some(Self::Text)
        } else if s.eq_ignore_ascii_case("voice") {
            Some(Self::Voice)
        } else {
            None
        }
    }

    /// Capitalized label used in feedback lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Voice => "Voice",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Voice => write!(f, "voice"),
        }
    }
}

/// A channel inside a server.
///
/// Text channels keep every message in send order. Voice channels only keep
/// the most recent one: each send overwrites the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Text { name: String, messages: Vec<Message> },
    Voice { name: String, last: Option<Message> },
}

impl Channel {
    pub fn new(name: String, kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Text => Self::Text {
                name,
                messages: Vec::new(),
            },
            ChannelKind::Voice => Self::Voice { name, last: None },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::Voice { name, .. } => name,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Text { .. } => ChannelKind::Text,
            Self::Voice { .. } => ChannelKind::Voice,
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name() == name
    }

    /// Name match, optionally narrowed to one kind.
    pub fn matches(&self, name: &str, kind: Option<ChannelKind>) -> bool {
        self.matches_name(name) && kind.is_none_or(|k| k == self.kind())
    }

    pub fn send(&mut self, message: Message) {
        match self {
            Self::Text { messages, .. } => messages.push(message),
            Self::Voice { last, .. } => *last = Some(message),
        }
    }

    /// Snapshot view of the stored messages. At most one for voice channels.
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::Text { messages, .. } => messages,
            Self::Voice { last, .. } => last.as_slice(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}
