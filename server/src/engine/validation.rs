/// Default maximum message content length (bytes).
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Default maximum length for user, server and channel names.
pub const MAX_NAME_LENGTH: usize = 64;

/// Size limits applied to user input. Configurable through `[limits]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_message_length: usize,
    pub max_name_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_length: MAX_MESSAGE_LENGTH,
            max_name_length: MAX_NAME_LENGTH,
        }
    }
}

/// Validate an email address. Must look like `user@server.domain`.
pub fn validate_email(email: &str) -> Result<(), String> {
    let invalid = || format!("Invalid email address: {email}");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, host) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || host.contains('@') {
        return Err(invalid());
    }
    let (server, domain) = host.split_once('.').ok_or_else(invalid)?;
    if server.is_empty() || domain.is_empty() || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// Validate a user's display name. Spaces are allowed.
pub fn validate_user_name(name: &str, limits: &Limits) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("User name cannot be empty".into());
    }
    if name.len() > limits.max_name_length {
        return Err(format!(
            "User name too long (max {} characters)",
            limits.max_name_length
        ));
    }
    Ok(())
}

/// Validate a server name. Single token, bounded length.
pub fn validate_server_name(name: &str, limits: &Limits) -> Result<(), String> {
    validate_token("Server", name, limits)
}

/// Validate a channel name. Single token, bounded length.
pub fn validate_channel_name(name: &str, limits: &Limits) -> Result<(), String> {
    validate_token("Channel", name, limits)
}

fn validate_token(what: &str, name: &str, limits: &Limits) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{what} name cannot be empty"));
    }
    if name.len() > limits.max_name_length {
        return Err(format!(
            "{what} name too long (max {} characters)",
            limits.max_name_length
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("{what} name cannot contain spaces"));
    }
    Ok(())
}

/// Validate message content. Must be non-empty and under the length limit.
pub fn validate_message(content: &str, limits: &Limits) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Message cannot be empty".into());
    }
    if content.len() > limits.max_message_length {
        return Err(format!(
            "Message too long (max {} characters)",
            limits.max_message_length
        ));
    }
    Ok(())
}
