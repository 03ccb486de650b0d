//! Response formatting
//!
//! Client-facing reply and message strings for the chat protocol.
//! Replies are complete lines with the newline included; the two
//! bootstrap prompts deliberately carry none so the client cursor stays
//! on the prompt line.

use crate::error::{GroupError, RouteError};

pub const USERNAME_PROMPT: &str = "Enter username: ";
pub const PASSWORD_PROMPT: &str = "Enter password: ";

pub const WELCOME: &str = "Welcome to the chat server!\n";
pub const GOODBYE: &str = "Goodbye.\n";
pub const AUTH_FAILED: &str = "Error: Authentication failed.\n";

pub const UNKNOWN_COMMAND: &str = "Error: Unknown command.\n";
pub const EMPTY_MESSAGE: &str = "Error: Message cannot be empty.\n";
pub const MESSAGE_TOO_LONG: &str = "Error: Message too long.\n";

pub const EMPTY_PRIVATE_MESSAGE: &str = "Error: Private message content is empty.\n";
pub const EMPTY_BROADCAST: &str = "Error: Broadcast message content is empty.\n";
pub const EMPTY_GROUP_MESSAGE: &str = "Error: Group message content is empty.\n";
pub const EMPTY_GROUP_NAME: &str = "Error: Group name cannot be empty.\n";
pub const GROUP_NAME_HAS_SPACES: &str = "Error: Group name must not contain spaces.\n";

/// Format an incorrect-format reply echoing the expected usage
pub fn incorrect_format(usage: &str) -> String {
    format!("Error: Incorrect format. Use: {usage}\n")
}

pub fn already_connected(username: &str) -> String {
    format!("Error: User \"{username}\" is already connected.\n")
}

pub fn group_created(name: &str) -> String {
    format!("Group \"{name}\" created successfully.\n")
}

pub fn group_joined(name: &str) -> String {
    format!("Joined group \"{name}\" successfully.\n")
}

pub fn group_left(name: &str) -> String {
    format!("Left group \"{name}\" successfully.\n")
}

/// Reply line for a failed routing operation
pub fn route_error(err: &RouteError) -> String {
    match err {
        RouteError::UserNotFound(u) => format!("Error: User \"{u}\" not found.\n"),
        RouteError::SelfMessage => "Error: Cannot send a private message to yourself.\n".to_string(),
    }
}

/// Reply line for a failed group operation
pub fn group_error(err: &GroupError) -> String {
    match err {
        GroupError::NoSuchGroup(g) => format!("Error: Group \"{g}\" does not exist.\n"),
        GroupError::AlreadyExists(g) => format!("Error: Group \"{g}\" already exists.\n"),
        GroupError::AlreadyMember(g) => format!("Error: Already a member of group \"{g}\".\n"),
        GroupError::NotMember(g) => format!("Error: Not a member of group \"{g}\".\n"),
    }
}

// Delivered message formats.

pub fn direct_message(from: &str, body: &str) -> String {
    format!("[{from}]: {body}\n")
}

pub fn broadcast_message(from: &str, body: &str) -> String {
    format!("[{from}] (Broadcast): {body}\n")
}

pub fn group_message(group: &str, body: &str) -> String {
    format!("[Group {group}]: {body}\n")
}

pub fn join_announcement(username: &str) -> String {
    format!("{username} has joined the chat.\n")
}

pub fn leave_announcement(username: &str) -> String {
    format!("{username} has left the chat.\n")
}
