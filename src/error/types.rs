//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;

/// Client registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Another live session already holds this username.
    AlreadyLoggedIn(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyLoggedIn(u) => {
                write!(f, "user \"{}\" is already connected", u)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Group registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    NoSuchGroup(String),
    AlreadyExists(String),
    AlreadyMember(String),
    NotMember(String),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::NoSuchGroup(g) => write!(f, "group \"{}\" does not exist", g),
            GroupError::AlreadyExists(g) => write!(f, "group \"{}\" already exists", g),
            GroupError::AlreadyMember(g) => write!(f, "already a member of group \"{}\"", g),
            GroupError::NotMember(g) => write!(f, "not a member of group \"{}\"", g),
        }
    }
}

impl std::error::Error for GroupError {}

/// Message routing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UserNotFound(String),
    SelfMessage,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::UserNotFound(u) => write!(f, "user \"{}\" not found", u),
            RouteError::SelfMessage => write!(f, "cannot send a private message to yourself"),
        }
    }
}

impl std::error::Error for RouteError {}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Registry(RegistryError),
    Group(GroupError),
    Route(RouteError),
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Registry(e) => write!(f, "Registry error: {}", e),
            ChatServerError::Group(e) => write!(f, "Group error: {}", e),
            ChatServerError::Route(e) => write!(f, "Routing error: {}", e),
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<RegistryError> for ChatServerError {
    fn from(error: RegistryError) -> Self {
        ChatServerError::Registry(error)
    }
}

impl From<GroupError> for ChatServerError {
    fn from(error: GroupError) -> Self {
        ChatServerError::Group(error)
    }
}

impl From<RouteError> for ChatServerError {
    fn from(error: RouteError) -> Self {
        ChatServerError::Route(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::Io(error)
    }
}
