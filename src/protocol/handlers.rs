//! Command handlers for the chat server.
//!
//! Dispatches parsed commands from an authenticated session to the
//! message router and the group registry, and shapes the reply line
//! sent back on the issuing connection.

use crate::client::Session;
use crate::group::GroupRegistry;
use crate::protocol::responses;
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::router::MessageRouter;

/// Dispatches a received command to its corresponding handler.
///
/// Only called for authenticated sessions; the authentication phase
/// never reaches the command loop.
pub async fn handle_command(
    session: &Session,
    command: &Command,
    router: &MessageRouter,
    groups: &GroupRegistry,
) -> CommandResult {
    match command {
        Command::Msg { target, body } => handle_cmd_msg(session, target, body, router).await,
        Command::Broadcast { body } => handle_cmd_broadcast(session, body, router).await,
        Command::CreateGroup { name } => handle_cmd_create_group(session, name, groups).await,
        Command::JoinGroup { name } => handle_cmd_join_group(session, name, groups).await,
        Command::GroupMsg { group, body } => {
            handle_cmd_group_msg(session, group, body, router).await
        }
        Command::LeaveGroup { name } => handle_cmd_leave_group(session, name, groups).await,
        Command::Exit => handle_cmd_exit(),
        Command::Empty => failure(responses::EMPTY_MESSAGE.to_string()),
        Command::Malformed { usage } => failure(responses::incorrect_format(usage)),
        Command::Unknown => failure(responses::UNKNOWN_COMMAND.to_string()),
    }
}

/// Handles `/msg`: routes a direct message to one user.
async fn handle_cmd_msg(
    session: &Session,
    target: &str,
    body: &str,
    router: &MessageRouter,
) -> CommandResult {
    if body.is_empty() {
        return failure(responses::EMPTY_PRIVATE_MESSAGE.to_string());
    }

    let username = session.username().unwrap_or_default();
    match router.direct(session.addr(), username, target, body).await {
        Ok(()) => delivered(),
        Err(e) => failure(responses::route_error(&e)),
    }
}

/// Handles `/broadcast`: fans the message out to everyone else.
async fn handle_cmd_broadcast(
    session: &Session,
    body: &str,
    router: &MessageRouter,
) -> CommandResult {
    if body.is_empty() {
        return failure(responses::EMPTY_BROADCAST.to_string());
    }

    let username = session.username().unwrap_or_default();
    router.broadcast(session.addr(), username, body).await;
    delivered()
}

/// Handles `/create_group`: validates the name and creates the group
/// with the issuing session as first member.
async fn handle_cmd_create_group(
    session: &Session,
    name: &str,
    groups: &GroupRegistry,
) -> CommandResult {
    if name.is_empty() {
        return failure(responses::EMPTY_GROUP_NAME.to_string());
    }
    if name.contains(' ') {
        return failure(responses::GROUP_NAME_HAS_SPACES.to_string());
    }

    match groups.create(name, session.addr()).await {
        Ok(()) => success(responses::group_created(name)),
        Err(e) => failure(responses::group_error(&e)),
    }
}

/// Handles `/join_group`.
async fn handle_cmd_join_group(
    session: &Session,
    name: &str,
    groups: &GroupRegistry,
) -> CommandResult {
    if name.is_empty() {
        return failure(responses::EMPTY_GROUP_NAME.to_string());
    }

    match groups.join(name, session.addr()).await {
        Ok(()) => success(responses::group_joined(name)),
        Err(e) => failure(responses::group_error(&e)),
    }
}

/// Handles `/group_msg`: membership is validated by the router right
/// before fan-out.
async fn handle_cmd_group_msg(
    session: &Session,
    group: &str,
    body: &str,
    router: &MessageRouter,
) -> CommandResult {
    if body.is_empty() {
        return failure(responses::EMPTY_GROUP_MESSAGE.to_string());
    }

    match router.group_send(session.addr(), group, body).await {
        Ok(()) => delivered(),
        Err(e) => failure(responses::group_error(&e)),
    }
}

/// Handles `/leave_group`.
async fn handle_cmd_leave_group(
    session: &Session,
    name: &str,
    groups: &GroupRegistry,
) -> CommandResult {
    if name.is_empty() {
        return failure(responses::EMPTY_GROUP_NAME.to_string());
    }

    match groups.leave(name, session.addr()).await {
        Ok(()) => success(responses::group_left(name)),
        Err(e) => failure(responses::group_error(&e)),
    }
}

/// Handles `exit`: says goodbye and signals connection close.
fn handle_cmd_exit() -> CommandResult {
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some(responses::GOODBYE.to_string()),
    }
}

/// Success with a reply line.
fn success(message: String) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(message),
    }
}

/// Success with no acknowledgment; the recipients see the message, the
/// sender sees nothing.
fn delivered() -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: None,
    }
}

fn failure(reply: String) -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure(reply.trim_end().to_string()),
        message: Some(reply),
    }
}
