//! Module `commands`
//!
//! Defines the chat command parsing logic and related data structures
//! used to represent commands, their status, and results.

/// Represents a chat command parsed from one line of client input.
///
/// Commands are prefix-matched on the first space-delimited token,
/// case-sensitively. Structurally broken forms parse to `Malformed`
/// carrying the usage string to echo back; everything unrecognized is
/// `Unknown`. Content-level checks (empty message bodies, empty group
/// names) are left to the handlers.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `/msg <username> <message>`: direct message to one user.
    Msg { target: String, body: String },
    /// `/broadcast <message>`: message to every other client.
    Broadcast { body: String },
    /// `/create_group <group name>`: create a group, auto-joining the creator.
    CreateGroup { name: String },
    /// `/join_group <group name>`
    JoinGroup { name: String },
    /// `/group_msg <group name> <message>`: message to group members.
    GroupMsg { group: String, body: String },
    /// `/leave_group <group name>`
    LeaveGroup { name: String },
    /// The literal line `exit`.
    Exit,
    /// An empty input line.
    Empty,
    /// A recognized command whose argument structure is wrong.
    Malformed { usage: &'static str },
    /// Anything else.
    Unknown,
}

/// Represents the outcome status of executing a command.
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
pub struct CommandResult {
    pub status: CommandStatus,
    /// Reply line for the issuing client, newline included. `None` when
    /// the command succeeds silently (delivered messages carry no ack).
    pub message: Option<String>,
}

pub const MSG_USAGE: &str = "/msg <username> <message>";
pub const BROADCAST_USAGE: &str = "/broadcast <message>";
pub const CREATE_GROUP_USAGE: &str = "/create_group <group name>";
pub const JOIN_GROUP_USAGE: &str = "/join_group <group name>";
pub const GROUP_MSG_USAGE: &str = "/group_msg <group name> <message>";
pub const LEAVE_GROUP_USAGE: &str = "/leave_group <group name>";

/// Parses a raw input line into the `Command` enum.
///
/// The trailing line terminator is stripped; interior whitespace is
/// preserved so message bodies pass through untouched. Group names for
/// join/leave take the whole remainder of the line; a name containing
/// spaces can never have been created, so lookup simply fails later.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']);

    if line.is_empty() {
        return Command::Empty;
    }
    if line == "exit" {
        return Command::Exit;
    }

    let (keyword, rest) = match line.split_once(' ') {
        Some((keyword, rest)) => (keyword, Some(rest)),
        None => (line, None),
    };

    match keyword {
        "/msg" => match rest.and_then(|r| r.split_once(' ')) {
            Some((target, body)) => Command::Msg {
                target: target.to_string(),
                body: body.to_string(),
            },
            None => Command::Malformed { usage: MSG_USAGE },
        },
        "/broadcast" => match rest {
            Some(body) => Command::Broadcast {
                body: body.to_string(),
            },
            None => Command::Malformed {
                usage: BROADCAST_USAGE,
            },
        },
        "/create_group" => match rest {
            Some(name) => Command::CreateGroup {
                name: name.to_string(),
            },
            None => Command::Malformed {
                usage: CREATE_GROUP_USAGE,
            },
        },
        "/join_group" => match rest {
            Some(name) => Command::JoinGroup {
                name: name.to_string(),
            },
            None => Command::Malformed {
                usage: JOIN_GROUP_USAGE,
            },
        },
        "/group_msg" => match rest.and_then(|r| r.split_once(' ')) {
            Some((group, body)) => Command::GroupMsg {
                group: group.to_string(),
                body: body.to_string(),
            },
            None => Command::Malformed {
                usage: GROUP_MSG_USAGE,
            },
        },
        "/leave_group" => match rest {
            Some(name) => Command::LeaveGroup {
                name: name.to_string(),
            },
            None => Command::Malformed {
                usage: LEAVE_GROUP_USAGE,
            },
        },
        _ => Command::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_message() {
        assert_eq!(
            parse_command("/msg bob hello there\n"),
            Command::Msg {
                target: "bob".to_string(),
                body: "hello there".to_string(),
            }
        );
        // No message after the target is a format error.
        assert_eq!(
            parse_command("/msg bob"),
            Command::Malformed { usage: MSG_USAGE }
        );
        assert_eq!(
            parse_command("/msg"),
            Command::Malformed { usage: MSG_USAGE }
        );
        // A trailing space yields an empty body, caught by the handler.
        assert_eq!(
            parse_command("/msg bob "),
            Command::Msg {
                target: "bob".to_string(),
                body: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_broadcast() {
        assert_eq!(
            parse_command("/broadcast hi all"),
            Command::Broadcast {
                body: "hi all".to_string(),
            }
        );
        assert_eq!(
            parse_command("/broadcast"),
            Command::Malformed {
                usage: BROADCAST_USAGE,
            }
        );
    }

    #[test]
    fn test_parse_group_commands() {
        assert_eq!(
            parse_command("/create_group team"),
            Command::CreateGroup {
                name: "team".to_string(),
            }
        );
        // Spaces survive parsing; the create handler rejects them.
        assert_eq!(
            parse_command("/create_group team two"),
            Command::CreateGroup {
                name: "team two".to_string(),
            }
        );
        assert_eq!(
            parse_command("/join_group team"),
            Command::JoinGroup {
                name: "team".to_string(),
            }
        );
        assert_eq!(
            parse_command("/leave_group team"),
            Command::LeaveGroup {
                name: "team".to_string(),
            }
        );
        assert_eq!(
            parse_command("/group_msg team hello members"),
            Command::GroupMsg {
                group: "team".to_string(),
                body: "hello members".to_string(),
            }
        );
        assert_eq!(
            parse_command("/group_msg team"),
            Command::Malformed {
                usage: GROUP_MSG_USAGE,
            }
        );
    }

    #[test]
    fn test_parse_exit_is_exact() {
        assert_eq!(parse_command("exit"), Command::Exit);
        assert_eq!(parse_command("exit\r\n"), Command::Exit);
        assert_eq!(parse_command("exit now"), Command::Unknown);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(parse_command("/MSG bob hi"), Command::Unknown);
        assert_eq!(parse_command("EXIT"), Command::Unknown);
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("\n"), Command::Empty);
        assert_eq!(parse_command("hello"), Command::Unknown);
        assert_eq!(parse_command("/nonsense arg"), Command::Unknown);
    }
}
