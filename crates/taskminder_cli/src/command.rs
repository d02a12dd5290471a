//! Chat command text parsing.
//!
//! # Responsibility
//! - Turn one raw inbound message into a dispatcher [`Request`].
//! - Answer malformed commands with a usage hint instead of a request.
//!
//! # Invariants
//! - Text starting with `/` is always a command, even when it contains `;`.
//! - Task text is split at the first `;` only; the dispatcher validates both
//!   halves.

use once_cell::sync::Lazy;
use regex::Regex;
use taskminder_core::{OwnerId, Request};

pub const DONE_USAGE: &str = "Usage: /done <id>";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /start for help.";

// `/name`, an optional `@botname` suffix, then free arguments.
static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([A-Za-z_]+)(?:@\S+)?(?:\s+(.*))?$").expect("valid command regex")
});

/// Result of parsing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Request(Request),
    /// Reply directly with this text; nothing reaches the dispatcher.
    Hint(&'static str),
    /// Blank input.
    Empty,
}

/// Parses one message sent by `owner_id`.
pub fn parse_message(owner_id: OwnerId, text: &str) -> Parsed {
    let text = text.trim();
    if text.is_empty() {
        return Parsed::Empty;
    }

    if text.starts_with('/') {
        return parse_command(owner_id, text);
    }

    match text.split_once(';') {
        Some((description, deadline)) => Parsed::Request(Request::CreateTask {
            owner_id,
            description: description.to_string(),
            deadline: deadline.to_string(),
        }),
        None => Parsed::Hint(UNKNOWN_COMMAND),
    }
}

fn parse_command(owner_id: OwnerId, text: &str) -> Parsed {
    let Some(captures) = COMMAND_RE.captures(text) else {
        return Parsed::Hint(UNKNOWN_COMMAND);
    };
    let args: Vec<&str> = captures
        .get(2)
        .map(|value| value.as_str().split_whitespace().collect())
        .unwrap_or_default();

    match captures[1].to_ascii_lowercase().as_str() {
        "start" | "help" => Parsed::Request(Request::Help),
        "tasks" => Parsed::Request(Request::ListTasks { owner_id }),
        "done" => match args.as_slice() {
            [id] => Parsed::Request(Request::DeleteTask {
                owner_id,
                id: (*id).to_string(),
            }),
            _ => Parsed::Hint(DONE_USAGE),
        },
        _ => Parsed::Hint(UNKNOWN_COMMAND),
    }
}
