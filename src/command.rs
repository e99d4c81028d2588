//! Interactive command surface.
//!
//! The recognized commands live in a static descriptor table; parsing
//! turns one line of input into a typed [`Command`] or a recoverable
//! [`CommandError`]. The blocking read loop prints rejections and
//! re-prompts, so it only ever returns a valid command.

use crate::console::Console;
use crate::error::Result;
use std::io::{BufRead, Write};
use thiserror::Error;

/// A parsed, validated user instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Add the result at this 1-based index to the bibliography
    Add(usize),
    /// Show the result list again
    Relist,
    /// End the session
    Quit,
}

/// Why one line of command input was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("No command entered")]
    Empty,
    #[error("Unknown command")]
    Unknown,
    #[error("Invalid number of arguments")]
    ArgCount,
    #[error("Invalid integer")]
    InvalidInteger,
    #[error("Out of range: expected integer between {lower} and {upper}")]
    OutOfRange { lower: usize, upper: usize },
}

#[derive(Debug, Clone, Copy)]
enum CommandKind {
    Add,
    Relist,
    Quit,
}

/// Static description of one recognized command
struct CommandDesc {
    /// Token that selects this command
    trigger: &'static str,
    /// Menu line shown to the user
    description: &'static str,
    /// Arguments required after the trigger
    num_args: usize,
    kind: CommandKind,
}

const COMMANDS: &[CommandDesc] = &[
    CommandDesc {
        trigger: "a",
        description: "Add entry to bibliography. Takes index argument.",
        num_args: 1,
        kind: CommandKind::Add,
    },
    CommandDesc {
        trigger: "r",
        description: "Relist entries",
        num_args: 0,
        kind: CommandKind::Relist,
    },
    CommandDesc {
        trigger: "q",
        description: "Quit",
        num_args: 0,
        kind: CommandKind::Quit,
    },
];

/// Print the command menu, one trigger and description per line
pub fn print_menu<R, W>(console: &mut Console<R, W>) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    console.line("Commands:")?;
    for desc in COMMANDS {
        console.line(&format!("{} - {}", desc.trigger, desc.description))?;
    }
    Ok(())
}

/// Parse one line of input against the command table.
///
/// `result_count` bounds the Add index to `[1, result_count]`.
pub fn parse_command(line: &str, result_count: usize) -> std::result::Result<Command, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let trigger = match tokens.first() {
        Some(t) => *t,
        None => return Err(CommandError::Empty),
    };

    let desc = COMMANDS
        .iter()
        .find(|d| d.trigger == trigger)
        .ok_or(CommandError::Unknown)?;

    if tokens.len() - 1 != desc.num_args {
        return Err(CommandError::ArgCount);
    }

    match desc.kind {
        CommandKind::Add => Ok(Command::Add(parse_bounded_int(tokens[1], 1, result_count)?)),
        CommandKind::Relist => Ok(Command::Relist),
        CommandKind::Quit => Ok(Command::Quit),
    }
}

/// Parse a base-10 integer and check it lies in `[lower, upper]`
fn parse_bounded_int(
    token: &str,
    lower: usize,
    upper: usize,
) -> std::result::Result<usize, CommandError> {
    let value: i64 = token.parse().map_err(|_| CommandError::InvalidInteger)?;
    if value < lower as i64 || value > upper as i64 {
        return Err(CommandError::OutOfRange { lower, upper });
    }
    Ok(value as usize)
}

/// Prompt until the user supplies a valid command.
///
/// Rejections print as `Error: <message>` and the prompt repeats; the
/// returned command is always valid for `result_count` results.
pub fn read_command<R, W>(console: &mut Console<R, W>, result_count: usize) -> Result<Command>
where
    R: BufRead,
    W: Write,
{
    loop {
        let line = console.prompt("Command: ")?;
        match parse_command(&line, result_count) {
            Ok(command) => return Ok(command),
            Err(e) => console.error(&e.to_string())?,
        }
    }
}
