//! Typed console input relayed to controller intents.

use client_core::{CollectionController, ControllerError};
use shared::{domain::FieldName, domain::UserId, error::UnknownField};
use thiserror::Error;

pub const USAGE: &str = "commands: list | edit <id> | set <name|email> <value> | save | add | save-add | cancel | delete <id> | settle | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Edit(UserId),
    Set(FieldName, String),
    Save,
    Add,
    SaveAdd,
    Cancel,
    Delete(UserId),
    Settle,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{0}' is not a user id")]
    InvalidId(String),
    #[error(transparent)]
    Field(#[from] UnknownField),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "list" | "ls" => Ok(Command::List),
        "edit" => parse_id("edit", rest).map(Command::Edit),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            if field.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "set",
                    argument: "a field name",
                });
            }
            Ok(Command::Set(field.parse()?, value.to_string()))
        }
        "save" | "update" => Ok(Command::Save),
        "add" => Ok(Command::Add),
        "save-add" => Ok(Command::SaveAdd),
        "cancel" => Ok(Command::Cancel),
        "delete" | "rm" => parse_id("delete", rest).map(Command::Delete),
        "settle" => Ok(Command::Settle),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_id(command: &'static str, raw: &str) -> Result<UserId, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "a user id",
        });
    }
    raw.parse()
        .map_err(|_| CommandError::InvalidId(raw.to_string()))
}

/// Applies one command. `List`, `Help` and `Quit` leave the controller alone.
pub async fn dispatch(
    controller: &mut CollectionController,
    command: Command,
) -> Result<(), ControllerError> {
    match command {
        Command::Edit(id) => controller.start_edit(id),
        Command::Set(field, value) => controller.change_field(field, value),
        Command::Save => controller.save_edit().await,
        Command::Add => {
            controller.start_add();
            Ok(())
        }
        Command::SaveAdd => controller.save_add().await,
        Command::Cancel => controller.cancel_add(),
        Command::Delete(id) => controller.delete(id).await,
        Command::Settle => {
            controller.settle().await;
            Ok(())
        }
        Command::List | Command::Help | Command::Quit => Ok(()),
    }
}
