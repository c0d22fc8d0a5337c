//! Line commands understood by the driver.

use std::time::Duration;

use formwork_lib::{Path, PathError, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get(Path),
    Set(Path, Value),
    Touch(Path),
    Errors(Path),
    State(Path),
    Add,
    Remove(usize),
    Wait(Duration),
    Message,
    Submit,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' expects {1}")]
    Usage(&'static str, &'static str),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("invalid value: {0}")]
    Value(#[from] serde_json::Error),

    #[error("invalid number: {0}")]
    Number(#[from] std::num::ParseIntError),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "get" => Self::Get(Path::parse(rest)?),
            "touch" => Self::Touch(Path::parse(rest)?),
            "errors" => Self::Errors(Path::parse(rest)?),
            "state" => Self::State(Path::parse(rest)?),
            "set" => {
                let (path, json) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("set", "<path> <json>"))?;
                Self::Set(Path::parse(path)?, serde_json::from_str(json.trim())?)
            }
            "add" => Self::Add,
            "remove" => Self::Remove(Self::number(rest, "remove", "<index>")?),
            "wait" => Self::Wait(Duration::from_millis(Self::number(rest, "wait", "<ms>")? as u64)),
            "message" => Self::Message,
            "submit" => Self::Submit,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }

    fn number(arg: &str, name: &'static str, usage: &'static str) -> Result<usize, CommandError> {
        if arg.is_empty() {
            return Err(CommandError::Usage(name, usage));
        }
        Ok(arg.parse()?)
    }
}
