use std::path::PathBuf;

use sn_core::Uid;

pub const ROOM_HELP: &str = "\
commands:
  approve <uid>        admit a pending requester (owner)
  text <words...>      share text
  file <path> [mime]   share an image, video or document
  leave                leave the room
  delete               delete the room (owner)
  view                 print the room as seen from here
  help                 show this help";

/// One line typed at the room prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomCommand {
    Approve(Uid),
    Text(String),
    File { path: PathBuf, mime: Option<String> },
    Leave,
    Delete,
    View,
    Help,
}

impl RoomCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "approve" if !rest.is_empty() => Ok(RoomCommand::Approve(Uid::from(rest))),
            "approve" => Err("usage: approve <uid>".into()),
            "text" => Ok(RoomCommand::Text(rest.to_string())),
            "file" => {
                let mut parts = rest.split_whitespace();
                let path = parts.next().ok_or("usage: file <path> [mime]")?;
                Ok(RoomCommand::File {
                    path: PathBuf::from(path),
                    mime: parts.next().map(str::to_string),
                })
            }
            "leave" => Ok(RoomCommand::Leave),
            "delete" => Ok(RoomCommand::Delete),
            "view" => Ok(RoomCommand::View),
            "help" | "?" => Ok(RoomCommand::Help),
            "" => Err("empty command".into()),
            other => Err(format!("unknown command {other:?}; type `help`")),
        }
    }
}
