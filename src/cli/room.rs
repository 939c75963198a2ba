use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use sn_app::usecases::{ClipboardCapture, RoomEvent, RoomSession};
use sn_app::App;
use sn_core::{AccessError, ClipboardPayload, RoomAccessState, RoomId};

use super::command::{RoomCommand, ROOM_HELP};

/// What the prompt loop should do after a command.
enum Flow {
    Continue,
    Exit,
}

pub async fn run(app: &App, raw_id: &str) -> anyhow::Result<()> {
    let id = RoomId::parse(raw_id).context("invalid room number")?;
    let mut session = app
        .join_room()
        .execute(&id)
        .await
        .with_context(|| format!("cannot join room {id}"))?;
    let mut capture = app.clipboard_capture();

    println!("Room {id}: you are {}.", session.state().role_label());
    println!("{ROOM_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: treat as leaving.
                    session.leave().await?;
                    return Ok(());
                };
                let command = match RoomCommand::parse(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                match command {
                    RoomCommand::Leave => {
                        session.leave().await?;
                        println!("Left room {id}.");
                        return Ok(());
                    }
                    RoomCommand::Delete => match session.state() {
                        RoomAccessState::Owner => {
                            session.delete().await?;
                            println!("Room {id} deleted.");
                            return Ok(());
                        }
                        _ => println!("{}", AccessError::NotOwner("delete the room")),
                    },
                    other => {
                        if let Flow::Exit = execute(&mut session, &mut capture, other).await {
                            return Ok(());
                        }
                    }
                }
            }
            event = session.next_event() => {
                match event {
                    Ok(RoomEvent::RoomDeleted) => {
                        println!("Room {id} was deleted.");
                        return Ok(());
                    }
                    Ok(event) => print_event(&event),
                    Err(err) => return Err(err).context("room subscription failed"),
                }
            }
        }
    }
}

async fn execute(
    session: &mut RoomSession,
    capture: &mut ClipboardCapture,
    command: RoomCommand,
) -> Flow {
    let outcome = match command {
        RoomCommand::Approve(uid) => session
            .approve(&uid)
            .await
            .map(|()| format!("Approved {uid}.")),
        RoomCommand::Text(text) => match capture.capture_text(&text).cloned() {
            Some(payload) => share(session, payload).await,
            None => Ok("Nothing to share.".to_string()),
        },
        RoomCommand::File { path, mime } => {
            match capture.capture_file(&path, mime.as_deref()).await {
                Ok(payload) => share(session, payload.clone()).await,
                Err(err) => Ok(err.to_string()),
            }
        }
        RoomCommand::View => Ok(serde_json::to_string_pretty(&session.view())
            .unwrap_or_else(|err| format!("cannot render room: {err}"))),
        RoomCommand::Help => Ok(ROOM_HELP.to_string()),
        RoomCommand::Leave | RoomCommand::Delete => return Flow::Continue,
    };

    match outcome {
        Ok(message) => {
            println!("{message}");
            Flow::Continue
        }
        Err(err @ AccessError::Inactive(_)) => {
            println!("{err}");
            Flow::Exit
        }
        Err(err) => {
            println!("{err}");
            Flow::Continue
        }
    }
}

async fn share(session: &mut RoomSession, payload: ClipboardPayload) -> Result<String, AccessError> {
    let summary = payload.summary();
    session.share(payload).await?;
    Ok(format!("Shared {summary}."))
}

fn print_event(event: &RoomEvent) {
    match event {
        RoomEvent::RequestsChanged(uids) if uids.is_empty() => println!("No pending requests."),
        RoomEvent::RequestsChanged(uids) => {
            let names: Vec<&str> = uids.iter().map(|uid| uid.as_str()).collect();
            println!("Pending requests: {}", names.join(", "));
        }
        RoomEvent::Approved => println!("You were approved. You are a participant."),
        RoomEvent::ClipboardChanged(ClipboardPayload::Text(text)) => println!("Clipboard: {text}"),
        RoomEvent::ClipboardChanged(payload) => println!("Clipboard: {}", payload.summary()),
        RoomEvent::ClipboardUnreadable { reason } => println!("Clipboard cannot be shown: {reason}"),
        RoomEvent::RoomDeleted => println!("Room deleted."),
    }
}
