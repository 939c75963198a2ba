use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use sn_app::App;
use sn_core::{SessionId, SessionStatus};

pub async fn run(app: &App, raw_id: &str) -> anyhow::Result<()> {
    let id = SessionId::parse(raw_id).context("invalid session id")?;
    println!("{}", SessionStatus::Connecting.message());

    let mut session = match app.open_clipboard_session().execute(&id).await {
        Ok(session) => session,
        Err(err) => {
            println!("{}", err.status().message());
            return Err(err).context("cannot open session");
        }
    };
    println!("{}", session.status().message());
    if !session.text().is_empty() {
        println!("{}", session.text());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Err(err) = session.edit_text(line).await {
                    println!("{}", err.status().message());
                    return Err(err).context("write rejected");
                }
                println!("{}", session.status().message());
            }
            change = session.next_change() => {
                let text = change?;
                println!("[{}] {}", session.status().message(), text);
            }
        }
    }

    session.close();
    Ok(())
}
