//! Scripted walk through the room protocol with two principals sharing one
//! in-memory tree.

use std::time::Duration;

use anyhow::{bail, Context};
use tracing::info;

use sn_app::usecases::{RoomEvent, RoomSession};
use sn_core::ports::TreeStorePort;
use sn_core::{paths, ClipboardPayload, DataUrl, RoomId, SessionId, Uid};
use sn_infra::InMemoryTreeStore;

use crate::bootstrap::named_principal;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run() -> anyhow::Result<()> {
    let store = InMemoryTreeStore::new();
    let alice = named_principal(&store, "alice");
    let bob = named_principal(&store, "bob");

    info!("demo started");
    sessions(&store, &alice, &bob).await?;
    rooms(&store, &alice, &bob).await?;
    info!("demo finished");
    Ok(())
}

async fn sessions(
    store: &InMemoryTreeStore,
    alice: &sn_app::App,
    bob: &sn_app::App,
) -> anyhow::Result<()> {
    let id = SessionId::from("demo");

    let mut session = alice.open_clipboard_session().execute(&id).await?;
    println!("alice opens session {id}: {}", session.status().message());
    session.edit_text("only alice writes here").await?;

    match bob.open_clipboard_session().execute(&id).await {
        Ok(_) => bail!("bob must not get into alice's session"),
        Err(err) => println!("bob opens session {id}: {}", err.status().message()),
    }

    let node = store.read(&paths::session(&id)).await?;
    println!("snappi_clipboard/{id} = {}", node.unwrap_or_default());
    Ok(())
}

async fn rooms(
    store: &InMemoryTreeStore,
    alice: &sn_app::App,
    bob: &sn_app::App,
) -> anyhow::Result<()> {
    let id = RoomId::from("42");

    let mut owner = alice.join_room().execute(&id).await?;
    println!("alice joins room {id}: {}", owner.state().role_label());

    let mut guest = bob.join_room().execute(&id).await?;
    println!("bob joins room {id}: {}", guest.state().role_label());

    let pending = wait_for(&mut owner, |event| {
        matches!(event, RoomEvent::RequestsChanged(uids) if !uids.is_empty())
    })
    .await?;
    println!("alice sees {pending:?}");

    owner.approve(&Uid::from("bob")).await?;
    wait_for(&mut guest, |event| *event == RoomEvent::Approved).await?;
    println!("bob is now {}", guest.state().role_label());

    owner.share(ClipboardPayload::Text("hi".into())).await?;
    let seen = wait_for(&mut guest, |event| {
        matches!(event, RoomEvent::ClipboardChanged(_))
    })
    .await?;
    println!("bob sees {seen:?}");

    let image = ClipboardPayload::Image(DataUrl::encode("image/png", b"\x89PNG\r\n\x1a\n"));
    guest.share(image).await?;
    let seen = wait_for(&mut owner, |event| {
        matches!(event, RoomEvent::ClipboardChanged(ClipboardPayload::Image(_)))
    })
    .await?;
    if let RoomEvent::ClipboardChanged(payload) = &seen {
        println!("alice sees {}", payload.summary());
    }

    let node = store.read(&paths::room(&id)).await?;
    println!("rooms/{id} = {}", node.unwrap_or_default());

    owner.delete().await?;
    wait_for(&mut guest, |event| *event == RoomEvent::RoomDeleted).await?;
    println!("alice deletes room {id}; bob is {}", guest.state().role_label());
    Ok(())
}

async fn wait_for(
    session: &mut RoomSession,
    wanted: impl Fn(&RoomEvent) -> bool,
) -> anyhow::Result<RoomEvent> {
    tokio::time::timeout(STEP_TIMEOUT, async {
        loop {
            let event = session.next_event().await?;
            if wanted(&event) {
                return Ok::<_, anyhow::Error>(event);
            }
        }
    })
    .await
    .context("demo step timed out")?
}
