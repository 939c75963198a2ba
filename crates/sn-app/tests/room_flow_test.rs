mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sn_app::usecases::RoomEvent;
use sn_core::ports::{StoreError, TreeStorePort, TreeSubscription};
use sn_core::{
    paths, AccessError, ClipboardPayload, DataUrl, RoomAccessState, RoomId, TreePath, TreeValue,
    Uid,
};
use sn_infra::InMemoryTreeStore;

use common::{principal, principal_on, within, T0};

/// In-memory store whose clipboard subscriptions take a while to open.
struct SlowClipboardStore(InMemoryTreeStore);

#[async_trait]
impl TreeStorePort for SlowClipboardStore {
    async fn read(&self, path: &TreePath) -> Result<Option<TreeValue>, StoreError> {
        self.0.read(path).await
    }

    async fn write(&self, path: &TreePath, value: TreeValue) -> Result<(), StoreError> {
        self.0.write(path, value).await
    }

    async fn compare_and_set(
        &self,
        path: &TreePath,
        expected: Option<TreeValue>,
        value: TreeValue,
    ) -> Result<bool, StoreError> {
        self.0.compare_and_set(path, expected, value).await
    }

    async fn subscribe(&self, path: &TreePath) -> Result<TreeSubscription, StoreError> {
        if path.to_string().ends_with("/clipboard") {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        self.0.subscribe(path).await
    }
}

/// Wait for the next event, skipping clipboard echoes.
async fn next_non_clipboard(room: &mut sn_app::usecases::RoomSession) -> RoomEvent {
    loop {
        match within(room.next_event()).await.unwrap() {
            RoomEvent::ClipboardChanged(_) => continue,
            event => return event,
        }
    }
}

#[tokio::test]
async fn owner_approves_requester_and_shares_clipboard() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal(&store, "B");
    let id = RoomId::from("42");

    let mut owner = a.join_room().execute(&id).await.unwrap();
    assert_eq!(owner.state(), RoomAccessState::Owner);
    assert_eq!(
        store.read(&paths::room(&id)).await.unwrap(),
        Some(json!({"owner": "A", "createdAt": T0, "participants": {"A": true}}))
    );

    let mut guest = b.join_room().execute(&id).await.unwrap();
    assert_eq!(guest.state(), RoomAccessState::Pending);
    assert_eq!(guest.state().role_label(), "waiting for approval");
    assert_eq!(
        store.read(&paths::room_requests(&id)).await.unwrap(),
        Some(json!({"B": true}))
    );

    assert_eq!(
        next_non_clipboard(&mut owner).await,
        RoomEvent::RequestsChanged(vec![Uid::from("B")])
    );
    assert_eq!(owner.pending_requests(), &[Uid::from("B")]);

    owner.approve(&Uid::from("B")).await.unwrap();
    assert_eq!(store.read(&paths::room_requests(&id)).await.unwrap(), None);
    assert_eq!(
        store.read(&paths::room_participants(&id)).await.unwrap(),
        Some(json!({"A": true, "B": true}))
    );

    assert_eq!(within(guest.next_event()).await.unwrap(), RoomEvent::Approved);
    assert_eq!(guest.state(), RoomAccessState::Participant);

    let hi = ClipboardPayload::Text("hi".into());
    owner.share(hi.clone()).await.unwrap();
    assert_eq!(
        within(guest.next_event()).await.unwrap(),
        RoomEvent::ClipboardChanged(hi.clone())
    );
    assert_eq!(guest.clipboard(), Some(&hi));
    assert_eq!(
        store.read(&paths::room_clipboard(&id)).await.unwrap(),
        Some(json!({"type": "text", "content": "hi"}))
    );
}

#[tokio::test]
async fn later_clipboard_write_replaces_the_previous_one() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let id = RoomId::from("7");
    let mut owner = a.join_room().execute(&id).await.unwrap();

    owner
        .share(ClipboardPayload::Text("hello".into()))
        .await
        .unwrap();
    let image = ClipboardPayload::Image(DataUrl::encode("image/png", b"\x89PNG"));
    owner.share(image.clone()).await.unwrap();

    let stored = store.read(&paths::room_clipboard(&id)).await.unwrap().unwrap();
    assert_eq!(stored, serde_json::to_value(&image).unwrap());
    assert_eq!(stored["type"], "image");
    assert!(stored.get("text").is_none());
}

#[tokio::test]
async fn deleting_the_room_evacuates_everyone() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal(&store, "B");
    let id = RoomId::from("42");

    let owner = a.join_room().execute(&id).await.unwrap();
    let mut guest = b.join_room().execute(&id).await.unwrap();

    owner.delete().await.unwrap();

    assert_eq!(next_non_clipboard(&mut guest).await, RoomEvent::RoomDeleted);
    assert_eq!(guest.state(), RoomAccessState::RoomDeleted);
    assert!(matches!(
        guest.next_event().await,
        Err(AccessError::Inactive(RoomAccessState::RoomDeleted))
    ));
    assert_eq!(store.read(&paths::room(&id)).await.unwrap(), None);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn pending_and_participant_rights_are_enforced() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal(&store, "B");
    let id = RoomId::from("42");

    let mut owner = a.join_room().execute(&id).await.unwrap();
    let mut guest = b.join_room().execute(&id).await.unwrap();

    assert_eq!(
        guest.share(ClipboardPayload::Text("sneaky".into())).await,
        Err(AccessError::NotApproved)
    );
    assert!(matches!(
        guest.approve(&Uid::from("B")).await,
        Err(AccessError::NotOwner(_))
    ));
    assert_eq!(store.read(&paths::room_clipboard(&id)).await.unwrap(), None);

    owner.approve(&Uid::from("B")).await.unwrap();
    assert_eq!(within(guest.next_event()).await.unwrap(), RoomEvent::Approved);

    assert!(matches!(guest.delete().await, Err(AccessError::NotOwner(_))));
    assert!(store.read(&paths::room(&id)).await.unwrap().is_some());
}

#[tokio::test]
async fn approved_participant_rejoins_directly() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal(&store, "B");
    let id = RoomId::from("42");

    let mut owner = a.join_room().execute(&id).await.unwrap();
    b.join_room().execute(&id).await.unwrap();
    owner.approve(&Uid::from("B")).await.unwrap();

    let again = b.join_room().execute(&id).await.unwrap();
    assert_eq!(again.state(), RoomAccessState::Participant);
    assert_eq!(again.state().role_label(), "a participant");
}

#[tokio::test]
async fn leaving_removes_own_entries_and_watches() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal(&store, "B");
    let id = RoomId::from("42");

    let mut owner = a.join_room().execute(&id).await.unwrap();
    let owner_watches = store.subscriber_count();

    let mut guest = b.join_room().execute(&id).await.unwrap();
    owner.approve(&Uid::from("B")).await.unwrap();
    assert_eq!(within(guest.next_event()).await.unwrap(), RoomEvent::Approved);

    guest.leave().await.unwrap();

    assert_eq!(
        store.read(&paths::room_participants(&id)).await.unwrap(),
        Some(json!({"A": true}))
    );
    assert_eq!(store.subscriber_count(), owner_watches);
}

#[tokio::test]
async fn concurrent_creators_produce_one_owner() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal(&store, "B");
    let id = RoomId::from("race");

    let join_a = a.join_room();
    let join_b = b.join_room();
    let (ra, rb) = tokio::join!(join_a.execute(&id), join_b.execute(&id));

    let mut states = vec![ra.unwrap().state(), rb.unwrap().state()];
    states.sort_by_key(|state| state.role_label());
    assert_eq!(states, vec![RoomAccessState::Owner, RoomAccessState::Pending]);
}

#[tokio::test]
async fn foreign_clipboard_kind_is_reported_not_dropped() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let id = RoomId::from("42");
    let mut owner = a.join_room().execute(&id).await.unwrap();

    store
        .write(
            &paths::room_clipboard(&id),
            json!({"type": "file", "content": "data:text/plain;base64,aGk="}),
        )
        .await
        .unwrap();

    loop {
        match within(owner.next_event()).await.unwrap() {
            RoomEvent::ClipboardUnreadable { reason } => {
                assert!(reason.contains("file"));
                break;
            }
            RoomEvent::RequestsChanged(_) => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test]
async fn approval_survives_an_interrupted_wait() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let b = principal_on(Arc::new(SlowClipboardStore(store.clone())), "B");
    let id = RoomId::from("42");

    let mut owner = a.join_room().execute(&id).await.unwrap();
    let mut guest = b.join_room().execute(&id).await.unwrap();
    owner.approve(&Uid::from("B")).await.unwrap();

    // Give up while the guest is still opening its clipboard watch.
    let interrupted = tokio::time::timeout(Duration::from_millis(20), guest.next_event()).await;
    assert!(interrupted.is_err());
    assert_eq!(guest.state(), RoomAccessState::Pending);

    let hi = ClipboardPayload::Text("hi".into());
    owner.share(hi.clone()).await.unwrap();

    assert_eq!(within(guest.next_event()).await.unwrap(), RoomEvent::Approved);
    assert_eq!(guest.state(), RoomAccessState::Participant);
    assert_eq!(
        within(guest.next_event()).await.unwrap(),
        RoomEvent::ClipboardChanged(hi.clone())
    );
    assert_eq!(guest.clipboard(), Some(&hi));
}

#[tokio::test]
async fn malformed_requests_node_does_not_end_the_room() {
    let store = InMemoryTreeStore::new();
    let a = principal(&store, "A");
    let id = RoomId::from("42");
    let mut owner = a.join_room().execute(&id).await.unwrap();

    store
        .write(&paths::room_requests(&id), json!({"B": "x"}))
        .await
        .unwrap();
    store
        .write(&paths::room_request(&id, &Uid::from("C")), json!(true))
        .await
        .unwrap();

    assert_eq!(
        next_non_clipboard(&mut owner).await,
        RoomEvent::RequestsChanged(vec![Uid::from("C")])
    );
    assert_eq!(owner.state(), RoomAccessState::Owner);
}
