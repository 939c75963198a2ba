use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use sn_core::ports::{encode, StoreError, TreeStorePort, TreeSubscription};
use sn_core::room::{
    flagged_uids, membership_flags, RoomAccessAction, RoomAccessEvent, RoomAccessState, RoomAccessStateMachine,
};
use sn_core::{paths, AccessError, ClipboardPayload, RoomId, TreeValue, Uid};

use super::{RoomEvent, RoomView};

/// Live subscriptions held by one room session.
#[derive(Default)]
struct RoomWatches {
    room: Option<TreeSubscription>,
    requests: Option<TreeSubscription>,
    participant: Option<TreeSubscription>,
    clipboard: Option<TreeSubscription>,
}

impl RoomWatches {
    fn is_empty(&self) -> bool {
        self.room.is_none()
            && self.requests.is_none()
            && self.participant.is_none()
            && self.clipboard.is_none()
    }
}

enum WatchUpdate {
    Room(Option<TreeValue>),
    Requests(Option<TreeValue>),
    Participant(Option<TreeValue>),
    Clipboard(Option<TreeValue>),
}

/// A transition whose actions have not all completed yet.
///
/// The new state is committed only after the last action ran, so an
/// interrupted transition is picked up again by the next call.
struct StagedTransition {
    next: RoomAccessState,
    actions: VecDeque<RoomAccessAction>,
    announce: Option<RoomEvent>,
}

/// One principal's presence in one room.
///
/// Created by [`crate::usecases::JoinRoom`]. Every side effect goes through
/// [`RoomAccessStateMachine`]; the session only executes the actions it
/// returns. All subscriptions are released on leave, delete, room deletion
/// or drop.
pub struct RoomSession {
    store: Arc<dyn TreeStorePort>,
    room_id: RoomId,
    uid: Uid,
    state: RoomAccessState,
    pending: Vec<Uid>,
    clipboard: Option<ClipboardPayload>,
    watches: RoomWatches,
    staged: Option<StagedTransition>,
}

impl RoomSession {
    pub(crate) async fn enter(
        store: Arc<dyn TreeStorePort>,
        room_id: RoomId,
        uid: Uid,
        state: RoomAccessState,
        actions: Vec<RoomAccessAction>,
    ) -> Result<Self, AccessError> {
        let mut session = Self {
            store,
            room_id,
            uid,
            state,
            pending: Vec::new(),
            clipboard: None,
            watches: RoomWatches::default(),
            staged: None,
        };
        session.stage(state, actions, None);
        session.settle().await?;
        Ok(session)
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn state(&self) -> RoomAccessState {
        self.state
    }

    /// Pending join requests. Always empty unless this principal owns the room.
    pub fn pending_requests(&self) -> &[Uid] {
        &self.pending
    }

    /// Last clipboard seen. `None` until approved.
    pub fn clipboard(&self) -> Option<&ClipboardPayload> {
        self.clipboard.as_ref()
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            room_id: self.room_id.clone(),
            uid: self.uid.clone(),
            state: self.state,
            role: self.state.role_label(),
            pending_requests: self.pending.clone(),
            clipboard: self.clipboard.clone(),
        }
    }

    /// Owner only: admit `requester` as participant and drop its request.
    pub async fn approve(&mut self, requester: &Uid) -> Result<(), AccessError> {
        self.ensure_active()?;
        if self.state != RoomAccessState::Owner {
            return Err(AccessError::NotOwner("approve join requests"));
        }

        self.store
            .write(
                &paths::room_participant(&self.room_id, requester),
                Value::Bool(true),
            )
            .await?;
        self.store
            .write(&paths::room_request(&self.room_id, requester), Value::Null)
            .await?;

        info!(room_id = %self.room_id, requester = %requester, "join request approved");
        Ok(())
    }

    /// Replace the shared clipboard. Owner and participants only.
    pub async fn share(&mut self, payload: ClipboardPayload) -> Result<(), AccessError> {
        self.ensure_active()?;
        if !self.state.is_approved() {
            return Err(AccessError::NotApproved);
        }

        let path = paths::room_clipboard(&self.room_id);
        let value = encode(&path, &payload)?;
        self.store.write(&path, value).await?;

        info!(room_id = %self.room_id, summary = %payload.summary(), "clipboard shared");
        Ok(())
    }

    /// Leave the room: remove own participant and request entries, stop watching.
    ///
    /// The owner may leave too; the room then keeps its owner field but has
    /// one participant fewer.
    pub async fn leave(mut self) -> Result<(), AccessError> {
        self.ensure_active()?;
        self.apply(RoomAccessEvent::LeaveRequested).await?;
        info!(room_id = %self.room_id, "left room");
        Ok(())
    }

    /// Owner only: delete the whole room node.
    pub async fn delete(mut self) -> Result<(), AccessError> {
        self.ensure_active()?;
        if self.state != RoomAccessState::Owner {
            return Err(AccessError::NotOwner("delete the room"));
        }
        self.apply(RoomAccessEvent::DeleteRequested).await?;
        info!(room_id = %self.room_id, "room deleted");
        Ok(())
    }

    /// Wait for the next change worth showing.
    ///
    /// Cancel safe: when the returned future is dropped before completing, no
    /// snapshot is lost and a transition it had started is finished by the
    /// next call, which also returns the event that transition announces.
    ///
    /// Returns [`AccessError::Inactive`] once the room is gone or left.
    pub async fn next_event(&mut self) -> Result<RoomEvent, AccessError> {
        loop {
            if let Some(event) = self.settle().await? {
                return Ok(event);
            }
            self.ensure_active()?;
            if self.watches.is_empty() {
                return Err(AccessError::Inactive(self.state));
            }

            let update = {
                let watches = &mut self.watches;
                tokio::select! {
                    snapshot = next_snapshot(&mut watches.room) => WatchUpdate::Room(snapshot?),
                    snapshot = next_snapshot(&mut watches.requests) => WatchUpdate::Requests(snapshot?),
                    snapshot = next_snapshot(&mut watches.participant) => WatchUpdate::Participant(snapshot?),
                    snapshot = next_snapshot(&mut watches.clipboard) => WatchUpdate::Clipboard(snapshot?),
                }
            };

            if let Some(event) = self.handle(update) {
                return Ok(event);
            }
        }
    }

    /// Fold one snapshot into the session.
    ///
    /// Never awaits: state changes are only staged here and carried out by
    /// [`Self::settle`].
    fn handle(&mut self, update: WatchUpdate) -> Option<RoomEvent> {
        match update {
            WatchUpdate::Room(None) => {
                warn!(room_id = %self.room_id, "room vanished");
                self.pending.clear();
                self.begin(RoomAccessEvent::RoomVanished, |_, _| Some(RoomEvent::RoomDeleted));
                None
            }
            WatchUpdate::Room(Some(_)) => None,

            WatchUpdate::Requests(value) => {
                let pending = flagged_uids(&membership_flags(value));
                if pending == self.pending {
                    return None;
                }
                self.pending.clone_from(&pending);
                Some(RoomEvent::RequestsChanged(pending))
            }

            WatchUpdate::Participant(Some(Value::Bool(true))) => {
                let room_id = self.room_id.clone();
                self.begin(RoomAccessEvent::ParticipantEntryAppeared, |before, next| {
                    (before == RoomAccessState::Pending && next.is_approved()).then(|| {
                        info!(room_id = %room_id, "join request approved by owner");
                        RoomEvent::Approved
                    })
                });
                None
            }
            WatchUpdate::Participant(_) => None,

            // The last clipboard stays visible when the node is cleared.
            WatchUpdate::Clipboard(None) => None,
            WatchUpdate::Clipboard(Some(value)) => {
                match serde_json::from_value::<ClipboardPayload>(value) {
                    Ok(payload) => {
                        if self.clipboard.as_ref() == Some(&payload) {
                            return None;
                        }
                        self.clipboard = Some(payload.clone());
                        Some(RoomEvent::ClipboardChanged(payload))
                    }
                    Err(err) => {
                        warn!(room_id = %self.room_id, error = %err, "unreadable clipboard payload");
                        Some(RoomEvent::ClipboardUnreadable {
                            reason: err.to_string(),
                        })
                    }
                }
            }
        }
    }

    /// Stage the transition for `event`; `announce` picks the event reported
    /// once it completes, given the state before and after.
    fn begin(
        &mut self,
        event: RoomAccessEvent,
        announce: impl FnOnce(RoomAccessState, RoomAccessState) -> Option<RoomEvent>,
    ) {
        let before = self.state;
        let (next, actions) = RoomAccessStateMachine::transition(before, event, &self.uid);
        debug!(from = ?before, to = ?next, ?actions, "room access transition");
        let announce = announce(before, next);
        self.stage(next, actions, announce);
    }

    fn stage(
        &mut self,
        next: RoomAccessState,
        actions: Vec<RoomAccessAction>,
        announce: Option<RoomEvent>,
    ) {
        self.staged = Some(StagedTransition {
            next,
            actions: actions.into(),
            announce,
        });
    }

    /// Run what is left of the staged transition, then commit its state.
    ///
    /// An action is removed only once it completed. Every action is safe to
    /// run twice, so an interrupted one simply runs again.
    async fn settle(&mut self) -> Result<Option<RoomEvent>, AccessError> {
        loop {
            let action = match self.staged.as_ref() {
                None => return Ok(None),
                Some(staged) => staged.actions.front().cloned(),
            };

            match action {
                Some(action) => {
                    self.run(action).await?;
                    if let Some(staged) = self.staged.as_mut() {
                        staged.actions.pop_front();
                    }
                }
                None => {
                    if let Some(done) = self.staged.take() {
                        self.state = done.next;
                        return Ok(done.announce);
                    }
                }
            }
        }
    }

    /// Drive `event` to completion, finishing any interrupted transition first.
    async fn apply(&mut self, event: RoomAccessEvent) -> Result<(), AccessError> {
        self.settle().await?;
        self.begin(event, |_, _| None);
        self.settle().await?;
        Ok(())
    }

    async fn run(&mut self, action: RoomAccessAction) -> Result<(), AccessError> {
        let store = self.store.clone();
        match action {
            // Performed by JoinRoom as a compare-and-set before entering.
            RoomAccessAction::CreateRoom => {}
            RoomAccessAction::RequestJoin => {
                store
                    .write(&paths::room_request(&self.room_id, &self.uid), Value::Bool(true))
                    .await?;
            }
            RoomAccessAction::WatchRequests => {
                let path = paths::room_requests(&self.room_id);
                self.watches.requests = Some(store.subscribe(&path).await?);
            }
            RoomAccessAction::WatchParticipantEntry => {
                let path = paths::room_participant(&self.room_id, &self.uid);
                self.watches.participant = Some(store.subscribe(&path).await?);
            }
            RoomAccessAction::StopWatchingParticipantEntry => {
                self.watches.participant = None;
            }
            RoomAccessAction::WatchRoom => {
                self.watches.room = Some(store.subscribe(&paths::room(&self.room_id)).await?);
            }
            RoomAccessAction::WatchClipboard => {
                let path = paths::room_clipboard(&self.room_id);
                self.watches.clipboard = Some(store.subscribe(&path).await?);
            }
            RoomAccessAction::ClearOwnEntries => {
                store
                    .write(&paths::room_participant(&self.room_id, &self.uid), Value::Null)
                    .await?;
                store
                    .write(&paths::room_request(&self.room_id, &self.uid), Value::Null)
                    .await?;
            }
            RoomAccessAction::DeleteRoom => {
                // Drop the room watch first so our own deletion is not reported back.
                self.watches.room = None;
                store.write(&paths::room(&self.room_id), Value::Null).await?;
            }
            RoomAccessAction::StopAllWatches => {
                self.watches = RoomWatches::default();
            }
        }
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), AccessError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(AccessError::Inactive(self.state))
        }
    }
}

async fn next_snapshot(watch: &mut Option<TreeSubscription>) -> Result<Option<TreeValue>, StoreError> {
    match watch {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

impl fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomSession")
            .field("room_id", &self.room_id)
            .field("uid", &self.uid)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
