//! Room access state machine.
//!
//! Pure transition function from the point of view of one principal in one
//! room. Side effects are returned as [`RoomAccessAction`]s and executed by
//! the application layer.
//!
//! ```text
//! Uninitialized
//!   │ Loaded(None)                         ─► Owner        (CreateRoom)
//!   │ Loaded(owner == me)                  ─► Owner
//!   │ Loaded(participants[me])             ─► Participant
//!   │ Loaded(otherwise)                    ─► Pending      (RequestJoin)
//! Pending ── ParticipantEntryAppeared      ─► Participant
//! Owner|Pending|Participant ── RoomVanished   ─► RoomDeleted
//! Owner|Pending|Participant ── LeaveRequested ─► Left     (ClearOwnEntries)
//! Owner ── DeleteRequested                 ─► RoomDeleted  (DeleteRoom)
//! ```

use serde::{Deserialize, Serialize};

use super::Room;
use crate::ids::Uid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomAccessState {
    Uninitialized,
    Owner,
    Pending,
    Participant,
    Left,
    RoomDeleted,
}

impl RoomAccessState {
    /// Owner and participants see and write the shared clipboard.
    pub fn is_approved(&self) -> bool {
        matches!(self, RoomAccessState::Owner | RoomAccessState::Participant)
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RoomAccessState::Owner | RoomAccessState::Pending | RoomAccessState::Participant
        )
    }

    /// Completes "You are ..." on the room screen.
    pub fn role_label(&self) -> &'static str {
        match self {
            RoomAccessState::Owner => "the owner",
            RoomAccessState::Participant => "a participant",
            RoomAccessState::Pending => "waiting for approval",
            RoomAccessState::Uninitialized => "connecting",
            RoomAccessState::Left => "no longer in this room",
            RoomAccessState::RoomDeleted => "in a deleted room",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAccessEvent {
    /// Result of the initial read of the room node.
    Loaded { room: Option<Room> },
    /// The principal's own `participants/{uid}` entry now exists.
    ParticipantEntryAppeared,
    /// The room node no longer exists.
    RoomVanished,
    LeaveRequested,
    DeleteRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAccessAction {
    CreateRoom,
    RequestJoin,
    WatchRequests,
    WatchParticipantEntry,
    StopWatchingParticipantEntry,
    WatchRoom,
    WatchClipboard,
    ClearOwnEntries,
    DeleteRoom,
    StopAllWatches,
}

pub struct RoomAccessStateMachine;

impl RoomAccessStateMachine {
    pub fn transition(
        state: RoomAccessState,
        event: RoomAccessEvent,
        uid: &Uid,
    ) -> (RoomAccessState, Vec<RoomAccessAction>) {
        use RoomAccessAction as A;
        use RoomAccessState as S;

        match (state, event) {
            (S::Uninitialized, RoomAccessEvent::Loaded { room: None }) => (
                S::Owner,
                vec![A::CreateRoom, A::WatchRequests, A::WatchRoom, A::WatchClipboard],
            ),
            (S::Uninitialized, RoomAccessEvent::Loaded { room: Some(room) }) => {
                if room.is_owner(uid) {
                    (
                        S::Owner,
                        vec![A::WatchRequests, A::WatchRoom, A::WatchClipboard],
                    )
                } else if room.is_participant(uid) {
                    (S::Participant, vec![A::WatchRoom, A::WatchClipboard])
                } else {
                    (
                        S::Pending,
                        vec![A::RequestJoin, A::WatchParticipantEntry, A::WatchRoom],
                    )
                }
            }

            (S::Pending, RoomAccessEvent::ParticipantEntryAppeared) => (
                S::Participant,
                vec![A::StopWatchingParticipantEntry, A::WatchClipboard],
            ),
            // Late or duplicate notification after approval was already observed.
            (S::Participant, RoomAccessEvent::ParticipantEntryAppeared)
            | (S::Owner, RoomAccessEvent::ParticipantEntryAppeared) => (state, Vec::new()),

            (S::Owner | S::Pending | S::Participant, RoomAccessEvent::RoomVanished) => {
                (S::RoomDeleted, vec![A::StopAllWatches])
            }
            (S::Owner | S::Pending | S::Participant, RoomAccessEvent::LeaveRequested) => {
                (S::Left, vec![A::ClearOwnEntries, A::StopAllWatches])
            }
            (S::Owner, RoomAccessEvent::DeleteRequested) => {
                (S::RoomDeleted, vec![A::DeleteRoom, A::StopAllWatches])
            }

            (state, event) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(?state, ?event, "ignored room access event");
                #[cfg(not(feature = "tracing"))]
                let _ = event;
                (state, Vec::new())
            }
        }
    }
}
