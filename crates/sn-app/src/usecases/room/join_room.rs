//! Use case for entering a room.

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use sn_core::ports::{decode, encode, ClockPort, IdentityProviderPort, TreeStorePort};
use sn_core::room::{Room, RoomAccessAction, RoomAccessEvent, RoomAccessState, RoomAccessStateMachine};
use sn_core::{paths, AccessError, RoomId};

use super::RoomSession;
use crate::usecases::MAX_BOOTSTRAP_ROUNDS;

/// Enter `rooms/{roomId}` as owner, participant or pending requester.
///
/// The role follows from one read of the room node:
///
/// | room node                    | role        | written                      |
/// |------------------------------|-------------|------------------------------|
/// | absent                       | Owner       | whole room, caller as owner  |
/// | `owner == uid`               | Owner       | nothing                      |
/// | `participants[uid] == true`  | Participant | nothing                      |
/// | otherwise                    | Pending     | `requests/{uid} = true`      |
///
/// Room creation is a compare-and-set against an absent node; losing that
/// race re-reads and lands in the requester path like any other visitor.
pub struct JoinRoom {
    identity: Arc<dyn IdentityProviderPort>,
    store: Arc<dyn TreeStorePort>,
    clock: Arc<dyn ClockPort>,
}

impl JoinRoom {
    pub fn new(
        identity: Arc<dyn IdentityProviderPort>,
        store: Arc<dyn TreeStorePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            identity,
            store,
            clock,
        }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomSession, AccessError> {
        let span = info_span!("usecase.join_room.execute", room_id = %room_id);

        async {
            let uid = self.identity.authenticate_anonymously().await?;
            let node = paths::room(room_id);

            for round in 1..=MAX_BOOTSTRAP_ROUNDS {
                let room: Option<Room> = decode(&node, self.store.read(&node).await?)?;
                let (state, actions) = RoomAccessStateMachine::transition(
                    RoomAccessState::Uninitialized,
                    RoomAccessEvent::Loaded { room },
                    &uid,
                );

                if actions.contains(&RoomAccessAction::CreateRoom) {
                    let fresh = encode(&node, &Room::create(uid.clone(), self.clock.now_ms()))?;
                    if !self.store.compare_and_set(&node, None, fresh).await? {
                        debug!(round, "room appeared while creating it, reading again");
                        continue;
                    }
                    info!(uid = %uid, "room created");
                }

                let session =
                    RoomSession::enter(self.store.clone(), room_id.clone(), uid, state, actions)
                        .await?;
                info!(role = session.state().role_label(), "joined room");
                return Ok(session);
            }

            Err(AccessError::Contended(node.to_string()))
        }
        .instrument(span)
        .await
    }
}
