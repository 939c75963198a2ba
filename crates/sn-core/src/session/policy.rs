use crate::ids::Uid;

use super::ClipboardSession;

/// What a principal entering a session has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDecision {
    /// Node absent: create it naming the principal as owner.
    Create,
    /// Node present without owner: claim it.
    Claim,
    /// The principal already owns the node.
    Resume,
    /// Someone else owns the node.
    Deny { owner: Uid },
}

pub struct SessionAccessPolicy;

impl SessionAccessPolicy {
    pub fn decide(existing: Option<&ClipboardSession>, uid: &Uid) -> SessionDecision {
        match existing {
            None => SessionDecision::Create,
            Some(session) => match &session.owner {
                None => SessionDecision::Claim,
                Some(owner) if owner == uid => SessionDecision::Resume,
                Some(owner) => SessionDecision::Deny {
                    owner: owner.clone(),
                },
            },
        }
    }
}
