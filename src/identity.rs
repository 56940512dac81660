//! Session identity for the signed-in player.
//!
//! Identity is carried as an explicit context object handed to whatever
//! needs it, with a lifecycle that starts at sign-in and ends at sign-out.
//! There is no ambient "current user" singleton.

use time::OffsetDateTime;
use uuid::Uuid;

/// The identity a conversation and its persisted turns are scoped to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    user_id: Uuid,
}

impl Identity {
    /// Wraps an authenticated user id.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// The underlying user id.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.user_id.fmt(f)
    }
}

/// An established sign-in, from authentication until sign-out.
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: Identity,
    established_at: OffsetDateTime,
}

impl SessionContext {
    /// Establishes a session for the given user id.
    pub fn sign_in(user_id: Uuid) -> Self {
        Self {
            identity: Identity::new(user_id),
            established_at: OffsetDateTime::now_utc(),
        }
    }

    /// The identity this session was established for.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// When the session was established.
    pub fn established_at(&self) -> OffsetDateTime {
        self.established_at
    }

    /// Tears the session down. Consuming the context is the teardown;
    /// nothing derived from it should outlive this call.
    pub fn sign_out(self) {}
}
