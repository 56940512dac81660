//! Persistence seam for conversation turns and player profiles.
//!
//! The store is an external collaborator as far as the exchange loop is
//! concerned: reads supply history on load, writes record each turn.
//! Implementations return explicit `Result`s; callers that choose to keep
//! going after a failed write do so visibly, not by losing the error.

mod memory;
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::identity::Identity;
use crate::types::{PlayerProfile, Turn, TurnRole, UserGame};
use crate::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// The most recent turns fetched when bootstrapping a conversation.
pub const HISTORY_LIMIT: u32 = 50;

/// A persisted turn, with the creation timestamp the store ordered it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurn {
    /// The role of the author.
    pub role: TurnRole,

    /// The text content of the turn.
    pub content: String,

    /// When the row was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

impl From<StoredTurn> for Turn {
    fn from(stored: StoredTurn) -> Self {
        Turn::new(stored.role, stored.content)
    }
}

/// Store of conversation turns, keyed by identity and ordered by creation.
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// Fetch up to `limit` of the most recent turns for an identity,
    /// returned oldest first.
    async fn recent(&self, identity: Identity, limit: u32) -> Result<Vec<StoredTurn>>;

    /// Insert one turn for an identity. The creation timestamp is assigned
    /// by the store.
    async fn insert(&self, identity: Identity, turn: &Turn) -> Result<()>;
}

/// Store of player profiles and tracked games.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for an identity, if one was ever saved.
    async fn profile(&self, identity: Identity) -> Result<Option<PlayerProfile>>;

    /// Create or replace the profile for an identity.
    async fn upsert_profile(&self, identity: Identity, profile: &PlayerProfile) -> Result<()>;

    /// Fetch the games tracked on an identity's profile.
    async fn games(&self, identity: Identity) -> Result<Vec<UserGame>>;

    /// Track one more game on an identity's profile.
    async fn add_game(&self, identity: Identity, game: &UserGame) -> Result<()>;

    /// Stop tracking a game by name.
    async fn remove_game(&self, identity: Identity, game_name: &str) -> Result<()>;
}
