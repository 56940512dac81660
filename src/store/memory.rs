//! In-memory turn store for tests and offline use.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::identity::Identity;
use crate::observability;
use crate::store::{StoredTurn, TurnStore};
use crate::types::Turn;
use crate::{Error, Result};

/// A [`TurnStore`] backed by a process-local map.
///
/// Writes can be made to fail on demand, which lets tests exercise the
/// exchange loop's tolerance for persistence failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    turns: Mutex<HashMap<Uuid, Vec<StoredTurn>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Total turns stored for an identity.
    pub fn count(&self, identity: Identity) -> usize {
        self.turns
            .lock()
            .expect("memory store lock poisoned")
            .get(&identity.user_id())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl TurnStore for MemoryStore {
    async fn recent(&self, identity: Identity, limit: u32) -> Result<Vec<StoredTurn>> {
        observability::STORE_READS.click();
        let turns = self.turns.lock().expect("memory store lock poisoned");
        let all = turns.get(&identity.user_id()).cloned().unwrap_or_default();
        let skip = all.len().saturating_sub(limit as usize);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn insert(&self, identity: Identity, turn: &Turn) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::database("memory store writes disabled", None));
        }
        observability::STORE_WRITES.click();
        let mut turns = self.turns.lock().expect("memory store lock poisoned");
        turns
            .entry(identity.user_id())
            .or_default()
            .push(StoredTurn {
                role: turn.role,
                content: turn.content.clone(),
                created_at: OffsetDateTime::now_utc(),
            });
        Ok(())
    }
}
