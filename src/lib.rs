// Public modules
pub mod chat;
pub mod client;
pub mod coach;
pub mod config;
pub mod conversation;
pub mod error;
pub mod identity;
pub mod notify;
pub mod observability;
pub mod sse;
pub mod store;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{ChatTransport, CoachClient, EventStream};
pub use coach::{CoachSession, SUGGESTED_PROMPTS};
pub use config::CoachConfig;
pub use conversation::{Conversation, StreamPhase};
pub use error::{Error, Result};
pub use identity::{Identity, SessionContext};
pub use notify::{Notice, NoticeLog, Notify};
pub use sse::{StreamEvent, process_sse};
pub use store::{HISTORY_LIMIT, MemoryStore, SqliteStore, StoredTurn, TurnStore};
pub use types::*;
