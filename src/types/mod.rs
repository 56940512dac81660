//! Data types for the LevelUp client.
//!
//! This module contains the conversation and wire types exchanged with the
//! coach endpoint and the persistence layer.

mod chat_request;
mod completion_chunk;
mod profile;
mod turn;

pub use chat_request::ChatRequest;
pub use completion_chunk::{ChunkChoice, ChunkDelta, CompletionChunk};
pub use profile::{PlayerProfile, UserGame};
pub use turn::{Turn, TurnRole};
