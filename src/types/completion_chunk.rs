use serde::Deserialize;

/// One parsed frame of the streamed completion response.
///
/// The provider shape nests the incremental text under
/// `choices[0].delta.content`. Every field is optional on the wire; frames
/// that carry no content (role announcements, finish markers) deserialize
/// cleanly and simply yield no delta.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionChunk {
    /// Candidate completions; in practice the endpoint sends exactly one.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// A single candidate within a completion chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    /// The incremental payload for this candidate.
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// The incremental content fragment contributed by one frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    /// New text to append to the assistant turn, if any.
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// The content fragment carried by this chunk, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}
