//! The exchange loop: send a prompt, stream the reply, persist both turns.
//!
//! This module ties the transport, conversation state machine, message
//! store, and notification sink together. One session owns one
//! conversation for one signed-in identity; only a single
//! send-and-stream operation may be active at a time, enforced by an
//! advisory busy flag that is cleared on every exit path.

use std::time::Instant;

use futures::StreamExt;

use crate::client::ChatTransport;
use crate::conversation::Conversation;
use crate::identity::SessionContext;
use crate::notify::{Notice, Notify};
use crate::observability;
use crate::sse::StreamEvent;
use crate::store::{HISTORY_LIMIT, TurnStore};
use crate::types::Turn;
use crate::{Error, Result};

/// Canned prompts offered when a conversation is empty.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "How can I improve my aim in FPS games?",
    "What's the best way to rank up in Valorant?",
    "How do I stop tilting after losses?",
    "What should I focus on as a beginner?",
];

/// A coaching session for one signed-in identity.
pub struct CoachSession<T: ChatTransport, S: TurnStore, N: Notify> {
    transport: T,
    store: S,
    notifier: N,
    context: SessionContext,
    conversation: Conversation,
    streaming: bool,
}

impl<T: ChatTransport, S: TurnStore, N: Notify> CoachSession<T, S, N> {
    /// Creates a session with an empty conversation.
    pub fn new(transport: T, store: S, notifier: N, context: SessionContext) -> Self {
        Self {
            transport,
            store,
            notifier,
            context,
            conversation: Conversation::new(),
            streaming: false,
        }
    }

    /// Loads the most recent persisted turns into the conversation,
    /// oldest first, capped at [`HISTORY_LIMIT`].
    pub async fn load_history(&mut self) -> Result<()> {
        let stored = self
            .store
            .recent(self.context.identity(), HISTORY_LIMIT)
            .await?;
        self.conversation
            .load(stored.into_iter().map(Turn::from).collect())
    }

    /// Sends a user prompt and streams the assistant's reply.
    ///
    /// The user turn is appended and persisted before the request opens;
    /// each delta replaces the trailing assistant turn with the full
    /// accumulation and is also handed to `on_delta` for display. When the
    /// stream ends, the assembled reply is persisted. If nothing
    /// accumulated, or the exchange failed, no assistant turn is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] without issuing a request if a reply is
    /// already streaming. Transport and decode failures are returned after
    /// surfacing exactly one [`Notice`]; the busy flag is cleared on every
    /// path so the user can retry manually.
    pub async fn send<F>(&mut self, input: &str, mut on_delta: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        if self.streaming {
            observability::COACH_REJECTED_BUSY.click();
            return Err(Error::busy(
                "a reply is already streaming for this conversation",
            ));
        }

        self.streaming = true;
        let result = self.exchange(input, &mut on_delta).await;
        self.streaming = false;
        result
    }

    async fn exchange(&mut self, input: &str, on_delta: &mut dyn FnMut(&str)) -> Result<()> {
        observability::COACH_EXCHANGES.click();
        let user_turn = Turn::user(input);
        self.conversation.begin_exchange(user_turn.clone())?;

        // Persist the user turn before the request opens. A failed write is
        // tolerated: the turn stays in memory for this exchange and is
        // simply absent from future history loads.
        if self
            .store
            .insert(self.context.identity(), &user_turn)
            .await
            .is_err()
        {
            observability::STORE_WRITE_ERRORS.click();
        }

        let mut stream = match self
            .transport
            .stream_completion(self.conversation.turns())
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                self.conversation.fail();
                self.raise(Notice::for_error(&err));
                return Err(err);
            }
        };

        let started = Instant::now();
        loop {
            match stream.next().await {
                Some(Ok(StreamEvent::Delta(fragment))) => {
                    self.conversation.apply_delta(&fragment);
                    on_delta(&fragment);
                }
                Some(Ok(StreamEvent::Done)) => {
                    // No further deltas will arrive; keep draining until the
                    // byte stream itself ends.
                }
                Some(Err(err)) => {
                    observability::STREAM_DURATION.add(started.elapsed().as_secs_f64());
                    self.conversation.fail();
                    self.raise(Notice::for_error(&err));
                    return Err(err);
                }
                None => break,
            }
        }
        observability::STREAM_DURATION.add(started.elapsed().as_secs_f64());

        if let Some(content) = self.conversation.finish() {
            let assistant_turn = Turn::assistant(content);
            // Same deliberate tolerance as the user-turn write above.
            if self
                .store
                .insert(self.context.identity(), &assistant_turn)
                .await
                .is_err()
            {
                observability::STORE_WRITE_ERRORS.click();
            }
        }
        Ok(())
    }

    fn raise(&mut self, notice: Notice) {
        observability::COACH_NOTICES.click();
        self.notifier.notify(notice);
    }

    /// The conversation as currently rendered.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The session context this conversation is scoped to.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// True while a reply is streaming.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// The notification sink.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The message store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Clears the in-memory conversation. Persisted turns are unaffected.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Consumes the session and tears down its sign-in context.
    pub fn sign_out(self) {
        self.context.sign_out();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::stream;
    use uuid::Uuid;

    use super::*;
    use crate::client::EventStream;
    use crate::notify::NoticeLog;
    use crate::store::MemoryStore;

    struct CountingTransport {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ChatTransport for CountingTransport {
        async fn stream_completion(&self, _history: &[Turn]) -> Result<EventStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::pin(stream::empty()))
        }
    }

    fn session(
        calls: Arc<AtomicUsize>,
    ) -> CoachSession<CountingTransport, MemoryStore, NoticeLog> {
        CoachSession::new(
            CountingTransport { calls },
            MemoryStore::new(),
            NoticeLog::new(),
            SessionContext::sign_in(Uuid::new_v4()),
        )
    }

    #[tokio::test]
    async fn busy_flag_rejects_reentrant_send() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut coach = session(calls.clone());

        // Simulate an in-flight exchange.
        coach.streaming = true;
        let err = coach.send("second prompt", |_| {}).await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Once the first exchange ends, sends are accepted again.
        coach.streaming = false;
        coach.send("second prompt", |_| {}).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!coach.is_streaming());
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut coach = session(calls.clone());

        coach.send("   ", |_| {}).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(coach.conversation().is_empty());
    }

    #[tokio::test]
    async fn empty_stream_persists_only_user_turn() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut coach = session(calls);

        coach.send("anyone there?", |_| {}).await.unwrap();
        let identity = coach.context().identity();
        assert_eq!(coach.store().count(identity), 1);
        assert_eq!(coach.conversation().len(), 1);
    }
}
