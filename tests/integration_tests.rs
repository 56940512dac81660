//! Integration tests for the exchange loop.
//!
//! These tests drive a `CoachSession` with a scripted transport, the real
//! SSE decoder, an in-memory store, and a collecting notifier. No network
//! or API key is required.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::stream;
use uuid::Uuid;

use levelup::{
    ChatTransport, CoachSession, Error, EventStream, MemoryStore, Notice, NoticeLog, Result,
    SessionContext, StreamEvent, Turn, TurnRole, TurnStore, process_sse,
};

/// One scripted reply from the transport.
enum Step {
    /// Fail before streaming starts, as a classified status would.
    Fail(Error),

    /// Succeed with a body delivered in the given byte chunks, decoded by
    /// the real SSE pipeline.
    Body(Vec<&'static [u8]>),

    /// Succeed with pre-decoded events, for injecting mid-stream errors.
    Events(Vec<Result<StreamEvent>>),
}

struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Arc<AtomicUsize>,
    last_history_len: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            last_history_len: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for ScriptedTransport {
    async fn stream_completion(&self, history: &[Turn]) -> Result<EventStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_history_len.store(history.len(), Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .expect("transport called more times than scripted");
        match step {
            Step::Fail(err) => Err(err),
            Step::Body(chunks) => {
                let chunks: Vec<std::result::Result<Bytes, reqwest::Error>> = chunks
                    .into_iter()
                    .map(|c| Ok(Bytes::copy_from_slice(c)))
                    .collect();
                Ok(Box::pin(process_sse(Box::pin(stream::iter(chunks)))))
            }
            Step::Events(events) => Ok(Box::pin(stream::iter(events))),
        }
    }
}

fn session(
    steps: Vec<Step>,
) -> (
    CoachSession<ScriptedTransport, MemoryStore, NoticeLog>,
    Arc<AtomicUsize>,
    Arc<AtomicUsize>,
) {
    let transport = ScriptedTransport::new(steps);
    let calls = transport.calls.clone();
    let history_len = transport.last_history_len.clone();
    let coach = CoachSession::new(
        transport,
        MemoryStore::new(),
        NoticeLog::new(),
        SessionContext::sign_in(Uuid::new_v4()),
    );
    (coach, calls, history_len)
}

const HELLO_BODY: &[u8] = b": keep-alive\n\
data: {\"choices\":[{\"delta\":{\"content\":\"He\"}}]}\n\
data: {\"choices\":[{\"delta\":{\"content\":\"llo\"}}]}\n\
data: [DONE]\n";

#[tokio::test]
async fn successful_exchange_persists_user_then_assistant() {
    let (mut coach, calls, _) = session(vec![Step::Body(vec![HELLO_BODY])]);
    let mut displayed = String::new();

    coach
        .send("How can I improve my aim in FPS games?", |delta| {
            displayed.push_str(delta);
        })
        .await
        .unwrap();

    assert_eq!(displayed, "Hello");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let turns = coach.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[1].role, TurnRole::Assistant);
    assert_eq!(turns[1].content, "Hello");

    // Exactly two persisted rows for the exchange, user first.
    let identity = coach.context().identity();
    let stored = coach.store().recent(identity, 50).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].role, TurnRole::User);
    assert_eq!(stored[1].role, TurnRole::Assistant);
    assert_eq!(stored[1].content, "Hello");

    assert!(coach.notifier().notices().is_empty());
    assert!(!coach.is_streaming());
}

#[tokio::test]
async fn body_split_at_chunk_boundary_accumulates_identically() {
    // Split mid-payload so the decoder must buffer and push back.
    let split = 40;
    let (head, tail) = HELLO_BODY.split_at(split);
    let (mut coach, _, _) = session(vec![Step::Body(vec![head, tail])]);

    coach.send("hello?", |_| {}).await.unwrap();
    assert_eq!(coach.conversation().last().unwrap().content, "Hello");
}

#[tokio::test]
async fn rate_limited_exchange_notifies_once_and_keeps_last_turn() {
    let (mut coach, calls, _) = session(vec![Step::Fail(Error::rate_limit(
        "too many requests",
        Some(30),
    ))]);

    let err = coach.send("coach me", |_| {}).await.unwrap_err();
    assert!(err.is_rate_limit());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Exactly one rate-limit notice.
    assert_eq!(coach.notifier().notices(), &[Notice::RateLimited]);

    // The conversation still ends with the user turn; no empty assistant
    // turn exists in memory or in the store.
    let last = coach.conversation().last().unwrap();
    assert_eq!(last.role, TurnRole::User);
    assert_eq!(last.content, "coach me");

    let identity = coach.context().identity();
    let stored = coach.store().recent(identity, 50).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, TurnRole::User);

    assert!(!coach.is_streaming());
}

#[tokio::test]
async fn credits_exhausted_maps_to_credits_notice() {
    let (mut coach, _, _) = session(vec![Step::Fail(Error::credits_exhausted("add credits"))]);

    let err = coach.send("coach me", |_| {}).await.unwrap_err();
    assert!(err.is_credits_exhausted());
    assert_eq!(coach.notifier().notices(), &[Notice::CreditsRequired]);
}

#[tokio::test]
async fn generic_failure_maps_to_generic_notice() {
    let (mut coach, _, _) = session(vec![Step::Fail(Error::api(
        500,
        "internal".to_string(),
        None,
    ))]);

    coach.send("coach me", |_| {}).await.unwrap_err();
    assert_eq!(coach.notifier().notices(), &[Notice::CoachUnavailable]);
}

#[tokio::test]
async fn mid_stream_error_discards_partial_content() {
    let (mut coach, _, _) = session(vec![
        Step::Events(vec![
            Ok(StreamEvent::Delta("par".to_string())),
            Err(Error::streaming("connection reset", None)),
        ]),
        Step::Body(vec![HELLO_BODY]),
    ]);

    let err = coach.send("first try", |_| {}).await.unwrap_err();
    assert!(matches!(err, Error::Streaming { .. }));
    assert_eq!(coach.notifier().notices(), &[Notice::CoachUnavailable]);

    // Partial content stays on screen but was never persisted.
    assert_eq!(coach.conversation().last().unwrap().content, "par");
    let identity = coach.context().identity();
    let stored = coach.store().recent(identity, 50).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, TurnRole::User);

    // The busy flag cleared, so a manual retry goes through.
    assert!(!coach.is_streaming());
    coach.send("second try", |_| {}).await.unwrap();
    assert_eq!(coach.conversation().last().unwrap().content, "Hello");
}

#[tokio::test]
async fn request_carries_full_history_including_new_turn() {
    let (mut coach, _, history_len) = session(vec![
        Step::Body(vec![HELLO_BODY]),
        Step::Body(vec![HELLO_BODY]),
    ]);

    coach.send("first", |_| {}).await.unwrap();
    assert_eq!(history_len.load(Ordering::SeqCst), 1);

    coach.send("second", |_| {}).await.unwrap();
    // prior user turn + assistant reply + the new user turn
    assert_eq!(history_len.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn done_without_content_persists_nothing() {
    let (mut coach, _, _) = session(vec![Step::Body(vec![b"data: [DONE]\n"])]);

    coach.send("anyone there?", |_| {}).await.unwrap();
    assert_eq!(coach.conversation().len(), 1);

    let identity = coach.context().identity();
    let stored = coach.store().recent(identity, 50).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, TurnRole::User);
}

#[tokio::test]
async fn failed_persistence_is_tolerated() {
    let (mut coach, _, _) = session(vec![Step::Body(vec![HELLO_BODY])]);
    coach.store().set_fail_writes(true);

    // The exchange still completes; the turns simply never became durable.
    coach.send("remember this", |_| {}).await.unwrap();
    assert_eq!(coach.conversation().len(), 2);

    let identity = coach.context().identity();
    assert_eq!(coach.store().count(identity), 0);
}

#[tokio::test]
async fn load_history_caps_at_fifty_ascending() {
    let store = MemoryStore::new();
    let user_id = Uuid::new_v4();
    let context = SessionContext::sign_in(user_id);
    let identity = context.identity();
    for i in 0..60 {
        let turn = if i % 2 == 0 {
            Turn::user(format!("question {i}"))
        } else {
            Turn::assistant(format!("answer {i}"))
        };
        store.insert(identity, &turn).await.unwrap();
    }

    let mut coach = CoachSession::new(
        ScriptedTransport::new(Vec::new()),
        store,
        NoticeLog::new(),
        context,
    );
    coach.load_history().await.unwrap();

    let turns = coach.conversation().turns();
    assert_eq!(turns.len(), 50);
    assert_eq!(turns.first().unwrap().content, "question 10");
    assert_eq!(turns.last().unwrap().content, "answer 59");
}
