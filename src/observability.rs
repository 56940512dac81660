use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("levelup.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("levelup.client.request_errors");

pub(crate) static STREAM_BYTES: Counter = Counter::new("levelup.stream.bytes");
pub(crate) static STREAM_DELTAS: Counter = Counter::new("levelup.stream.deltas");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("levelup.stream.errors");
pub(crate) static STREAM_DURATION: Moments = Moments::new("levelup.stream.duration_seconds");

pub(crate) static STORE_READS: Counter = Counter::new("levelup.store.reads");
pub(crate) static STORE_WRITES: Counter = Counter::new("levelup.store.writes");
pub(crate) static STORE_WRITE_ERRORS: Counter = Counter::new("levelup.store.write_errors");

pub(crate) static COACH_EXCHANGES: Counter = Counter::new("levelup.coach.exchanges");
pub(crate) static COACH_REJECTED_BUSY: Counter = Counter::new("levelup.coach.rejected_busy");
pub(crate) static COACH_NOTICES: Counter = Counter::new("levelup.coach.notices");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_DELTAS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&STORE_READS);
    collector.register_counter(&STORE_WRITES);
    collector.register_counter(&STORE_WRITE_ERRORS);

    collector.register_counter(&COACH_EXCHANGES);
    collector.register_counter(&COACH_REJECTED_BUSY);
    collector.register_counter(&COACH_NOTICES);
}
