//! User-visible notifications for failed exchanges.
//!
//! The exchange loop never retries on its own; it surfaces exactly one
//! notice per failure and leaves the user to try again. Implementations of
//! [`Notify`] decide how a notice is shown.

use crate::Error;

/// A user-visible notice raised by a failed exchange.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The backend rate-limited the request. Try again later.
    RateLimited,

    /// The account is out of credits for AI features.
    CreditsRequired,

    /// The coach could not be reached or the reply could not be read.
    CoachUnavailable,
}

impl Notice {
    /// Classifies an exchange error into the notice shown for it.
    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::RateLimit { .. } => Notice::RateLimited,
            Error::CreditsExhausted { .. } => Notice::CreditsRequired,
            _ => Notice::CoachUnavailable,
        }
    }

    /// The message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::RateLimited => "Rate limit exceeded. Please try again later.",
            Notice::CreditsRequired => "Please add credits to continue using AI features.",
            Notice::CoachUnavailable => "Failed to get a response from the AI coach.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Sink for user-visible notices.
pub trait Notify: Send {
    /// Surface one notice to the user.
    fn notify(&mut self, notice: Notice);
}

/// A notifier that records notices in memory.
///
/// Useful for embedders that render notices elsewhere, and for tests that
/// assert on exactly which notices an exchange produced.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The notices recorded so far, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Removes and returns the recorded notices.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Notify for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_status() {
        assert_eq!(
            Notice::for_error(&Error::rate_limit("slow down", None)),
            Notice::RateLimited
        );
        assert_eq!(
            Notice::for_error(&Error::credits_exhausted("pay up")),
            Notice::CreditsRequired
        );
        assert_eq!(
            Notice::for_error(&Error::api(500, "boom".to_string(), None)),
            Notice::CoachUnavailable
        );
        assert_eq!(
            Notice::for_error(&Error::connection("refused", None)),
            Notice::CoachUnavailable
        );
    }

    #[test]
    fn log_records_in_order() {
        let mut log = NoticeLog::new();
        log.notify(Notice::RateLimited);
        log.notify(Notice::CoachUnavailable);
        assert_eq!(
            log.notices(),
            &[Notice::RateLimited, Notice::CoachUnavailable]
        );
        assert_eq!(log.drain().len(), 2);
        assert!(log.notices().is_empty());
    }
}
