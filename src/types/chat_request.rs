use serde::Serialize;

use crate::types::Turn;

/// The request body sent to the streaming coach endpoint.
///
/// The endpoint expects the full turn history, oldest first, including the
/// new user turn that prompted the exchange.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Ordered conversation history.
    pub messages: &'a [Turn],
}

impl<'a> ChatRequest<'a> {
    /// Create a request from a turn history.
    pub fn new(messages: &'a [Turn]) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_body_shape() {
        let turns = vec![
            Turn::user("How can I improve my aim?"),
            Turn::assistant("Lower your sensitivity."),
            Turn::user("What about crosshair placement?"),
        ];
        let request = ChatRequest::new(&turns);
        let json = to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "messages": [
                    {"role": "user", "content": "How can I improve my aim?"},
                    {"role": "assistant", "content": "Lower your sensitivity."},
                    {"role": "user", "content": "What about crosshair placement?"}
                ]
            })
        );
    }
}
