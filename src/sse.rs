//! Server-Sent Events (SSE) processing for streaming coach replies.
//!
//! This module handles parsing of the newline-delimited event stream
//! returned by the coach endpoint, converting raw byte chunks into
//! incremental content deltas.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability;
use crate::types::CompletionChunk;
use crate::{Error, Result};

/// An event decoded from the response byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental content fragment for the in-progress assistant turn.
    Delta(String),

    /// The `[DONE]` sentinel. No further deltas will be emitted, but the
    /// underlying byte stream is still drained to completion.
    Done,
}

/// Process a stream of bytes into a stream of content deltas.
///
/// The decoder buffers raw bytes and repeatedly scans for complete
/// newline-terminated lines. Comment lines (leading `:`), blank lines, and
/// lines without a `data: ` prefix are discarded without ever reaching the
/// JSON parser. A data line whose payload fails to parse is pushed back onto
/// the buffer, newline restored, until more bytes arrive; a payload of
/// `[DONE]` ends line processing for the rest of the stream.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let buffer: Vec<u8> = Vec::new();
    let done = false;

    stream::unfold(
        (stream, buffer, done),
        move |(mut stream, mut buffer, mut done)| async move {
            loop {
                // First drain any complete lines already buffered.
                if !done {
                    if let Some(event) = next_event(&mut buffer, &mut done) {
                        return Some((event, (stream, buffer, done)));
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        observability::STREAM_BYTES.count(bytes.len() as u64);
                        if done {
                            // [DONE] was observed; drain without decoding.
                            buffer.clear();
                        } else {
                            buffer.extend_from_slice(&bytes);
                        }
                    }
                    Some(Err(e)) => {
                        observability::STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, done)));
                    }
                    None => {
                        // End of input. An incomplete trailing line is
                        // indistinguishable from a truncated chunk and is
                        // dropped rather than surfaced.
                        return None;
                    }
                }
            }
        },
    )
}

/// Scan the buffer for the next decodable event, consuming complete lines.
///
/// Returns `None` when no complete line remains, or when a data line's
/// payload failed to parse and was pushed back to wait for more bytes.
fn next_event(buffer: &mut Vec<u8>, done: &mut bool) -> Option<Result<StreamEvent>> {
    loop {
        let newline = buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                observability::STREAM_ERRORS.click();
                return Some(Err(Error::encoding(
                    format!("Invalid UTF-8 in stream: {e}"),
                    Some(Box::new(e)),
                )));
            }
        };

        if line.starts_with(':') || line.trim().is_empty() {
            continue;
        }
        let Some(payload) = line.strip_prefix("data: ") else {
            continue;
        };

        let payload = payload.trim();
        if payload == "[DONE]" {
            *done = true;
            return Some(Ok(StreamEvent::Done));
        }

        match serde_json::from_str::<CompletionChunk>(payload) {
            Ok(chunk) => {
                if let Some(content) = chunk.content() {
                    observability::STREAM_DELTAS.click();
                    return Some(Ok(StreamEvent::Delta(content.to_string())));
                }
                // A well-formed frame without content contributes nothing.
            }
            Err(_) => {
                // The line was read before it was fully buffered. Restore it,
                // newline included, and wait for the rest to arrive.
                let mut restored = line.into_bytes();
                restored.push(b'\n');
                restored.extend_from_slice(buffer);
                *buffer = restored;
                return None;
            }
        }
    }
}
