//! Character-paced emission used to simulate incremental generation.
//!
//! The generation provider returns one complete text; the emitter
//! replays it character by character with a fixed delay so the answer
//! still arrives incrementally. A real streaming provider would swap
//! this for a native incremental feed under the same cancellation
//! contract.

use crate::{DocvoxError, Result};
use async_stream::stream;
use futures::Stream;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default delay between emitted characters.
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(20);

/// Lazy, cancellable character sequence over a complete text.
#[derive(Debug)]
pub struct PacedEmitter {
    text: String,
    delay: Duration,
    token: CancellationToken,
}

impl PacedEmitter {
    pub fn new(text: impl Into<String>, token: CancellationToken) -> Self {
        Self {
            text: text.into(),
            delay: DEFAULT_CHAR_DELAY,
            token,
        }
    }

    /// Override the inter-character delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Consume the emitter into a character stream.
    ///
    /// Characters arrive in source order with the configured delay in
    /// between. Cancellation is cooperative: it is observed at the top
    /// of each iteration and while suspended on the delay, never in
    /// between. When the token fires the stream yields `Err(Cancelled)`
    /// once and ends; natural exhaustion just ends the stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<String>> {
        let Self { text, delay, token } = self;
        stream! {
            for ch in text.chars() {
                if token.is_cancelled() {
                    yield Err(DocvoxError::Cancelled);
                    return;
                }

                yield Ok(ch.to_string());

                // Race the delay against the abort signal
                let cancelled = tokio::select! {
                    biased;
                    _ = token.cancelled() => true,
                    _ = tokio::time::sleep(delay) => false,
                };
                if cancelled {
                    yield Err(DocvoxError::Cancelled);
                    return;
                }
            }
        }
    }
}
