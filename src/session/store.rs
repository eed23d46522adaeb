//! Process-wide holder of the single active answer session.
//!
//! All mutation of the answer buffer and the UI flags passes through
//! the store's operations, which is what keeps the at-most-one-active
//! invariant enforceable.

use super::{AnswerBuffer, Chunk, Session, SessionHandle, SessionOutcome, SessionStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Shared reference to the session store.
pub type SharedSessionStore = Arc<Mutex<SessionStore>>;

/// Sole owner of current-session identity, the answer buffer and the
/// `loading` / `is_streaming` / `is_speaking` flags.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
    answer: AnswerBuffer,
    loading: bool,
    is_streaming: bool,
    is_speaking: bool,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSessionStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Begin a new session, cancelling any session still streaming.
    ///
    /// Resets the answer buffer and raises the loading/streaming flags.
    pub fn start(&mut self, question: impl Into<String>) -> SessionHandle {
        self.cancel_current();

        let session = Session::new(question);
        let handle = SessionHandle {
            id: session.id,
            token: session.token(),
        };
        debug!("Session {} started: {}", session.id, session.question);

        self.answer = AnswerBuffer::default();
        self.loading = true;
        self.is_streaming = true;
        self.current = Some(session);
        handle
    }

    /// Merge a chunk into the answer on behalf of `handle`.
    ///
    /// Chunks from a superseded or terminal session are dropped
    /// silently; an in-flight emitter of a pre-empted session cannot
    /// mutate the buffer.
    pub fn deliver(&mut self, handle: &SessionHandle, chunk: Chunk) {
        if !self.is_current_and_streaming(handle) {
            debug!("Dropped stale chunk for session {}", handle.id);
            return;
        }
        self.answer.apply(chunk);
    }

    /// Record the terminal transition for `handle`.
    ///
    /// No-ops under the same staleness guard as `deliver`.
    pub fn finish(&mut self, handle: &SessionHandle, outcome: SessionOutcome) {
        match self.current.as_mut() {
            Some(session)
                if session.id == handle.id && session.status == SessionStatus::Streaming =>
            {
                session.status = outcome.into();
                self.loading = false;
                self.is_streaming = false;
                debug!("Session {} finished: {:?}", handle.id, outcome);
            }
            _ => debug!("Ignored finish for stale session {}", handle.id),
        }
    }

    /// Abort the streaming session, if any.
    ///
    /// The superseded pump's own `finish` will no-op under the
    /// staleness guard, so the flags are cleared here.
    pub fn cancel_current(&mut self) {
        if let Some(session) = self.current.as_mut() {
            if session.status == SessionStatus::Streaming {
                session.cancel();
                session.status = SessionStatus::Cancelled;
                self.loading = false;
                self.is_streaming = false;
                debug!("Session {} cancelled", session.id);
            }
        }
    }

    pub fn set_speaking(&mut self, speaking: bool) {
        self.is_speaking = speaking;
    }

    /// Whether `handle` still identifies the current session.
    pub fn is_current(&self, handle: &SessionHandle) -> bool {
        self.current.as_ref().is_some_and(|s| s.id == handle.id)
    }

    /// Snapshot of the answer being assembled.
    pub fn answer(&self) -> AnswerBuffer {
        self.answer.clone()
    }

    /// Status of the current session, if any.
    pub fn status(&self) -> Option<SessionStatus> {
        self.current.as_ref().map(|s| s.status)
    }

    /// Question bound to the current session, if any.
    pub fn question(&self) -> Option<String> {
        self.current.as_ref().map(|s| s.question.clone())
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    fn is_current_and_streaming(&self, handle: &SessionHandle) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.id == handle.id && s.status == SessionStatus::Streaming)
    }
}
