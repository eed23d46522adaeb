//! Sentence-by-sentence narration of the streamed answer.
//!
//! Fragments accumulate in a buffer; a completed sentence is flushed
//! to the speech engine as one utterance. At most one utterance plays
//! at any moment: a new flush always pre-empts an unfinished one.

use super::SpeechEngine;
use crate::session::SharedSessionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Characters that close a sentence and trigger a flush.
pub const SENTENCE_MARKERS: &[char] = &['.', '!', '?', '\n'];

/// Buffers emitted text and speaks one sentence at a time.
pub struct SpeechNarrator {
    engine: Arc<dyn SpeechEngine>,
    store: SharedSessionStore,
    buffer: String,
    current_utterance: Option<JoinHandle<()>>,
}

impl SpeechNarrator {
    pub fn new(engine: Arc<dyn SpeechEngine>, store: SharedSessionStore) -> Self {
        Self {
            engine,
            store,
            buffer: String::new(),
            current_utterance: None,
        }
    }

    /// Append a fragment; flush when it closes a sentence.
    pub fn push_fragment(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        if fragment.ends_with(SENTENCE_MARKERS) {
            self.flush();
        }
    }

    /// Speak the buffered text, pre-empting any current utterance.
    ///
    /// A buffer with no speakable content is dropped, not spoken.
    pub fn flush(&mut self) {
        if self.buffer.trim().is_empty() {
            self.buffer.clear();
            return;
        }

        let text = std::mem::take(&mut self.buffer);
        self.preempt();
        debug!("Flushing utterance: {}", text);

        let done = self.engine.speak(&text);
        self.store.lock().set_speaking(true);

        // The waiter clears the speaking flag on completion or error;
        // a pre-empting flush aborts it so a stale waiter cannot clear
        // the flag of the utterance that replaced it.
        let store = Arc::clone(&self.store);
        self.current_utterance = Some(tokio::spawn(async move {
            if let Err(error) = done.await {
                debug!("Utterance failed: {}", error);
            }
            store.lock().set_speaking(false);
        }));
    }

    /// Stop narration for a cancelled session.
    ///
    /// The pending buffer is discarded without flushing and any playing
    /// utterance stops immediately.
    pub fn interrupt(&mut self) {
        self.buffer.clear();
        self.preempt();
        self.store.lock().set_speaking(false);
    }

    /// Flush whatever is left once the stream is exhausted.
    pub fn finish(&mut self) {
        self.flush();
    }

    fn preempt(&mut self) {
        if let Some(waiter) = self.current_utterance.take() {
            waiter.abort();
        }
        self.engine.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::Result;
    use futures::future::BoxFuture;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingEngine {
        utterances: Mutex<Vec<String>>,
        cancels: AtomicUsize,
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&self, text: &str) -> BoxFuture<'static, Result<()>> {
            self.utterances.lock().push(text.to_string());
            Box::pin(async { Ok(()) })
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn narrator_with_engine() -> (SpeechNarrator, Arc<RecordingEngine>, SharedSessionStore) {
        let engine = Arc::new(RecordingEngine::default());
        let store = SessionStore::shared();
        let narrator = SpeechNarrator::new(
            Arc::clone(&engine) as Arc<dyn SpeechEngine>,
            Arc::clone(&store),
        );
        (narrator, engine, store)
    }

    #[tokio::test]
    async fn test_sentence_triggered_flush() {
        let (mut narrator, engine, _store) = narrator_with_engine();

        for fragment in ["H", "i", ".", "\n"] {
            narrator.push_fragment(fragment);
        }
        narrator.finish();

        // One flush at the period; the residual "\n" has no speakable
        // content, so no second flush occurs
        assert_eq!(*engine.utterances.lock(), vec!["Hi.".to_string()]);
    }

    #[tokio::test]
    async fn test_flush_includes_every_marker_kind() {
        let (mut narrator, engine, _store) = narrator_with_engine();

        narrator.push_fragment("One!");
        narrator.push_fragment("Two?");
        narrator.push_fragment("Three\n");

        assert_eq!(
            *engine.utterances.lock(),
            vec!["One!", "Two?", "Three\n"]
        );
    }

    #[tokio::test]
    async fn test_new_utterance_preempts_the_previous_one() {
        let (mut narrator, engine, _store) = narrator_with_engine();

        narrator.push_fragment("One.");
        narrator.push_fragment("Two.");

        assert_eq!(*engine.utterances.lock(), vec!["One.", "Two."]);
        // Each flush cancels whatever was playing first
        assert_eq!(engine.cancels.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_interrupt_suppresses_the_pending_flush() {
        let (mut narrator, engine, store) = narrator_with_engine();

        narrator.push_fragment("Unfinished sentence");
        narrator.interrupt();
        narrator.finish();

        assert!(engine.utterances.lock().is_empty());
        assert!(!store.lock().is_speaking());
    }

    #[tokio::test]
    async fn test_residual_buffer_flushes_once_on_finish() {
        let (mut narrator, engine, _store) = narrator_with_engine();

        narrator.push_fragment("no trailing marker");
        narrator.finish();
        narrator.finish();

        assert_eq!(*engine.utterances.lock(), vec!["no trailing marker"]);
    }

    #[tokio::test]
    async fn test_speaking_flag_clears_after_utterance_ends() {
        let (mut narrator, _engine, store) = narrator_with_engine();

        narrator.push_fragment("Done.");
        assert!(store.lock().is_speaking());

        // The recording engine resolves immediately; the waiter clears
        // the flag as soon as it runs
        narrator.current_utterance.take().unwrap().await.unwrap();
        assert!(!store.lock().is_speaking());
    }
}
