//! Speech engine collaborator boundary.

use crate::Result;
use futures::future::BoxFuture;
use tracing::info;

/// External text-to-speech engine.
///
/// `speak` starts the utterance immediately and returns a future that
/// resolves when the engine reports completion or error; `cancel`
/// stops whatever is currently playing. The engine is a process-wide
/// resource: only the narrator may address it.
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, text: &str) -> BoxFuture<'static, Result<()>>;

    fn cancel(&self);
}

/// Engine that narrates to the log instead of an audio device.
#[derive(Clone, Debug, Default)]
pub struct LogSpeechEngine;

impl SpeechEngine for LogSpeechEngine {
    fn speak(&self, text: &str) -> BoxFuture<'static, Result<()>> {
        info!("Speaking: {}", text);
        Box::pin(async { Ok(()) })
    }

    fn cancel(&self) {}
}

/// Engine that swallows utterances entirely (speech disabled).
#[derive(Clone, Debug, Default)]
pub struct NullSpeechEngine;

impl SpeechEngine for NullSpeechEngine {
    fn speak(&self, _text: &str) -> BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn cancel(&self) {}
}
