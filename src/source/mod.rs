//! Response sources: where answer chunks come from.
//!
//! Two variants feed a session. `Generative` asks the generation
//! provider for one complete text and replays it through the paced
//! emitter; `Retrieval` asks the vector-collection backend and
//! delivers a single structured terminal chunk. Both refuse to
//! dispatch the underlying request when the session token is already
//! cancelled.

pub mod gemini;
pub mod pacer;

pub use gemini::GeminiProvider;
pub use pacer::{PacedEmitter, DEFAULT_CHAR_DELAY};

use crate::backend::BackendClient;
use crate::session::Chunk;
use crate::{DocvoxError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Which source variant a submission pulls from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// One provider call, answer replayed character by character.
    Generative,
    /// One backend query, answer delivered as one structured chunk.
    Retrieval,
}

/// A provider that turns one prompt into one complete text.
///
/// There is no native incremental delivery; pacing happens on top.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// The stream of chunks a session pumps from.
pub type ChunkStream = BoxStream<'static, Result<Chunk>>;

/// Open the generative source for `question`.
///
/// The provider is called once for the full text; a failure surfaces
/// here, before any chunk is emitted.
pub async fn open_generative(
    provider: Arc<dyn GenerationProvider>,
    question: &str,
    delay: Duration,
    token: CancellationToken,
) -> Result<ChunkStream> {
    if question.trim().is_empty() {
        return Err(DocvoxError::EmptyQuestion);
    }
    if token.is_cancelled() {
        return Err(DocvoxError::Cancelled);
    }

    let text = provider.generate(question).await?;
    debug!("Provider returned {} characters", text.chars().count());

    let stream = PacedEmitter::new(text, token)
        .with_delay(delay)
        .into_stream()
        .map(|item| item.map(Chunk::Text));
    Ok(stream.boxed())
}

/// Open the retrieval source for `question`.
///
/// No pacing: the backend's answer arrives as one terminal chunk.
pub async fn open_retrieval(
    client: &BackendClient,
    question: &str,
    token: CancellationToken,
) -> Result<ChunkStream> {
    if question.trim().is_empty() {
        return Err(DocvoxError::EmptyQuestion);
    }
    if token.is_cancelled() {
        return Err(DocvoxError::Cancelled);
    }

    let response = client.query(question).await?;
    let update = response.into_update();
    let stream = futures::stream::once(async move { Ok(Chunk::Structured(update)) });
    Ok(stream.boxed())
}
