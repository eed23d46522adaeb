//! Submission orchestrator: the entry point for "ask" actions.
//!
//! Turns one user submission into a well-ordered sequence of effects
//! under cooperative cancellation: incremental answer text in the
//! session store, sentence narration through the speech engine, and
//! exactly one terminal transition. At most one session is live at a
//! time.

use crate::backend::BackendClient;
use crate::integration::AssistantConfig;
use crate::messages::{
    ConversationStore, InMemoryConversationStore, Message, MessageMetadata, Sender,
};
use crate::session::{
    AnswerBuffer, Chunk, SessionHandle, SessionOutcome, SessionStatus, SessionStore,
    SharedSessionStore,
};
use crate::source::{self, ChunkStream, GeminiProvider, GenerationProvider, SourceKind};
use crate::speech::{LogSpeechEngine, NullSpeechEngine, SpeechEngine, SpeechNarrator};
use crate::{DocvoxError, Result};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Top-level controller binding sources, session store, narrator and
/// persistence. Shareable behind an `Arc`; a concurrent `stop` or a
/// newer submission pre-empts the running one through the store.
pub struct SubmissionOrchestrator {
    config: AssistantConfig,
    store: SharedSessionStore,
    narrator: Mutex<SpeechNarrator>,
    provider: Option<Arc<dyn GenerationProvider>>,
    backend: BackendClient,
    conversations: Arc<dyn ConversationStore>,
}

impl SubmissionOrchestrator {
    /// Build an orchestrator with default collaborators.
    pub fn new(config: AssistantConfig) -> Result<Self> {
        SubmissionOrchestratorBuilder::new().with_config(config).build()
    }

    pub fn builder() -> SubmissionOrchestratorBuilder {
        SubmissionOrchestratorBuilder::new()
    }

    /// The shared session store, for reading the answer and UI flags.
    pub fn store(&self) -> SharedSessionStore {
        Arc::clone(&self.store)
    }

    /// The backend client, for document intake.
    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// The persistence collaborator.
    pub fn conversations(&self) -> Arc<dyn ConversationStore> {
        Arc::clone(&self.conversations)
    }

    /// Submit one question and drive it to a terminal status.
    ///
    /// Empty or whitespace-only questions are rejected before any
    /// state changes. Everything else resolves to the session's
    /// terminal status: cancellation ends the session silently with
    /// the partial answer retained, any other failure appends an
    /// inline error message and ends it as errored.
    pub async fn submit(&self, question: &str, kind: SourceKind) -> Result<SessionStatus> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DocvoxError::EmptyQuestion);
        }

        let handle = self.store.lock().start(question);
        // A pre-empted predecessor may still be narrating; its buffer
        // and utterance belong to a dead session
        self.narrator.lock().interrupt();

        let token = handle.token.clone();
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => Err(DocvoxError::Cancelled),
            result = self.open_source(kind, question, token.clone()) => result,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(error) => return Ok(self.fail(&handle, error)),
        };

        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    if handle.token.is_cancelled() {
                        return Ok(self.cancelled(&handle));
                    }
                    self.store.lock().deliver(&handle, chunk.clone());
                    self.narrate(&chunk);
                }
                Err(error) => return Ok(self.fail(&handle, error)),
            }
        }

        if handle.token.is_cancelled() {
            return Ok(self.cancelled(&handle));
        }

        self.narrator.lock().finish();
        self.store.lock().finish(&handle, SessionOutcome::Completed);
        info!("Session {} completed", handle.id);

        let answer = self.store.lock().answer();
        if let Err(error) = self.persist_exchange(question, &answer).await {
            warn!("Failed to persist completed exchange: {}", error);
        }

        Ok(SessionStatus::Completed)
    }

    /// Stop the current session, if any, and silence narration.
    pub fn stop(&self) {
        self.store.lock().cancel_current();
        self.narrator.lock().interrupt();
    }

    /// Re-observe a stored conversation.
    ///
    /// An assistant reply is auto-triggered only when the most recent
    /// persisted message came from the user; a conversation that
    /// already has a pending or completed assistant reply is returned
    /// as-is, without querying the backend again.
    pub async fn open_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let messages = self.conversations.fetch_messages(conversation_id).await?;
        if !Self::should_auto_trigger(&messages) {
            return Ok(messages);
        }
        self.answer_latest(conversation_id, messages).await
    }

    /// Append a user message to a conversation and answer it.
    pub async fn send_message(&self, conversation_id: Uuid, text: &str) -> Result<Vec<Message>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DocvoxError::EmptyQuestion);
        }

        self.conversations
            .create_message(conversation_id, Sender::User, text, MessageMetadata::default())
            .await?;
        let history = self.conversations.fetch_messages(conversation_id).await?;
        self.answer_latest(conversation_id, history).await
    }

    fn should_auto_trigger(messages: &[Message]) -> bool {
        messages.last().is_some_and(|m| m.sender == Sender::User)
    }

    async fn answer_latest(
        &self,
        conversation_id: Uuid,
        history: Vec<Message>,
    ) -> Result<Vec<Message>> {
        let prompt = history
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let response = self.backend.query_with_history(&history, &prompt).await?;
        let update = response.into_update();
        let metadata = MessageMetadata {
            documents: update.documents.clone(),
            ids: update.ids.clone(),
        };
        self.conversations
            .create_message(
                conversation_id,
                Sender::Assistant,
                update.llm_response.as_deref().unwrap_or_default(),
                metadata,
            )
            .await?;

        self.conversations.fetch_messages(conversation_id).await
    }

    async fn open_source(
        &self,
        kind: SourceKind,
        question: &str,
        token: CancellationToken,
    ) -> Result<ChunkStream> {
        match kind {
            SourceKind::Generative => {
                let Some(provider) = self.provider.as_ref() else {
                    return Err(DocvoxError::Provider(
                        "No generation provider configured".into(),
                    ));
                };
                source::open_generative(
                    Arc::clone(provider),
                    question,
                    self.config.char_delay,
                    token,
                )
                .await
            }
            SourceKind::Retrieval => source::open_retrieval(&self.backend, question, token).await,
        }
    }

    fn narrate(&self, chunk: &Chunk) {
        let mut narrator = self.narrator.lock();
        match chunk {
            Chunk::Text(fragment) => narrator.push_fragment(fragment),
            Chunk::Structured(update) => {
                if let Some(text) = update.llm_response.as_deref() {
                    narrator.push_fragment(text);
                }
            }
        }
    }

    fn cancelled(&self, handle: &SessionHandle) -> SessionStatus {
        // A superseded session must not silence its successor's
        // narration; the successor interrupted it already
        if self.store.lock().is_current(handle) {
            self.narrator.lock().interrupt();
        }
        self.store.lock().finish(handle, SessionOutcome::Cancelled);
        info!("Session {} cancelled", handle.id);
        SessionStatus::Cancelled
    }

    fn fail(&self, handle: &SessionHandle, error: DocvoxError) -> SessionStatus {
        if error.is_cancellation() {
            return self.cancelled(handle);
        }

        warn!("Session {} failed: {}", handle.id, error);
        self.store.lock().deliver(
            handle,
            Chunk::Text(format!("Error: {}", error.user_message())),
        );
        self.store.lock().finish(handle, SessionOutcome::Errored);
        SessionStatus::Errored
    }

    async fn persist_exchange(&self, question: &str, answer: &AnswerBuffer) -> Result<()> {
        if answer.llm_response.is_empty() {
            return Ok(());
        }

        let conversation = self
            .conversations
            .create_conversation(&self.config.user_id, question)
            .await?;
        self.conversations
            .create_message(
                conversation.id,
                Sender::User,
                question,
                MessageMetadata::default(),
            )
            .await?;
        self.conversations
            .create_message(
                conversation.id,
                Sender::Assistant,
                &answer.llm_response,
                MessageMetadata {
                    documents: Some(answer.documents.clone()),
                    ids: Some(answer.ids.clone()),
                },
            )
            .await?;
        Ok(())
    }
}

/// Builder for orchestrators with injected collaborators.
pub struct SubmissionOrchestratorBuilder {
    config: AssistantConfig,
    store: Option<SharedSessionStore>,
    provider: Option<Arc<dyn GenerationProvider>>,
    engine: Option<Arc<dyn SpeechEngine>>,
    conversations: Option<Arc<dyn ConversationStore>>,
}

impl SubmissionOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: AssistantConfig::default(),
            store: None,
            provider: None,
            engine: None,
            conversations: None,
        }
    }

    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: SharedSessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_speech_engine(mut self, engine: Arc<dyn SpeechEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = Some(store);
        self
    }

    pub fn build(self) -> Result<SubmissionOrchestrator> {
        let config = self.config;
        config.validate().map_err(DocvoxError::Config)?;

        let provider = match self.provider {
            Some(provider) => Some(provider),
            None if !config.gemini_api_key.is_empty() => Some(Arc::new(GeminiProvider::new(
                config.gemini_api_key.clone(),
            )?)
                as Arc<dyn GenerationProvider>),
            None => None,
        };
        let engine = self.engine.unwrap_or_else(|| {
            if config.enable_speech {
                Arc::new(LogSpeechEngine) as Arc<dyn SpeechEngine>
            } else {
                Arc::new(NullSpeechEngine) as Arc<dyn SpeechEngine>
            }
        });
        let store = self.store.unwrap_or_else(SessionStore::shared);
        let conversations = self
            .conversations
            .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new()) as Arc<dyn ConversationStore>);

        let narrator = Mutex::new(SpeechNarrator::new(engine, Arc::clone(&store)));
        let backend = BackendClient::new(&config.backend_url);

        Ok(SubmissionOrchestrator {
            config,
            store,
            narrator,
            provider,
            backend,
            conversations,
        })
    }
}

impl Default for SubmissionOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_question_has_no_side_effects() {
        let orchestrator = SubmissionOrchestrator::new(AssistantConfig::default()).unwrap();

        let result = orchestrator.submit("   ", SourceKind::Retrieval).await;

        assert!(matches!(result, Err(DocvoxError::EmptyQuestion)));
        let store = orchestrator.store();
        let store = store.lock();
        assert_eq!(store.status(), None);
        assert!(!store.loading());
        assert!(!store.is_streaming());
    }

    #[tokio::test]
    async fn test_generative_without_provider_errors_inline() {
        let orchestrator = SubmissionOrchestrator::new(AssistantConfig::default()).unwrap();

        let status = orchestrator
            .submit("What is X?", SourceKind::Generative)
            .await
            .unwrap();

        assert_eq!(status, SessionStatus::Errored);
        let answer = orchestrator.store().lock().answer();
        assert_eq!(answer.llm_response, "Error: Failed to get response from AI");
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = SubmissionOrchestrator::builder()
            .with_config(AssistantConfig::default().with_backend_url(""))
            .build();
        assert!(matches!(result, Err(DocvoxError::Config(_))));
    }
}
