//! Answer session model: statuses, chunks and the answer buffer.

pub mod store;

pub use store::{SessionStore, SharedSessionStore};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Lifecycle of one question-to-answer attempt.
///
/// Sessions are constructed already streaming; once a terminal status
/// is reached it never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// The answer is being assembled.
    Streaming,
    /// The source was exhausted without abort or error.
    Completed,
    /// The session's token was aborted mid-flight.
    Cancelled,
    /// The source failed with something other than a cancellation.
    Errored,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Streaming)
    }
}

/// Terminal outcome reported when a session's pump finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Cancelled,
    Errored,
}

impl From<SessionOutcome> for SessionStatus {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Completed => SessionStatus::Completed,
            SessionOutcome::Cancelled => SessionStatus::Cancelled,
            SessionOutcome::Errored => SessionStatus::Errored,
        }
    }
}

/// Supporting references attached to a retrieval answer.
///
/// The backend has returned both a bare string and a list for the
/// `documents`/`ids` fields, so both shapes deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRefs {
    One(String),
    Many(Vec<String>),
}

impl SourceRefs {
    pub fn is_empty(&self) -> bool {
        match self {
            SourceRefs::One(s) => s.is_empty(),
            SourceRefs::Many(v) => v.is_empty(),
        }
    }

    /// Normalize to a list regardless of the wire shape.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SourceRefs::One(s) if s.is_empty() => Vec::new(),
            SourceRefs::One(s) => vec![s.clone()],
            SourceRefs::Many(v) => v.clone(),
        }
    }
}

impl Default for SourceRefs {
    fn default() -> Self {
        SourceRefs::Many(Vec::new())
    }
}

/// A structured update merged field-wise into the answer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuredUpdate {
    pub llm_response: Option<String>,
    pub documents: Option<SourceRefs>,
    pub ids: Option<SourceRefs>,
}

/// One unit of incremental output from a response source.
#[derive(Clone, Debug, PartialEq)]
pub enum Chunk {
    /// A raw text fragment appended to the answer.
    Text(String),
    /// A structured update replacing the fields it carries.
    Structured(StructuredUpdate),
}

/// The answer being assembled for the current session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnswerBuffer {
    pub llm_response: String,
    pub documents: SourceRefs,
    pub ids: SourceRefs,
}

impl AnswerBuffer {
    /// Merge one chunk into the buffer.
    pub fn apply(&mut self, chunk: Chunk) {
        match chunk {
            Chunk::Text(fragment) => self.llm_response.push_str(&fragment),
            Chunk::Structured(update) => {
                if let Some(text) = update.llm_response {
                    self.llm_response = text;
                }
                if let Some(documents) = update.documents {
                    self.documents = documents;
                }
                if let Some(ids) = update.ids {
                    self.ids = ids;
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.llm_response.is_empty() && self.documents.is_empty() && self.ids.is_empty()
    }
}

/// One in-flight answer session.
///
/// Owned exclusively by the session store; superseded sessions are
/// discarded, never reused.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub question: String,
    pub status: SessionStatus,
    token: CancellationToken,
}

impl Session {
    pub(crate) fn new(question: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            status: SessionStatus::Streaming,
            token: CancellationToken::new(),
        }
    }

    /// Clone of this session's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    fn cancel(&self) {
        self.token.cancel();
    }
}

/// Cheap handle identifying a session to `deliver`/`finish` callers.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub id: Uuid,
    pub token: CancellationToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunks_append() {
        let mut buffer = AnswerBuffer::default();
        buffer.apply(Chunk::Text("Hel".to_string()));
        buffer.apply(Chunk::Text("lo".to_string()));

        assert_eq!(buffer.llm_response, "Hello");
        assert!(buffer.documents.is_empty());
    }

    #[test]
    fn test_structured_chunk_merges_field_wise() {
        let mut buffer = AnswerBuffer::default();
        buffer.apply(Chunk::Text("ignored".to_string()));
        buffer.apply(Chunk::Structured(StructuredUpdate {
            llm_response: Some("X is Y.".to_string()),
            documents: Some(SourceRefs::Many(vec!["doc1".to_string()])),
            ids: None,
        }));

        assert_eq!(buffer.llm_response, "X is Y.");
        assert_eq!(buffer.documents.to_vec(), vec!["doc1"]);
        // An absent field leaves the previous value untouched
        assert!(buffer.ids.is_empty());
    }

    #[test]
    fn test_source_refs_deserializes_both_shapes() {
        let list: SourceRefs = serde_json::from_str(r#"["doc1","doc2"]"#).unwrap();
        assert_eq!(list.to_vec(), vec!["doc1", "doc2"]);

        let single: SourceRefs = serde_json::from_str(r#""doc1""#).unwrap();
        assert_eq!(single.to_vec(), vec!["doc1"]);

        let empty: SourceRefs = serde_json::from_str(r#""""#).unwrap();
        assert!(empty.is_empty());
        assert!(empty.to_vec().is_empty());
    }

    #[test]
    fn test_session_starts_streaming() {
        let session = Session::new("What is X?");
        assert_eq!(session.status, SessionStatus::Streaming);
        assert!(!session.status.is_terminal());
        assert!(!session.token().is_cancelled());
    }

    #[test]
    fn test_outcome_maps_to_status() {
        assert_eq!(
            SessionStatus::from(SessionOutcome::Completed),
            SessionStatus::Completed
        );
        assert_eq!(
            SessionStatus::from(SessionOutcome::Cancelled),
            SessionStatus::Cancelled
        );
        assert_eq!(
            SessionStatus::from(SessionOutcome::Errored),
            SessionStatus::Errored
        );
    }
}
