use crate::session::SourceRefs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// References backing an assistant message, recorded alongside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<SourceRefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<SourceRefs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub metadata: MessageMetadata,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        conversation_id: Uuid,
        sender: Sender,
        content: impl Into<String>,
        metadata: MessageMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender,
            content: content.into(),
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Sender::Assistant).unwrap(),
            r#""assistant""#
        );
    }

    #[test]
    fn test_metadata_roundtrips_either_refs_shape() {
        let json = r#"{ "documents": ["doc1"], "ids": "id1" }"#;
        let metadata: MessageMetadata = serde_json::from_str(json).unwrap();

        assert_eq!(metadata.documents.unwrap().to_vec(), vec!["doc1"]);
        assert_eq!(metadata.ids.unwrap().to_vec(), vec!["id1"]);
    }

    #[test]
    fn test_empty_metadata_serializes_to_empty_object() {
        let json = serde_json::to_string(&MessageMetadata::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
