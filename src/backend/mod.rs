//! Document backend boundary: wire types and the HTTP client.

pub mod client;

pub use client::BackendClient;

use crate::session::{SourceRefs, StructuredUpdate};
use serde::{Deserialize, Serialize};

/// Answer returned by the vector-collection query endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub llm_response: String,
    #[serde(default)]
    pub results: QueryResults,
}

/// Result rows accompanying a query answer: one inner list per query.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct QueryResults {
    #[serde(default)]
    pub documents: Vec<Vec<String>>,
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
}

impl QueryResponse {
    /// Collapse the nested result rows into one structured answer
    /// update. A missing first row normalizes to an empty list.
    pub fn into_update(self) -> StructuredUpdate {
        let documents = self
            .results
            .documents
            .into_iter()
            .next()
            .map(SourceRefs::Many);
        let ids = self.results.ids.into_iter().next().map(SourceRefs::Many);

        StructuredUpdate {
            llm_response: Some(self.llm_response),
            documents: Some(documents.unwrap_or_default()),
            ids: Some(ids.unwrap_or_default()),
        }
    }
}

/// One converted document chunk, as produced by the PDF endpoint and
/// consumed by the vector-add endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DocumentChunk {
    pub page_content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Response of the PDF chunking endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ChunksResponse {
    #[serde(default)]
    pub raw_chunks: Vec<DocumentChunk>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_deserializes() {
        let json = r#"{
            "llmResponse": "X is Y.",
            "results": { "documents": [["doc1"]], "ids": [["id1"]] }
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.llm_response, "X is Y.");
        assert_eq!(response.results.documents, vec![vec!["doc1"]]);
        assert_eq!(response.results.ids, vec![vec!["id1"]]);
    }

    #[test]
    fn test_into_update_takes_the_first_row() {
        let response = QueryResponse {
            llm_response: "X is Y.".to_string(),
            results: QueryResults {
                documents: vec![vec!["doc1".to_string(), "doc2".to_string()]],
                ids: vec![vec!["id1".to_string(), "id2".to_string()]],
            },
        };

        let update = response.into_update();
        assert_eq!(update.llm_response.as_deref(), Some("X is Y."));
        assert_eq!(update.documents.unwrap().to_vec(), vec!["doc1", "doc2"]);
        assert_eq!(update.ids.unwrap().to_vec(), vec!["id1", "id2"]);
    }

    #[test]
    fn test_into_update_normalizes_missing_rows() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"llmResponse": "X is Y."}"#).unwrap();

        let update = response.into_update();
        assert!(update.documents.unwrap().is_empty());
        assert!(update.ids.unwrap().is_empty());
    }

    #[test]
    fn test_chunks_response_deserializes() {
        let json = r#"{
            "raw_chunks": [
                { "page_content": "text", "metadata": { "page": 1 } }
            ]
        }"#;
        let response: ChunksResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.raw_chunks.len(), 1);
        assert_eq!(response.raw_chunks[0].page_content, "text");
    }
}
