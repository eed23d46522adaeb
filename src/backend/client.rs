//! HTTP client for the document backend.

use super::{ChunksResponse, DocumentChunk, QueryResponse};
use crate::messages::Message;
use crate::{DocvoxError, Result};
use reqwest::multipart;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Client for the vector-collection and PDF-chunking endpoints.
///
/// Non-2xx responses are terminal transport errors; there are no
/// automatic retries.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ask the vector collection for an answer to `prompt`.
    pub async fn query(&self, prompt: &str) -> Result<QueryResponse> {
        #[derive(Serialize)]
        struct QueryRequest<'a> {
            prompt: &'a str,
        }

        let url = format!("{}/api/vector-collection/query", self.base_url);
        debug!("Querying vector collection: {}", prompt);

        let response = self
            .http
            .post(&url)
            .json(&QueryRequest { prompt })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DocvoxError::Transport(format!(
                "query returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Conversation-history variant of `query`.
    pub async fn query_with_history(
        &self,
        history: &[Message],
        prompt: &str,
    ) -> Result<QueryResponse> {
        #[derive(Serialize)]
        struct HistoryQueryRequest<'a> {
            history: &'a [Message],
            prompt: &'a str,
        }

        let url = format!("{}/api/vector-collection/query", self.base_url);
        debug!(
            "Querying vector collection with {} history messages",
            history.len()
        );

        let response = self
            .http
            .post(&url)
            .json(&HistoryQueryRequest { history, prompt })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DocvoxError::Transport(format!(
                "query returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Convert uploaded PDF bytes into raw text chunks.
    pub async fn convert_pdfs(&self, files: Vec<(String, Vec<u8>)>) -> Result<ChunksResponse> {
        let url = format!("{}/api/convert-pdfs-chunks", self.base_url);

        let mut form = multipart::Form::new();
        for (name, bytes) in files {
            let part = multipart::Part::bytes(bytes)
                .file_name(name)
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }

        let response = self.http.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(DocvoxError::Transport(format!(
                "convert-pdfs-chunks returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Add converted chunks to the vector collection under `file_name`.
    pub async fn add_chunks(&self, chunks: &[DocumentChunk], file_name: &str) -> Result<Value> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct AddChunksRequest<'a> {
            chunks: &'a [DocumentChunk],
            file_name: &'a str,
        }

        let url = format!("{}/api/vector-collection/add", self.base_url);
        debug!("Adding {} chunks for {}", chunks.len(), file_name);

        let response = self
            .http
            .post(&url)
            .json(&AddChunksRequest { chunks, file_name })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DocvoxError::Transport(format!(
                "vector-collection/add returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_strips_trailing_slash() {
        let client = BackendClient::new("http://localhost:8001/");
        assert_eq!(client.base_url, "http://localhost:8001");
    }

    #[tokio::test]
    async fn test_query_sends_the_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/vector-collection/query"))
            .and(body_json(serde_json::json!({ "prompt": "What is X?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "llmResponse": "X is Y.",
                "results": { "documents": [["doc1"]], "ids": [["id1"]] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let response = client.query("What is X?").await.unwrap();
        assert_eq!(response.llm_response, "X is Y.");
    }

    #[tokio::test]
    async fn test_non_2xx_query_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/vector-collection/query"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let result = client.query("What is X?").await;
        assert!(matches!(result, Err(DocvoxError::Transport(_))));
    }

    #[tokio::test]
    async fn test_query_with_history_includes_both_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/vector-collection/query"))
            .and(body_partial_json(
                serde_json::json!({ "prompt": "And Z?" }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "llmResponse": "Z too.",
                "results": { "documents": [], "ids": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let response = client.query_with_history(&[], "And Z?").await.unwrap();
        assert_eq!(response.llm_response, "Z too.");
    }

    #[tokio::test]
    async fn test_add_chunks_uses_camel_case_file_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/vector-collection/add"))
            .and(body_partial_json(
                serde_json::json!({ "fileName": "report.pdf" }),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let chunks = vec![DocumentChunk {
            page_content: "text".to_string(),
            metadata: serde_json::json!({ "page": 1 }),
        }];
        client.add_chunks(&chunks, "report.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_convert_pdfs_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/convert-pdfs-chunks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "raw_chunks": [{ "page_content": "text", "metadata": {} }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let response = client
            .convert_pdfs(vec![("report.pdf".to_string(), vec![0x25, 0x50, 0x44, 0x46])])
            .await
            .unwrap();
        assert_eq!(response.raw_chunks.len(), 1);
    }
}
