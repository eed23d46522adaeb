//! Uploaded-document intake: PDF bytes to vector-collection chunks.

use crate::backend::BackendClient;
use crate::{DocvoxError, Result};
use tracing::info;

/// One uploaded file: display name plus raw bytes.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Convert the uploaded PDFs to chunks and add them to the vector
/// collection under the first file's name.
///
/// Errors are reported to the caller; an answer already delivered to a
/// session is never rolled back by a failed intake.
pub async fn process_uploads(client: &BackendClient, files: Vec<UploadedFile>) -> Result<usize> {
    let Some(first) = files.first() else {
        return Err(DocvoxError::Config("No files to process".into()));
    };
    let file_name = first.name.clone();

    let response = client
        .convert_pdfs(files.into_iter().map(|f| (f.name, f.bytes)).collect())
        .await?;
    if response.raw_chunks.is_empty() {
        return Err(DocvoxError::Transport(
            "No chunks received from PDF processing".into(),
        ));
    }

    let count = response.raw_chunks.len();
    client.add_chunks(&response.raw_chunks, &file_name).await?;
    info!("Added {} chunks from {} to the vector collection", count, file_name);

    Ok(count)
}
