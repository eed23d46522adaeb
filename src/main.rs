use anyhow::Result;
use docvox::intake::{self, UploadedFile};
use docvox::integration::{AssistantConfig, SubmissionOrchestrator};
use docvox::source::SourceKind;
use std::path::Path;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docvox=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docvox assistant");

    let config = AssistantConfig::from_env();
    let orchestrator = Arc::new(SubmissionOrchestrator::new(config)?);

    println!("Ask a question related to your documents.");
    println!("Commands: :gen (generative source), :rag (retrieval source),");
    println!("          :process <file.pdf> (add a document), :quit");

    let stdin = io::stdin();
    let mut kind = SourceKind::Retrieval;
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => {}
            ":quit" | ":q" => break,
            ":gen" => {
                kind = SourceKind::Generative;
                println!("source: generative");
            }
            ":rag" => {
                kind = SourceKind::Retrieval;
                println!("source: retrieval");
            }
            command if command.starts_with(":process ") => {
                let file_path = command.trim_start_matches(":process ").trim();
                match process_file(&orchestrator, file_path).await {
                    Ok(count) => println!("added {} chunks from {}", count, file_path),
                    Err(error) => println!("failed to process {}: {}", file_path, error),
                }
            }
            question => match orchestrator.submit(question, kind).await {
                Ok(status) => {
                    let answer = orchestrator.store().lock().answer();
                    println!("[{:?}] {}", status, answer.llm_response);
                    if !answer.documents.is_empty() {
                        println!("documents: {:?}", answer.documents.to_vec());
                    }
                }
                Err(error) => println!("{}", error.user_message()),
            },
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

async fn process_file(orchestrator: &SubmissionOrchestrator, file_path: &str) -> Result<usize> {
    let bytes = tokio::fs::read(file_path).await?;
    let name = Path::new(file_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string());

    let count =
        intake::process_uploads(orchestrator.backend(), vec![UploadedFile::new(name, bytes)])
            .await?;
    Ok(count)
}
