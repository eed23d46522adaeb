//! Assembly of the assistant: configuration and the submission
//! orchestrator binding sources, store, narrator and persistence.

pub mod config;
pub mod orchestrator;

pub use config::AssistantConfig;
pub use orchestrator::{SubmissionOrchestrator, SubmissionOrchestratorBuilder};
