//! Speech narration of the streamed answer
//!
//! This module provides:
//! - The speech engine collaborator boundary
//! - Sentence-by-sentence narration of answer fragments

pub mod engine;
pub mod narrator;

// Re-export commonly used types
pub use engine::{LogSpeechEngine, NullSpeechEngine, SpeechEngine};
pub use narrator::{SpeechNarrator, SENTENCE_MARKERS};
