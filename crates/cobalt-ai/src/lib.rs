//! Language-model assistance: query intent extraction and audio transcription.

pub mod client;
pub mod error;
pub mod intent;
pub mod transcribe;

pub use client::OpenAiClient;
pub use error::AiError;
pub use intent::{MapsFilters, QueryIntentResolver};
pub use transcribe::Transcriber;
