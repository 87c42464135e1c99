//! Shared ticket-triage pipeline.
//!
//! Both the HTTP service and the standalone CLI drive the same
//! [`pipeline::Pipeline`], so classification, prioritisation and status
//! derivation cannot drift between surfaces.

pub mod llm;
pub mod pipeline;
pub mod types;

pub use llm::{CompletionModel, GeminiClient, GeminiConfig, LlmError, FALLBACK_TEXT};
pub use pipeline::{Pipeline, Triage};
pub use types::{Category, Priority, Status};
