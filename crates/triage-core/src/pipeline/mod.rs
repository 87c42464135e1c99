//! classify → prioritize → resolve → status.
//!
//! The stages run strictly in that order for one ticket. Resolution receives
//! the category already produced by classification, and status is derived
//! once from the final resolution text.

pub mod prompts;
pub mod stages;
pub mod status;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::llm::CompletionModel;
use crate::types::{Category, Priority, Status};

pub use stages::{parse_category, parse_priority, Staged, CATEGORY_KEYWORDS, PRIORITY_KEYWORDS};
pub use status::{derive_status, RESOLVED_MARKER};

/// Everything the pipeline derives from one description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triage {
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub resolution: String,
    /// At least one stage used the fallback text instead of a model reply.
    pub degraded: bool,
}

/// The triage pipeline bound to one completion model.
#[derive(Clone)]
pub struct Pipeline {
    model: Arc<dyn CompletionModel>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn classify(&self, description: &str) -> Staged<Category> {
        stages::classify(self.model.as_ref(), description).await
    }

    pub async fn prioritize(&self, description: &str) -> Staged<Priority> {
        stages::prioritize(self.model.as_ref(), description).await
    }

    pub async fn resolve(&self, description: &str, category: Category) -> Staged<String> {
        stages::resolve(self.model.as_ref(), description, category).await
    }

    /// Run all three stages and derive the status.
    pub async fn triage(&self, description: &str) -> Triage {
        let category = self.classify(description).await;
        debug!(category = %category.value, degraded = category.degraded, "classified");

        let priority = self.prioritize(description).await;
        debug!(priority = %priority.value, degraded = priority.degraded, "prioritized");

        let resolution = self.resolve(description, category.value).await;
        let status = derive_status(&resolution.value);

        let degraded = category.degraded || priority.degraded || resolution.degraded;
        info!(
            category = %category.value,
            priority = %priority.value,
            status = %status,
            degraded,
            "ticket triaged"
        );

        Triage {
            category: category.value,
            priority: priority.value,
            status,
            resolution: resolution.value,
            degraded,
        }
    }
}
