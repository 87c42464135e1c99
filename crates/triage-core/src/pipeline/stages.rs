//! Keyword tables and the three model-backed stages.
//!
//! Each table is checked in order against the lower-cased reply; the first
//! keyword found as a substring wins, otherwise the type's default applies.

use crate::llm::{complete_or_fallback, CompletionModel};
use crate::pipeline::prompts;
use crate::types::{Category, Priority};

/// `billing` is checked before `technical`; anything else is `General`.
pub const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("billing", Category::Billing),
    ("technical", Category::Technical),
];

/// `high` is checked before `medium`; anything else is `Low`.
pub const PRIORITY_KEYWORDS: &[(&str, Priority)] = &[
    ("high", Priority::High),
    ("medium", Priority::Medium),
];

/// Result of one stage, flagged when the model call fell back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged<T> {
    pub value: T,
    pub degraded: bool,
}

fn first_keyword<T: Copy + Default>(reply: &str, table: &[(&str, T)]) -> T {
    let reply = reply.to_lowercase();
    table
        .iter()
        .find(|(keyword, _)| reply.contains(keyword))
        .map(|&(_, value)| value)
        .unwrap_or_default()
}

pub fn parse_category(reply: &str) -> Category {
    first_keyword(reply, CATEGORY_KEYWORDS)
}

pub fn parse_priority(reply: &str) -> Priority {
    first_keyword(reply, PRIORITY_KEYWORDS)
}

pub async fn classify(model: &dyn CompletionModel, description: &str) -> Staged<Category> {
    let reply = complete_or_fallback(model, "classify", &prompts::classification_prompt(description)).await;
    Staged {
        value: parse_category(&reply.text),
        degraded: reply.degraded,
    }
}

pub async fn prioritize(model: &dyn CompletionModel, description: &str) -> Staged<Priority> {
    let reply = complete_or_fallback(model, "prioritize", &prompts::priority_prompt(description)).await;
    Staged {
        value: parse_priority(&reply.text),
        degraded: reply.degraded,
    }
}

/// Free-text guidance; the reply is returned as-is after sanitising.
pub async fn resolve(model: &dyn CompletionModel, description: &str, category: Category) -> Staged<String> {
    let reply = complete_or_fallback(
        model,
        "resolve",
        &prompts::resolution_prompt(description, category),
    )
    .await;
    Staged {
        value: reply.text,
        degraded: reply.degraded,
    }
}
