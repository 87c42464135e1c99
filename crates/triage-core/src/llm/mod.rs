//! Text-in / text-out access to the remote generation endpoint.
//!
//! [`CompletionModel`] is the seam every pipeline stage talks to. Failures are
//! returned as [`LlmError`]; the decision to substitute [`FALLBACK_TEXT`] is
//! made once, in [`complete_or_fallback`], which also reports whether the
//! substitution happened so callers can surface a degraded result.

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Text substituted for the model reply whenever a completion fails.
pub const FALLBACK_TEXT: &str = "general";

/// Errors returned by a [`CompletionModel`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured; no request was sent.
    #[error("API key is not configured")]
    MissingCredential,

    /// The endpoint URL could not be built from the configuration.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport failure, including timeouts. The request URL is stripped so
    /// the key never ends up in logs.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response decoded but carried no text.
    #[error("response contained no text")]
    EmptyResponse,
}

/// A remote model that turns one prompt into one reply.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Send `prompt` and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Reply text after sanitising, plus whether it is the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub degraded: bool,
}

/// Run one completion for `stage`, sanitising the reply or substituting
/// [`FALLBACK_TEXT`] on any error.
pub async fn complete_or_fallback(model: &dyn CompletionModel, stage: &str, prompt: &str) -> Completion {
    match model.complete(prompt).await {
        Ok(reply) => Completion {
            text: sanitize_reply(&reply),
            degraded: false,
        },
        Err(e) => {
            warn!(stage, error = %e, "completion failed; substituting fallback text");
            Completion {
                text: FALLBACK_TEXT.to_owned(),
                degraded: true,
            }
        }
    }
}

/// Strip surrounding whitespace, every backtick and every literal `json`.
///
/// This is not a JSON parser: `json` is removed wherever it occurs, including
/// inside words.
pub fn sanitize_reply(reply: &str) -> String {
    reply
        .trim()
        .replace('`', "")
        .replace("json", "")
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    struct Failing;

    #[async_trait]
    impl CompletionModel for Failing {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl CompletionModel for Fixed {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_owned())
        }
    }

    #[test]
    fn sanitize_strips_fences_and_whitespace() {
        assert_eq!(sanitize_reply("  ```json\nbilling\n```  "), "billing");
    }

    #[test]
    fn sanitize_removes_json_inside_words() {
        assert_eq!(sanitize_reply("jsonify the `payload`"), "ify the payload");
    }

    #[tokio::test]
    async fn success_is_sanitized_and_not_degraded() {
        let out = complete_or_fallback(&Fixed(" `technical` "), "classify", "p").await;
        assert_eq!(
            out,
            Completion {
                text: "technical".into(),
                degraded: false
            }
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn failure_yields_fallback_and_logs() {
        let out = complete_or_fallback(&Failing, "prioritize", "p").await;
        assert_eq!(out.text, FALLBACK_TEXT);
        assert!(out.degraded);
        assert!(logs_contain("substituting fallback text"));
        assert!(logs_contain("overloaded"));
    }
}
