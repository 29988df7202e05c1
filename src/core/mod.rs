//! Language model collaborators
//!
//! Information Hiding:
//! - Wire formats and SDK response shapes stay inside `llm` and `response`
//! - Agents only see the narrow `TextGenerator` interface

pub mod llm;
pub mod response;

use crate::error::ConciergeResult;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait every text-generation backend implements.
/// Agents depend on this instead of a concrete client so tests can script replies.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single request/response completion for a user prompt
    async fn generate(&self, prompt: &str) -> ConciergeResult<String>;

    /// Completion with a system instruction in front of the prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> ConciergeResult<String> {
        self.generate(&format!("{}\n\n{}", system, prompt)).await
    }

    /// Completion where the backend is asked to reply with a JSON object
    async fn generate_json(&self, system: &str, prompt: &str) -> ConciergeResult<String> {
        self.generate_with_system(system, prompt).await
    }

    /// Streaming completion; the receiver yields text chunks until the reply ends
    async fn generate_stream(&self, prompt: &str) -> ConciergeResult<mpsc::Receiver<String>>;
}
