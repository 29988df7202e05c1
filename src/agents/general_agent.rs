//! General Agent - answers anything through the language model
//!
//! Information Hiding:
//! - Instructions given to the model kept private
//! - Collaborator failures converted into apology text
//! - Never returns an error, so it is always safe as the last handler

use crate::agents::{AgentAnswer, EMPTY_APOLOGY, ERROR_APOLOGY, TIMEOUT_APOLOGY};
use crate::core::TextGenerator;
use crate::error::{bounded, ConciergeError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const INSTRUCTIONS: &str = "You are a helpful customer support assistant for a film rental store. \
     Answer the user's question directly and conversationally. \
     Do not describe tasks or summarize what you did; just answer. \
     Be clear, accurate and concise, and say so honestly if you don't know.";

/// Sent as the final chunk when a stream stalls past the timeout
pub const STREAM_INTERRUPTED: &str = "\n[response interrupted: the model stopped responding]";

pub struct GeneralAgent {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl GeneralAgent {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn answer(&self, question: &str) -> AgentAnswer {
        let result = bounded(
            "general answer",
            self.timeout,
            self.generator.generate_with_system(INSTRUCTIONS, question),
        )
        .await;

        let text = match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("[GeneralAgent] Model returned an empty answer");
                EMPTY_APOLOGY.to_string()
            }
            Err(e) => {
                tracing::error!("[GeneralAgent] Failed to answer question: {}", e);
                apology_for(&e).to_string()
            }
        };

        AgentAnswer::general(text)
    }

    /// Stream the model's answer chunk by chunk, without routing.
    /// If the stream cannot be opened a single apology chunk is sent instead.
    pub async fn stream(&self, question: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(32);

        match bounded(
            "stream start",
            self.timeout,
            self.generator.generate_stream(question),
        )
        .await
        {
            Ok(upstream) => {
                tokio::spawn(relay_chunks(upstream, tx, self.timeout));
            }
            Err(e) => {
                tracing::error!("[GeneralAgent] Could not start stream: {}", e);
                let _ = tx.send(apology_for(&e).to_string()).await;
            }
        }

        rx
    }
}

/// Forward chunks until the upstream closes, the reader goes away, or a chunk
/// takes longer than `idle_limit` to arrive.
async fn relay_chunks(
    mut upstream: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
    idle_limit: Duration,
) {
    let mut chunks = 0usize;
    loop {
        match tokio::time::timeout(idle_limit, upstream.recv()).await {
            Ok(Some(chunk)) => {
                chunks += 1;
                if tx.send(chunk).await.is_err() {
                    tracing::debug!("[GeneralAgent] Stream reader dropped");
                    return;
                }
            }
            Ok(None) => {
                tracing::info!("[GeneralAgent] Stream finished after {} chunks", chunks);
                return;
            }
            Err(_) => {
                tracing::warn!("[GeneralAgent] Stream idle for {:?}, closing", idle_limit);
                let _ = tx.send(STREAM_INTERRUPTED.to_string()).await;
                return;
            }
        }
    }
}

fn apology_for(error: &ConciergeError) -> &'static str {
    match error {
        ConciergeError::Timeout { .. } => TIMEOUT_APOLOGY,
        _ => ERROR_APOLOGY,
    }
}
