//! Scripted collaborators for unit tests.

use crate::agents::{Classifier, RoutingDecision};
use crate::core::TextGenerator;
use crate::error::{ConciergeError, ConciergeResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Returns pre-programmed replies in FIFO order and records every prompt.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<ConciergeResult<String>>>,
    prompts: Mutex<Vec<String>>,
    stream_chunks: Option<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<ConciergeResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            stream_chunks: None,
            delay: None,
        })
    }

    pub fn streaming(chunks: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            stream_chunks: Some(chunks.into_iter().map(String::from).collect()),
            delay: None,
        })
    }

    /// Every call sleeps for `delay` before answering
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            stream_chunks: None,
            delay: Some(delay),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> ConciergeResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ConciergeError::Llm("no scripted reply left".to_string())))
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> ConciergeResult<String> {
        self.generate(prompt).await
    }

    async fn generate_stream(&self, prompt: &str) -> ConciergeResult<mpsc::Receiver<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let chunks = self
            .stream_chunks
            .clone()
            .ok_or_else(|| ConciergeError::Llm("streaming unavailable".to_string()))?;

        let (tx, rx) = mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            let _ = tx.send(chunk).await;
        }
        Ok(rx)
    }
}

/// Classifier that always returns the same decision, or always fails
pub struct FixedClassifier {
    decision: Option<RoutingDecision>,
    delay: Option<Duration>,
}

impl FixedClassifier {
    pub fn returning(decision: RoutingDecision) -> Arc<Self> {
        Arc::new(Self {
            decision: Some(decision),
            delay: None,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            decision: None,
            delay: None,
        })
    }

    pub fn slow(decision: RoutingDecision, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            decision: Some(decision),
            delay: Some(delay),
        })
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _question: &str) -> ConciergeResult<RoutingDecision> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.decision
            .clone()
            .ok_or_else(|| ConciergeError::Llm("classifier unavailable".to_string()))
    }
}
