//! Orchestrator - router, film agent and general agent wired together
//!
//! Sequence for `route`:
//! 1. The router picks a handler (classifier, else heuristics)
//! 2. FilmHandler runs first when chosen; a miss hands off to GeneralHandler
//! 3. Any FilmHandler error becomes a GeneralHandler apology
//!
//! The returned `AgentAnswer` always names the handler whose text it carries.

use crate::agents::{
    AgentAnswer, AgentName, Classifier, FilmSearchAgent, GeneralAgent, LlmClassifier,
    QuestionRouter, ERROR_APOLOGY, TIMEOUT_APOLOGY,
};
use crate::catalog::FilmCatalog;
use crate::config::Settings;
use crate::core::TextGenerator;
use crate::error::ConciergeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct Orchestrator {
    router: QuestionRouter,
    film_agent: FilmSearchAgent,
    general_agent: GeneralAgent,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn FilmCatalog>,
        generator: Arc<dyn TextGenerator>,
        classifier: Option<Arc<dyn Classifier>>,
        timeout: Duration,
    ) -> Self {
        Self {
            router: QuestionRouter::new(classifier, timeout),
            film_agent: FilmSearchAgent::new(catalog, Arc::clone(&generator), timeout),
            general_agent: GeneralAgent::new(generator, timeout),
        }
    }

    /// Build from settings; the model doubles as classifier when enabled
    pub fn from_settings(
        settings: &Settings,
        catalog: Arc<dyn FilmCatalog>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let classifier: Option<Arc<dyn Classifier>> = if settings.routing.use_classifier {
            Some(Arc::new(LlmClassifier::new(Arc::clone(&generator))))
        } else {
            None
        };
        Self::new(catalog, generator, classifier, settings.collaborator_timeout())
    }

    /// Answer a question. Never fails: every error path ends in a GeneralHandler answer.
    pub async fn route(&self, question: &str) -> AgentAnswer {
        tracing::info!("[Orchestrator] Processing question: {}", preview(question));

        let decision = self.router.decide(question).await;

        let answer = match decision.target {
            AgentName::FilmHandler => match self.film_agent.answer(question).await {
                Ok(Some(answer)) => answer,
                Ok(None) => {
                    tracing::info!("[Orchestrator] No film match, handing off to GeneralHandler");
                    self.general_agent.answer(question).await
                }
                Err(e) => {
                    tracing::error!("[Orchestrator] FilmHandler failed: {}", e);
                    AgentAnswer::general(match e {
                        ConciergeError::Timeout { .. } => TIMEOUT_APOLOGY,
                        _ => ERROR_APOLOGY,
                    })
                }
            },
            AgentName::GeneralHandler => self.general_agent.answer(question).await,
        };

        tracing::info!(
            "[Orchestrator] {} answered ({} chars)",
            answer.agent,
            answer.answer.len()
        );
        answer
    }

    /// Stream a general answer without routing
    pub async fn ask_stream(&self, question: &str) -> mpsc::Receiver<String> {
        tracing::info!("[Orchestrator] Streaming question: {}", preview(question));
        self.general_agent.stream(question).await
    }
}

fn preview(question: &str) -> String {
    question.chars().take(100).collect()
}
