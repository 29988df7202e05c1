//! Question answering agents
//!
//! Information Hiding:
//! - Title heuristics, intent keywords and prompts stay inside each agent
//! - The orchestrator only sees `AgentAnswer` / `Option<AgentAnswer>`
//! - Which agent answered is part of the returned value, never shared state

pub mod film_agent;
pub mod general_agent;
pub mod orchestrator;
pub mod router;
pub mod summary;
pub mod title;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use film_agent::FilmSearchAgent;
pub use general_agent::GeneralAgent;
pub use orchestrator::Orchestrator;
pub use router::{Classifier, LlmClassifier, QuestionRouter};
pub use summary::{FilmSummary, FilmSummaryService};

/// The two handlers a question can end up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentName {
    #[serde(alias = "SearchAgent")]
    FilmHandler,
    #[serde(alias = "LLMAgent")]
    GeneralHandler,
}

impl AgentName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::FilmHandler => "FilmHandler",
            AgentName::GeneralHandler => "GeneralHandler",
        }
    }

    /// Parse a classifier label; older deployments used `SearchAgent` / `LLMAgent`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "FilmHandler" | "SearchAgent" => Some(AgentName::FilmHandler),
            "GeneralHandler" | "LLMAgent" => Some(AgentName::GeneralHandler),
            _ => None,
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which handler should take a question, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    #[serde(rename = "agent", alias = "target")]
    pub target: AgentName,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

impl RoutingDecision {
    pub fn new(target: AgentName, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            target,
            confidence: clamp_confidence(confidence),
            reasoning: reasoning.into(),
        }
    }
}

fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// The single answer produced for a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnswer {
    pub agent: AgentName,
    pub answer: String,
}

impl AgentAnswer {
    pub fn film(answer: impl Into<String>) -> Self {
        Self {
            agent: AgentName::FilmHandler,
            answer: answer.into(),
        }
    }

    pub fn general(answer: impl Into<String>) -> Self {
        Self {
            agent: AgentName::GeneralHandler,
            answer: answer.into(),
        }
    }
}

pub const ERROR_APOLOGY: &str = "I'm sorry, I encountered an error processing your request.";
pub const TIMEOUT_APOLOGY: &str = "I'm sorry, the request timed out. Please try again.";
pub const EMPTY_APOLOGY: &str = "I'm sorry, I couldn't generate a response.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_name_serializes_as_label() {
        let answer = AgentAnswer::film("Alien rents for $2.99.");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["agent"], "FilmHandler");
        assert_eq!(json["answer"], "Alien rents for $2.99.");
    }

    #[test]
    fn test_legacy_labels() {
        assert_eq!(AgentName::from_label(" SearchAgent "), Some(AgentName::FilmHandler));
        assert_eq!(AgentName::from_label("LLMAgent"), Some(AgentName::GeneralHandler));
        assert_eq!(AgentName::from_label("WeatherAgent"), None);

        let decision: RoutingDecision =
            serde_json::from_str(r#"{"agent": "LLMAgent", "confidence": 0.7}"#).unwrap();
        assert_eq!(decision.target, AgentName::GeneralHandler);
        assert!(decision.reasoning.is_empty());
    }

    #[test]
    fn test_decision_confidence_is_clamped() {
        assert_eq!(RoutingDecision::new(AgentName::FilmHandler, 3.0, "").confidence, 1.0);
        assert_eq!(RoutingDecision::new(AgentName::FilmHandler, -1.0, "").confidence, 0.0);
        assert_eq!(RoutingDecision::new(AgentName::FilmHandler, f32::NAN, "").confidence, 0.0);
    }
}
