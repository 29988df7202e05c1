//! Question Router - intent classification with a heuristic fallback
//!
//! Routing happens once per question ("one-way ticket"):
//! - an optional classifier (normally the language model) suggests a handler
//! - its reply is parsed defensively; anything unusable is ignored
//! - otherwise keyword and capitalization heuristics decide
//!
//! Information Hiding:
//! - Hides the classifier prompt and reply cleanup
//! - Hides the fallback heuristics
//! - Exposes a single `decide()` returning a `RoutingDecision`

use crate::agents::title::{clean_word, is_stop_word};
use crate::agents::{AgentName, RoutingDecision};
use crate::core::response::strip_code_fences;
use crate::core::TextGenerator;
use crate::error::{bounded, ConciergeError, ConciergeResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const ROUTER_PROMPT: &str = "You are a router for a film rental store's help desk. \
     Decide which agent should answer the user's question.\n\n\
     Available Agents:\n\
     - FilmHandler: answers questions about a specific film in the catalog \
       (rental rate, rating, category, or a short summary)\n\
     - GeneralHandler: answers every other question with general knowledge\n\n\
     IMPORTANT: You MUST respond in this EXACT JSON format:\n\
     {\n  \
       \"agent\": \"FilmHandler\" or \"GeneralHandler\",\n  \
       \"confidence\": a number between 0 and 1,\n  \
       \"reasoning\": \"why this agent is the best choice\"\n\
     }\n\n\
     Respond with valid JSON only. No extra text.";

static AGENT_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{[^{}]*"(?:agent|target)"[^{}]*\}"#).expect("agent object regex")
});

/// Anything that can suggest a handler for a question
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, question: &str) -> ConciergeResult<RoutingDecision>;
}

/// Classifier backed by a text generator
pub struct LlmClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl LlmClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, question: &str) -> ConciergeResult<RoutingDecision> {
        let reply = self
            .generator
            .generate_json(ROUTER_PROMPT, &format!("Question: {}", question))
            .await?;
        parse_routing_decision(&reply)
    }
}

/// Loosely-typed view of a classifier reply; labels are validated afterwards.
/// Only `agent` has to be a string, the other fields take whatever JSON the
/// model produced.
#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(alias = "target")]
    agent: String,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    reasoning: Option<Value>,
}

impl RawDecision {
    /// Numbers and numeric strings count; anything else is 0.0
    fn confidence(&self) -> f32 {
        match &self.confidence {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) as f32,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn reasoning(&self) -> String {
        match &self.reasoning {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Parse a classifier reply that may be fenced or surrounded by chatter.
pub fn parse_routing_decision(reply: &str) -> ConciergeResult<RoutingDecision> {
    let body = strip_code_fences(reply);

    let raw = serde_json::from_str::<RawDecision>(body)
        .ok()
        .or_else(|| {
            AGENT_OBJECT
                .find(body)
                .and_then(|m| serde_json::from_str::<RawDecision>(m.as_str()).ok())
        })
        .or_else(|| {
            let start = body.find('{')?;
            let end = body.rfind('}')?;
            (start < end)
                .then(|| serde_json::from_str::<RawDecision>(&body[start..=end]).ok())
                .flatten()
        })
        .ok_or_else(|| {
            ConciergeError::Parse(format!("no routing decision in classifier reply: {}", reply))
        })?;

    let target = AgentName::from_label(&raw.agent).ok_or_else(|| {
        ConciergeError::Parse(format!("unknown agent label '{}'", raw.agent))
    })?;

    Ok(RoutingDecision::new(target, raw.confidence(), raw.reasoning()))
}

/// Deterministic routing used when no classifier answer is usable.
///
/// Film or movie keywords, or any capitalized word longer than two letters
/// that is not a stop word, send the question to the film handler first.
pub fn fallback_route(question: &str) -> RoutingDecision {
    let lower = question.to_lowercase();
    if lower.contains("film") || lower.contains("movie") {
        return RoutingDecision::new(AgentName::FilmHandler, 0.5, "mentions a film or movie");
    }

    let capitalized = question
        .split_whitespace()
        .map(clean_word)
        .find(|word| {
            word.chars().next().is_some_and(char::is_uppercase)
                && word.chars().count() > 2
                && !is_stop_word(word)
        });

    match capitalized {
        Some(word) => RoutingDecision::new(
            AgentName::FilmHandler,
            0.5,
            format!("capitalized word '{}' may be a title", word),
        ),
        None => RoutingDecision::new(
            AgentName::GeneralHandler,
            0.5,
            "no film keyword or title-like word",
        ),
    }
}

/// Combines the optional classifier with the fallback heuristics
pub struct QuestionRouter {
    classifier: Option<Arc<dyn Classifier>>,
    timeout: Duration,
}

impl QuestionRouter {
    pub fn new(classifier: Option<Arc<dyn Classifier>>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    pub async fn decide(&self, question: &str) -> RoutingDecision {
        if let Some(classifier) = &self.classifier {
            match bounded("classification", self.timeout, classifier.classify(question)).await {
                Ok(decision) => {
                    tracing::info!(
                        "[QuestionRouter] Classifier chose {} ({:.2}): {}",
                        decision.target,
                        decision.confidence,
                        decision.reasoning
                    );
                    return decision;
                }
                Err(e) => {
                    tracing::warn!(
                        "[QuestionRouter] Classification failed, using fallback: {}",
                        e
                    );
                }
            }
        }

        let decision = fallback_route(question);
        tracing::info!(
            "[QuestionRouter] Fallback chose {}: {}",
            decision.target,
            decision.reasoning
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedClassifier, ScriptedGenerator};

    #[test]
    fn test_parse_clean_json() {
        let decision = parse_routing_decision(
            r#"{"agent": "GeneralHandler", "confidence": 0.8, "reasoning": "trivia"}"#,
        )
        .unwrap();
        assert_eq!(decision.target, AgentName::GeneralHandler);
        assert_eq!(decision.confidence, 0.8);
        assert_eq!(decision.reasoning, "trivia");
    }

    #[test]
    fn test_parse_fenced_json() {
        let decision =
            parse_routing_decision("```json\n{\"agent\": \"FilmHandler\", \"confidence\": 0.9}\n```")
                .unwrap();
        assert_eq!(decision.target, AgentName::FilmHandler);
    }

    #[test]
    fn test_parse_embedded_object() {
        let decision = parse_routing_decision(r#"Sure! {"agent": "FilmHandler"} cool"#).unwrap();
        assert_eq!(decision.target, AgentName::FilmHandler);
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_parse_legacy_label_and_clamp() {
        let decision =
            parse_routing_decision(r#"{"agent": " SearchAgent ", "confidence": 7}"#).unwrap();
        assert_eq!(decision.target, AgentName::FilmHandler);
        assert_eq!(decision.confidence, 1.0);
    }

    #[test]
    fn test_parse_tolerates_loose_field_types() {
        let decision =
            parse_routing_decision(r#"{"agent": "FilmHandler", "confidence": "high"}"#).unwrap();
        assert_eq!(decision.target, AgentName::FilmHandler);
        assert_eq!(decision.confidence, 0.0);

        let decision = parse_routing_decision(
            r#"{"agent": "GeneralHandler", "confidence": "0.9", "reasoning": ["no title"]}"#,
        )
        .unwrap();
        assert_eq!(decision.target, AgentName::GeneralHandler);
        assert_eq!(decision.confidence, 0.9);
        assert_eq!(decision.reasoning, r#"["no title"]"#);

        let decision =
            parse_routing_decision(r#"{"agent": "FilmHandler", "confidence": null}"#).unwrap();
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_parse_rejects_unknown_label_and_garbage() {
        assert!(parse_routing_decision(r#"{"agent": "WeatherAgent"}"#).is_err());
        assert!(parse_routing_decision("I think the film agent").is_err());
        assert!(parse_routing_decision("} nope {").is_err());
    }

    #[test]
    fn test_fallback_keywords() {
        assert_eq!(
            fallback_route("which movie should i watch tonight?").target,
            AgentName::FilmHandler
        );
        assert_eq!(
            fallback_route("Who won the World Cup in 2022?").target,
            AgentName::FilmHandler
        );
    }

    #[test]
    fn test_fallback_general_without_titles() {
        for question in [
            "how do i reset my password?",
            "what is the capital of france",
            "What is the rate for a week?",
            "",
        ] {
            assert_eq!(
                fallback_route(question).target,
                AgentName::GeneralHandler,
                "{}",
                question
            );
        }
    }

    #[tokio::test]
    async fn test_router_uses_classifier() {
        let classifier = FixedClassifier::returning(RoutingDecision::new(
            AgentName::GeneralHandler,
            0.9,
            "trivia",
        ));
        let router = QuestionRouter::new(Some(classifier), Duration::from_secs(5));
        let decision = router.decide("What is the rental rate for Alien?").await;
        assert_eq!(decision.target, AgentName::GeneralHandler);
    }

    #[tokio::test]
    async fn test_router_falls_back_on_failure_and_timeout() {
        let router = QuestionRouter::new(Some(FixedClassifier::failing()), Duration::from_secs(5));
        assert_eq!(
            router.decide("Tell me about Alien").await.target,
            AgentName::FilmHandler
        );

        let slow = FixedClassifier::slow(
            RoutingDecision::new(AgentName::GeneralHandler, 1.0, ""),
            Duration::from_secs(10),
        );
        let router = QuestionRouter::new(Some(slow), Duration::from_millis(20));
        assert_eq!(
            router.decide("Tell me about Alien").await.target,
            AgentName::FilmHandler
        );
    }

    #[tokio::test]
    async fn test_llm_classifier_parses_chatty_reply() {
        let generator = ScriptedGenerator::new(vec![Ok(
            "Sure! {\"agent\": \"FilmHandler\", \"reasoning\": \"names a film\"} cool".into(),
        )]);
        let classifier = LlmClassifier::new(generator.clone());

        let decision = classifier.classify("Is Alien any good?").await.unwrap();
        assert_eq!(decision.target, AgentName::FilmHandler);
        assert_eq!(generator.prompts(), vec!["Question: Is Alien any good?"]);
    }
}
