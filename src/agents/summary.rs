//! Structured film verdicts: `{title, rating, recommended}` for a film id.
//!
//! The model is asked for JSON; if it fails or answers nonsense, the
//! catalog values are returned with `recommended = false`.

use crate::catalog::{Film, FilmCatalog};
use crate::core::response::strip_code_fences;
use crate::core::TextGenerator;
use crate::error::{bounded, ConciergeError, ConciergeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const SUMMARY_SYSTEM: &str = "You are a film critic for a rental store. \
     You must respond with ONLY valid JSON. No markdown, no code blocks, just pure JSON. \
     The JSON must have exactly these keys: \"title\", \"rating\", \"recommended\" (boolean).";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmSummary {
    pub title: String,
    pub rating: String,
    pub recommended: bool,
}

impl FilmSummary {
    fn from_catalog(film: &Film) -> Self {
        Self {
            title: film.title.clone(),
            rating: film.rating.clone().unwrap_or_else(|| "N/A".to_string()),
            recommended: false,
        }
    }
}

pub struct FilmSummaryService {
    catalog: Arc<dyn FilmCatalog>,
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl FilmSummaryService {
    pub fn new(
        catalog: Arc<dyn FilmCatalog>,
        generator: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            generator,
            timeout,
        }
    }

    pub async fn summarize(&self, film_id: i64) -> ConciergeResult<FilmSummary> {
        let film = bounded("catalog lookup", self.timeout, self.catalog.get_film(film_id))
            .await?
            .ok_or_else(|| ConciergeError::NotFound(format!("film {}", film_id)))?;

        let prompt = summary_prompt(&film);
        let reply = bounded(
            "film verdict",
            self.timeout,
            self.generator.generate_json(SUMMARY_SYSTEM, &prompt),
        )
        .await;

        let summary = match reply.and_then(|text| parse_summary(&text, &film)) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(
                    "[FilmSummaryService] Verdict for film {} failed, using catalog values: {}",
                    film_id,
                    e
                );
                FilmSummary::from_catalog(&film)
            }
        };

        tracing::info!(
            "[FilmSummaryService] Film {} '{}' recommended={}",
            film_id,
            summary.title,
            summary.recommended
        );
        Ok(summary)
    }
}

fn summary_prompt(film: &Film) -> String {
    format!(
        "Analyze this film and provide a summary in JSON format with exactly these keys: \
         title, rating, recommended (boolean).\n\n\
         Film details:\n\
         - Title: {}\n\
         - Description: {}\n\
         - Rating: {}\n\
         - Release Year: {}\n\n\
         Respond ONLY with valid JSON in this exact format:\n\
         {{\"title\": \"...\", \"rating\": \"...\", \"recommended\": true/false}}",
        film.title,
        film.description.as_deref().unwrap_or("N/A"),
        film.rating.as_deref().unwrap_or("N/A"),
        film.release_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    )
}

/// Missing keys fall back to catalog values; `recommended` accepts bools or "true"/"yes".
fn parse_summary(reply: &str, film: &Film) -> ConciergeResult<FilmSummary> {
    let value: Value = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| ConciergeError::Parse(format!("verdict is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| ConciergeError::Parse("verdict is not a JSON object".to_string()))?;

    let fallback = FilmSummary::from_catalog(film);
    let title = object
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .unwrap_or(fallback.title);
    let rating = object
        .get("rating")
        .and_then(|r| match r {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or(fallback.rating);
    let recommended = match object.get("recommended") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        _ => false,
    };

    Ok(FilmSummary {
        title,
        rating,
        recommended,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::InMemoryCatalog;
    use crate::catalog::NewFilm;
    use crate::testing::ScriptedGenerator;

    async fn service(generator: Arc<ScriptedGenerator>) -> FilmSummaryService {
        let catalog = InMemoryCatalog::with_films(vec![NewFilm::new("Alien", 2.99)
            .with_rating("R")
            .with_description("In space no one can hear you scream")])
        .await
        .unwrap();
        FilmSummaryService::new(Arc::new(catalog), generator, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_model_verdict() {
        let generator = ScriptedGenerator::new(vec![Ok(
            "```json\n{\"title\": \"Alien\", \"rating\": \"R\", \"recommended\": true}\n```".into(),
        )]);
        let service = service(generator.clone()).await;

        let summary = service.summarize(1).await.unwrap();
        assert_eq!(
            summary,
            FilmSummary {
                title: "Alien".to_string(),
                rating: "R".to_string(),
                recommended: true,
            }
        );
        assert!(generator.prompts()[0].contains("In space no one can hear you scream"));
    }

    #[tokio::test]
    async fn test_partial_verdict_uses_catalog_values() {
        let generator = ScriptedGenerator::new(vec![Ok(r#"{"recommended": "yes"}"#.into())]);
        let summary = service(generator).await.summarize(1).await.unwrap();
        assert_eq!(summary.title, "Alien");
        assert_eq!(summary.rating, "R");
        assert!(summary.recommended);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let generator = ScriptedGenerator::new(vec![Ok("I loved it!".into())]);
        let summary = service(generator).await.summarize(1).await.unwrap();
        assert_eq!(summary.title, "Alien");
        assert!(!summary.recommended);
    }

    #[tokio::test]
    async fn test_unknown_film() {
        let generator = ScriptedGenerator::new(vec![]);
        let result = service(generator).await.summarize(42).await;
        assert!(matches!(result, Err(ConciergeError::NotFound(_))));
    }
}
