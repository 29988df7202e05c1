//! Film Search Agent - catalog-backed answers about a single film
//!
//! Information Hiding:
//! - Title heuristics delegated to `title`
//! - Intent keywords and answer wording kept private
//! - A miss is `Ok(None)` so the orchestrator can hand off

use crate::agents::title::extract_title;
use crate::agents::AgentAnswer;
use crate::catalog::{FilmCatalog, FilmFact};
use crate::core::response::strip_code_fences;
use crate::core::TextGenerator;
use crate::error::{bounded, ConciergeResult};
use std::sync::Arc;
use std::time::Duration;

const SUMMARY_INSTRUCTIONS: &str = "You write short summaries of films for a rental store. \
     Using only the film information provided, describe the film in 2-3 sentences. \
     Reply with plain text, no markdown.";

/// What the question asks about the film
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmIntent {
    Rating,
    RentalRate,
    Category,
    Summary,
}

impl FilmIntent {
    /// Keyword checks in priority order; rating questions win over price questions.
    pub fn classify(question: &str) -> Self {
        let lower = question.to_lowercase();

        if lower.contains("rating") || lower.contains("rated") {
            FilmIntent::Rating
        } else if lower.contains("rental") || lower.contains("cost") || lower.contains("price") {
            FilmIntent::RentalRate
        } else if lower.contains("category") {
            FilmIntent::Category
        } else {
            FilmIntent::Summary
        }
    }
}

pub fn rating_sentence(fact: &FilmFact) -> String {
    match fact.rating.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(rating) => format!("{} is rated {}.", fact.title, rating),
        None => format!("{} does not have a rating available.", fact.title),
    }
}

pub fn rental_sentence(fact: &FilmFact) -> String {
    format!("{} rents for ${:.2}.", fact.title, fact.rental_rate)
}

pub fn category_sentence(fact: &FilmFact) -> String {
    format!("{} is in the {} category.", fact.title, fact.category)
}

/// Structured context handed to the model when summarizing
pub fn fact_sheet(fact: &FilmFact) -> String {
    format!(
        "Title: {}\nCategory: {}\nRating: {}\nRelease Year: {}\nDescription: {}",
        fact.title,
        fact.category,
        fact.rating.as_deref().unwrap_or("N/A"),
        fact.release_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        fact.description
            .as_deref()
            .unwrap_or("No description available"),
    )
}

pub struct FilmSearchAgent {
    catalog: Arc<dyn FilmCatalog>,
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl FilmSearchAgent {
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

    /// Answer a question about a film, or `Ok(None)` when no title or no film was found
    pub async fn answer(&self, question: &str) -> ConciergeResult<Option<AgentAnswer>> {
        let Some(title) = extract_title(question) else {
            tracing::warn!("[FilmSearchAgent] Could not extract film title from question");
            return Ok(None);
        };

        let lookup = bounded(
            "catalog lookup",
            self.timeout,
            self.catalog.search_by_title(&title),
        )
        .await?;

        let Some(fact) = lookup else {
            tracing::info!("[FilmSearchAgent] Film '{}' not found in catalog", title);
            return Ok(None);
        };

        let intent = FilmIntent::classify(question);
        tracing::info!(
            "[FilmSearchAgent] Matched '{}' as '{}' ({:?})",
            title,
            fact.title,
            intent
        );

        let text = match intent {
            FilmIntent::Rating => rating_sentence(&fact),
            FilmIntent::RentalRate => rental_sentence(&fact),
            FilmIntent::Category => category_sentence(&fact),
            FilmIntent::Summary => {
                let summary = self.summarize(&fact).await?;
                if summary.is_empty() {
                    tracing::warn!("[FilmSearchAgent] Model returned an empty summary");
                    return Ok(None);
                }
                summary
            }
        };

        Ok(Some(AgentAnswer::film(text)))
    }

    async fn summarize(&self, fact: &FilmFact) -> ConciergeResult<String> {
        let sheet = fact_sheet(fact);
        let reply = bounded(
            "film summary",
            self.timeout,
            self.generator.generate_with_system(SUMMARY_INSTRUCTIONS, &sheet),
        )
        .await?;

        let summary = strip_code_fences(&reply).to_string();
        tracing::info!(
            "[FilmSearchAgent] Generated summary for '{}' ({} chars)",
            fact.title,
            summary.len()
        );
        Ok(summary)
    }
}
