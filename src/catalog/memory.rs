//! In-Memory Film Catalog
//!
//! Information Hiding:
//! - Vec storage ordered by film id, plus category ids, hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and demos without a database file

use super::{Category, Film, FilmCatalog, FilmFact, FilmUpdate, NewFilm, UNKNOWN_CATEGORY};
use crate::error::ConciergeResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    film: Film,
    category: Option<String>,
}

impl Entry {
    fn fact(&self) -> FilmFact {
        FilmFact {
            title: self.film.title.clone(),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            rental_rate: self.film.rental_rate,
            rating: self.film.rating.clone(),
            description: self.film.description.clone(),
            release_year: self.film.release_year,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<Entry>,
    /// Ids follow first-seen order and are never reused
    categories: Vec<Category>,
    next_film_id: i64,
}

impl State {
    fn ensure_category(&mut self, name: &str) {
        if !self.categories.iter().any(|c| c.name == name) {
            let id = self.categories.last().map_or(1, |c| c.id + 1);
            self.categories.push(Category {
                id,
                name: name.to_string(),
            });
        }
    }
}

/// In-memory catalog. Data is lost when the process terminates.
pub struct InMemoryCatalog {
    state: Arc<RwLock<State>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                next_film_id: 1,
                ..State::default()
            })),
        }
    }

    /// Build a catalog pre-filled with `films`, ids assigned from 1.
    pub async fn with_films(films: Vec<NewFilm>) -> ConciergeResult<Self> {
        let catalog = Self::new();
        for film in films {
            catalog.insert(film).await?;
        }
        Ok(catalog)
    }

    pub async fn insert(&self, film: NewFilm) -> ConciergeResult<i64> {
        Ok(self.create_film(film).await?.id)
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilmCatalog for InMemoryCatalog {
    async fn search_by_title(&self, partial_title: &str) -> ConciergeResult<Option<FilmFact>> {
        let needle = partial_title.to_lowercase();
        let state = self.state.read().await;

        let mut matches = state
            .entries
            .iter()
            .filter(|e| e.film.title.to_lowercase().contains(&needle));

        let first = matches.next();
        let exact = first
            .into_iter()
            .chain(matches)
            .find(|e| e.film.title.to_lowercase() == needle);

        let found = exact.or(first).map(Entry::fact);
        tracing::debug!(
            "[InMemoryCatalog] Search '{}' -> {:?}",
            partial_title,
            found.as_ref().map(|f| &f.title)
        );
        Ok(found)
    }

    async fn get_film(&self, film_id: i64) -> ConciergeResult<Option<Film>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .find(|e| e.film.id == film_id)
            .map(|e| e.film.clone()))
    }

    async fn list_films(
        &self,
        skip: usize,
        limit: usize,
        category: Option<&str>,
    ) -> ConciergeResult<Vec<Film>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| match category {
                Some(name) => e.category.as_deref() == Some(name),
                None => true,
            })
            .skip(skip)
            .take(limit)
            .map(|e| e.film.clone())
            .collect())
    }

    async fn create_film(&self, film: NewFilm) -> ConciergeResult<Film> {
        film.validate()?;

        let mut state = self.state.write().await;
        let id = state.next_film_id;
        state.next_film_id += 1;
        if let Some(name) = &film.category {
            state.ensure_category(name);
        }

        let stored = Film {
            id,
            title: film.title,
            description: film.description,
            release_year: film.release_year,
            rental_duration: film.rental_duration,
            rental_rate: film.rental_rate,
            length: film.length,
            replacement_cost: film.replacement_cost,
            rating: film.rating,
        };
        state.entries.push(Entry {
            film: stored.clone(),
            category: film.category,
        });
        tracing::debug!("[InMemoryCatalog] Inserted film {}", id);
        Ok(stored)
    }

    async fn update_film(&self, film_id: i64, update: FilmUpdate) -> ConciergeResult<Option<Film>> {
        update.validate()?;

        let mut state = self.state.write().await;
        let Some(entry) = state.entries.iter_mut().find(|e| e.film.id == film_id) else {
            return Ok(None);
        };
        update.apply(&mut entry.film);
        Ok(Some(entry.film.clone()))
    }

    async fn delete_film(&self, film_id: i64) -> ConciergeResult<bool> {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|e| e.film.id != film_id);
        Ok(state.entries.len() < before)
    }

    async fn list_categories(&self, skip: usize, limit: usize) -> ConciergeResult<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn get_category(&self, category_id: i64) -> ConciergeResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == category_id).cloned())
    }
}
