//! Film Catalog Abstraction
//!
//! Information Hiding:
//! - Storage backend hidden behind the `FilmCatalog` trait
//! - SQL, joins and tie-breaking rules live with each implementation
//! - Agents only ever see read-only `FilmFact` / `Film` values
//! - Rentals live in the same store but behind their own `RentalStore` trait

use crate::error::{ConciergeError, ConciergeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod rental;
pub mod sqlite;

pub use rental::{NewRental, Rental, RentalStore, RentalUpdate};

/// Category reported for films that have no category row.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// MPAA ratings accepted by the Pagila schema.
pub const VALID_RATINGS: [&str; 5] = ["G", "PG", "PG-13", "R", "NC-17"];

/// What the film agent needs to answer a question about one film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmFact {
    pub title: String,
    pub category: String,
    pub rental_rate: f64,
    pub rating: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
}

/// A row of the `film` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rental_duration: i32,
    pub rental_rate: f64,
    pub length: Option<i32>,
    pub replacement_cost: f64,
    pub rating: Option<String>,
}

/// A row of the `category` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Input for inserting a film together with its category
#[derive(Debug, Clone)]
pub struct NewFilm {
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rental_duration: i32,
    pub rental_rate: f64,
    pub length: Option<i32>,
    pub replacement_cost: f64,
    pub rating: Option<String>,
    pub category: Option<String>,
}

impl NewFilm {
    pub fn new(title: impl Into<String>, rental_rate: f64) -> Self {
        Self {
            title: title.into(),
            description: None,
            release_year: None,
            rental_duration: 3,
            rental_rate,
            length: None,
            replacement_cost: 19.99,
            rating: None,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    /// Checks the constraints the Pagila schema enforces with domains and enums.
    pub fn validate(&self) -> ConciergeResult<()> {
        check_title(&self.title)?;
        check_rating(self.rating.as_deref())?;
        check_release_year(self.release_year)?;
        if self.rental_rate < 0.0 {
            return Err(ConciergeError::Catalog(
                "rental_rate cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of a film; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rental_duration: Option<i32>,
    pub rental_rate: Option<f64>,
    pub length: Option<i32>,
    pub replacement_cost: Option<f64>,
    pub rating: Option<String>,
}

impl FilmUpdate {
    pub fn is_empty(&self) -> bool {
        self == &FilmUpdate::default()
    }

    /// Durations, lengths and amounts must be positive when given.
    pub fn validate(&self) -> ConciergeResult<()> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        check_rating(self.rating.as_deref())?;
        check_release_year(self.release_year)?;
        if self.rental_duration.is_some_and(|d| d <= 0) {
            return Err(ConciergeError::Catalog(
                "rental_duration must be positive".to_string(),
            ));
        }
        if self.length.is_some_and(|l| l <= 0) {
            return Err(ConciergeError::Catalog("length must be positive".to_string()));
        }
        for (name, amount) in [
            ("rental_rate", self.rental_rate),
            ("replacement_cost", self.replacement_cost),
        ] {
            if amount.is_some_and(|a| a <= 0.0) {
                return Err(ConciergeError::Catalog(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    /// Copy the present fields onto `film`
    pub fn apply(&self, film: &mut Film) {
        if let Some(title) = &self.title {
            film.title = title.clone();
        }
        if let Some(description) = &self.description {
            film.description = Some(description.clone());
        }
        if let Some(year) = self.release_year {
            film.release_year = Some(year);
        }
        if let Some(duration) = self.rental_duration {
            film.rental_duration = duration;
        }
        if let Some(rate) = self.rental_rate {
            film.rental_rate = rate;
        }
        if let Some(length) = self.length {
            film.length = Some(length);
        }
        if let Some(cost) = self.replacement_cost {
            film.replacement_cost = cost;
        }
        if let Some(rating) = &self.rating {
            film.rating = Some(rating.clone());
        }
    }
}

fn check_title(title: &str) -> ConciergeResult<()> {
    if title.trim().is_empty() {
        return Err(ConciergeError::Catalog("title cannot be empty".to_string()));
    }
    Ok(())
}

fn check_rating(rating: Option<&str>) -> ConciergeResult<()> {
    match rating {
        Some(rating) if !VALID_RATINGS.contains(&rating) => {
            Err(ConciergeError::Catalog(format!("Invalid rating: {}", rating)))
        }
        _ => Ok(()),
    }
}

fn check_release_year(year: Option<i32>) -> ConciergeResult<()> {
    match year {
        Some(year) if !(1901..=2155).contains(&year) => Err(ConciergeError::Catalog(format!(
            "release_year must be between 1901 and 2155, got {}",
            year
        ))),
        _ => Ok(()),
    }
}

/// Read interface the agents and the summary service depend on
#[async_trait]
pub trait FilmCatalog: Send + Sync {
    /// Case-insensitive substring match on the title.
    /// When several films match, an exact title match wins, then the lowest film id.
    async fn search_by_title(&self, partial_title: &str) -> ConciergeResult<Option<FilmFact>>;

    async fn get_film(&self, film_id: i64) -> ConciergeResult<Option<Film>>;

    /// Films ordered by id, optionally restricted to one category name
    async fn list_films(
        &self,
        skip: usize,
        limit: usize,
        category: Option<&str>,
    ) -> ConciergeResult<Vec<Film>>;

    /// Insert a film (and its category if new) and return the stored row
    async fn create_film(&self, film: NewFilm) -> ConciergeResult<Film>;

    /// `Ok(None)` when no film has this id
    async fn update_film(&self, film_id: i64, update: FilmUpdate) -> ConciergeResult<Option<Film>>;

    /// `Ok(false)` when no film has this id
    async fn delete_film(&self, film_id: i64) -> ConciergeResult<bool>;

    /// Categories ordered by id
    async fn list_categories(&self, skip: usize, limit: usize) -> ConciergeResult<Vec<Category>>;

    async fn get_category(&self, category_id: i64) -> ConciergeResult<Option<Category>>;
}

/// A small slice of the Pagila catalog, used by `seed` and by tests.
pub fn sample_films() -> Vec<NewFilm> {
    vec![
        NewFilm::new("ACADEMY DINOSAUR", 0.99)
            .with_category("Documentary")
            .with_rating("PG")
            .with_release_year(2006)
            .with_description("A Epic Drama of a Feminist And a Mad Scientist who must Battle a Teacher in The Canadian Rockies"),
        NewFilm::new("ACE GOLDFINGER", 4.99)
            .with_category("Horror")
            .with_rating("G")
            .with_release_year(2006)
            .with_description("A Astounding Epistle of a Database Administrator And a Explorer who must Find a Car in Ancient China"),
        NewFilm::new("ADAPTATION HOLES", 2.99)
            .with_category("Documentary")
            .with_rating("NC-17")
            .with_release_year(2006),
        NewFilm::new("AFRICAN EGG", 2.99)
            .with_category("Family")
            .with_rating("G")
            .with_release_year(2006)
            .with_description("A Fast-Paced Documentary of a Pastry Chef And a Dentist who must Pursue a Forensic Psychologist in The Gulf of Mexico"),
        NewFilm::new("AGENT TRUMAN", 2.99)
            .with_category("Foreign")
            .with_rating("PG")
            .with_release_year(2006),
        NewFilm::new("AIRPLANE SIERRA", 4.99)
            .with_category("Comedy")
            .with_rating("PG-13")
            .with_release_year(2006),
        NewFilm::new("ALADDIN CALENDAR", 4.99)
            .with_category("Sports")
            .with_rating("NC-17")
            .with_release_year(2006),
        NewFilm::new("ALIEN CENTER", 2.99)
            .with_category("Foreign")
            .with_rating("NC-17")
            .with_release_year(2006)
            .with_description("A Brilliant Drama of a Cat And a Mad Scientist who must Battle a Feminist in A MySQL Convention"),
        NewFilm::new("BEAST HUNCHBACK", 4.99)
            .with_category("Classics")
            .with_rating("R")
            .with_release_year(2006),
        NewFilm::new("CHICAGO NORTH", 4.99)
            .with_category("Games")
            .with_rating("PG-13")
            .with_release_year(2006),
    ]
}
