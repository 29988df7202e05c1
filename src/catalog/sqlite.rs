//! SQLite Film Catalog
//!
//! Information Hiding:
//! - Pagila-style tables (`film`, `category`, `film_category`, `rental`) hidden from users
//! - Blocking rusqlite calls moved off the async runtime with `spawn_blocking`
//! - LIKE escaping and tie-break ordering encapsulated in the queries

use super::{
    Category, Film, FilmCatalog, FilmFact, FilmUpdate, NewFilm, NewRental, Rental, RentalStore,
    RentalUpdate, UNKNOWN_CATEGORY,
};
use crate::error::{ConciergeError, ConciergeResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS category (
    category_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    last_update TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS film (
    film_id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    release_year INTEGER CHECK (release_year BETWEEN 1901 AND 2155),
    language_id INTEGER NOT NULL DEFAULT 1,
    rental_duration INTEGER NOT NULL DEFAULT 3,
    rental_rate REAL NOT NULL DEFAULT 4.99,
    length INTEGER,
    replacement_cost REAL NOT NULL DEFAULT 19.99,
    rating TEXT CHECK (rating IN ('G', 'PG', 'PG-13', 'R', 'NC-17')),
    last_update TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS film_category (
    film_id INTEGER NOT NULL REFERENCES film(film_id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES category(category_id),
    PRIMARY KEY (film_id, category_id)
);
CREATE TABLE IF NOT EXISTS rental (
    rental_id INTEGER PRIMARY KEY,
    rental_date TEXT NOT NULL,
    inventory_id INTEGER NOT NULL,
    customer_id INTEGER NOT NULL,
    return_date TEXT,
    staff_id INTEGER NOT NULL,
    last_update TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_film_title ON film (title);
CREATE INDEX IF NOT EXISTS idx_rental_customer ON rental (customer_id);
";

const FILM_COLUMNS: &str = "film.film_id, film.title, film.description, film.release_year, \
     film.rental_duration, film.rental_rate, film.length, film.replacement_cost, film.rating";

const RENTAL_COLUMNS: &str =
    "rental_id, inventory_id, customer_id, staff_id, rental_date, return_date, last_update";

/// Catalog backed by a single SQLite connection
#[derive(Clone)]
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> ConciergeResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!("[SqliteCatalog] Opened {:?}", path.as_ref());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> ConciergeResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> ConciergeResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> ConciergeResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ConciergeResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ConciergeError::Catalog("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| ConciergeError::Catalog(format!("catalog task failed: {}", e)))?
    }

    /// Insert a film and link it to its category, creating the category if needed.
    /// All three statements commit together or not at all.
    pub async fn insert_film(&self, film: NewFilm) -> ConciergeResult<i64> {
        film.validate()?;

        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO film (title, description, release_year, rental_duration,
                                   rental_rate, length, replacement_cost, rating)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    film.title,
                    film.description,
                    film.release_year,
                    film.rental_duration,
                    film.rental_rate,
                    film.length,
                    film.replacement_cost,
                    film.rating,
                ],
            )?;
            let film_id = tx.last_insert_rowid();

            if let Some(category) = &film.category {
                tx.execute(
                    "INSERT OR IGNORE INTO category (name) VALUES (?1)",
                    params![category],
                )?;
                tx.execute(
                    "INSERT INTO film_category (film_id, category_id)
                     SELECT ?1, category_id FROM category WHERE name = ?2",
                    params![film_id, category],
                )?;
            }
            tx.commit()?;

            tracing::debug!("[SqliteCatalog] Inserted film {} ({})", film_id, film.title);
            Ok(film_id)
        })
        .await
    }

    pub async fn film_count(&self) -> ConciergeResult<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM film", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }
}

fn select_film(conn: &Connection, film_id: i64) -> ConciergeResult<Option<Film>> {
    let film = conn
        .query_row(
            &format!("SELECT {} FROM film WHERE film_id = ?1", FILM_COLUMNS),
            params![film_id],
            film_from_row,
        )
        .optional()?;
    Ok(film)
}

fn select_rental(conn: &Connection, rental_id: i64) -> ConciergeResult<Option<Rental>> {
    let rental = conn
        .query_row(
            &format!("SELECT {} FROM rental WHERE rental_id = ?1", RENTAL_COLUMNS),
            params![rental_id],
            rental_from_row,
        )
        .optional()?;
    Ok(rental)
}

/// Canonicalize a timestamp through SQLite's `datetime()`; NULL means it did not parse
fn normalize_timestamp(conn: &Connection, value: &str) -> ConciergeResult<String> {
    let normalized: Option<String> =
        conn.query_row("SELECT datetime(?1)", params![value], |row| row.get(0))?;
    normalized.ok_or_else(|| ConciergeError::Parse(format!("invalid timestamp: {}", value)))
}

fn to_sql_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn rental_from_row(row: &Row<'_>) -> rusqlite::Result<Rental> {
    Ok(Rental {
        id: row.get(0)?,
        inventory_id: row.get(1)?,
        customer_id: row.get(2)?,
        staff_id: row.get(3)?,
        rental_date: row.get(4)?,
        return_date: row.get(5)?,
        last_update: row.get(6)?,
    })
}

fn film_from_row(row: &Row<'_>) -> rusqlite::Result<Film> {
    Ok(Film {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        release_year: row.get(3)?,
        rental_duration: row.get(4)?,
        rental_rate: row.get(5)?,
        length: row.get(6)?,
        replacement_cost: row.get(7)?,
        rating: row.get(8)?,
    })
}

/// Escape LIKE wildcards so user text only ever matches literally
fn like_pattern(partial_title: &str) -> String {
    let mut escaped = String::with_capacity(partial_title.len() + 2);
    escaped.push('%');
    for c in partial_title.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl FilmCatalog for SqliteCatalog {
    async fn search_by_title(&self, partial_title: &str) -> ConciergeResult<Option<FilmFact>> {
        let needle = partial_title.to_string();

        let fact = self
            .with_conn(move |conn| {
                let fact = conn
                    .query_row(
                        "SELECT film.title, film.description, film.rental_rate, film.rating,
                                film.release_year, category.name
                         FROM film
                         LEFT JOIN film_category ON film.film_id = film_category.film_id
                         LEFT JOIN category ON film_category.category_id = category.category_id
                         WHERE LOWER(film.title) LIKE LOWER(?1) ESCAPE '\\'
                         ORDER BY (LOWER(film.title) = LOWER(?2)) DESC,
                                  film.film_id,
                                  category.category_id
                         LIMIT 1",
                        params![like_pattern(&needle), needle],
                        |row| {
                            let category: Option<String> = row.get(5)?;
                            Ok(FilmFact {
                                title: row.get(0)?,
                                description: row.get(1)?,
                                rental_rate: row.get(2)?,
                                rating: row.get(3)?,
                                release_year: row.get(4)?,
                                category: category
                                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
                            })
                        },
                    )
                    .optional()?;
                Ok(fact)
            })
            .await?;

        tracing::debug!(
            "[SqliteCatalog] Search '{}' -> {:?}",
            partial_title,
            fact.as_ref().map(|f| &f.title)
        );
        Ok(fact)
    }

    async fn get_film(&self, film_id: i64) -> ConciergeResult<Option<Film>> {
        self.with_conn(move |conn| select_film(conn, film_id)).await
    }

    async fn list_films(
        &self,
        skip: usize,
        limit: usize,
        category: Option<&str>,
    ) -> ConciergeResult<Vec<Film>> {
        let category = category.map(str::to_string);
        let (limit, skip) = (to_sql_i64(limit), to_sql_i64(skip));

        self.with_conn(move |conn| {
            let films = match category {
                Some(name) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT DISTINCT {} FROM film
                         INNER JOIN film_category ON film.film_id = film_category.film_id
                         INNER JOIN category ON film_category.category_id = category.category_id
                         WHERE category.name = ?1
                         ORDER BY film.film_id
                         LIMIT ?2 OFFSET ?3",
                        FILM_COLUMNS
                    ))?;
                    let rows = stmt.query_map(params![name, limit, skip], film_from_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM film ORDER BY film.film_id LIMIT ?1 OFFSET ?2",
                        FILM_COLUMNS
                    ))?;
                    let rows = stmt.query_map(params![limit, skip], film_from_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(films)
        })
        .await
    }

    async fn create_film(&self, film: NewFilm) -> ConciergeResult<Film> {
        let film_id = self.insert_film(film).await?;
        self.get_film(film_id)
            .await?
            .ok_or_else(|| ConciergeError::NotFound(format!("film {}", film_id)))
    }

    async fn update_film(&self, film_id: i64, update: FilmUpdate) -> ConciergeResult<Option<Film>> {
        update.validate()?;
        if update.is_empty() {
            return self.get_film(film_id).await;
        }

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE film SET
                     title = COALESCE(?1, title),
                     description = COALESCE(?2, description),
                     release_year = COALESCE(?3, release_year),
                     rental_duration = COALESCE(?4, rental_duration),
                     rental_rate = COALESCE(?5, rental_rate),
                     length = COALESCE(?6, length),
                     replacement_cost = COALESCE(?7, replacement_cost),
                     rating = COALESCE(?8, rating),
                     last_update = CURRENT_TIMESTAMP
                 WHERE film_id = ?9",
                params![
                    update.title,
                    update.description,
                    update.release_year,
                    update.rental_duration,
                    update.rental_rate,
                    update.length,
                    update.replacement_cost,
                    update.rating,
                    film_id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            tracing::debug!("[SqliteCatalog] Updated film {}", film_id);
            select_film(conn, film_id)
        })
        .await
    }

    async fn delete_film(&self, film_id: i64) -> ConciergeResult<bool> {
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM film WHERE film_id = ?1", params![film_id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_categories(&self, skip: usize, limit: usize) -> ConciergeResult<Vec<Category>> {
        let (limit, skip) = (to_sql_i64(limit), to_sql_i64(skip));

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT category_id, name FROM category ORDER BY category_id LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt.query_map(params![limit, skip], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            let categories = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(categories)
        })
        .await
    }

    async fn get_category(&self, category_id: i64) -> ConciergeResult<Option<Category>> {
        self.with_conn(move |conn| {
            let category = conn
                .query_row(
                    "SELECT category_id, name FROM category WHERE category_id = ?1",
                    params![category_id],
                    |row| {
                        Ok(Category {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(category)
        })
        .await
    }
}

#[async_trait]
impl RentalStore for SqliteCatalog {
    async fn create_rental(&self, rental: NewRental) -> ConciergeResult<Rental> {
        rental.validate()?;

        self.with_conn(move |conn| {
            let rental_date = rental
                .rental_date
                .as_deref()
                .map(|date| normalize_timestamp(conn, date))
                .transpose()?;
            conn.execute(
                "INSERT INTO rental (rental_date, inventory_id, customer_id, staff_id)
                 VALUES (COALESCE(?1, CURRENT_TIMESTAMP), ?2, ?3, ?4)",
                params![
                    rental_date,
                    rental.inventory_id,
                    rental.customer_id,
                    rental.staff_id
                ],
            )?;
            let rental_id = conn.last_insert_rowid();
            tracing::debug!(
                "[SqliteCatalog] Rental {} opened for customer {}",
                rental_id,
                rental.customer_id
            );
            select_rental(conn, rental_id)?
                .ok_or_else(|| ConciergeError::NotFound(format!("rental {}", rental_id)))
        })
        .await
    }

    async fn get_rental(&self, rental_id: i64) -> ConciergeResult<Option<Rental>> {
        self.with_conn(move |conn| select_rental(conn, rental_id)).await
    }

    async fn list_rentals(
        &self,
        skip: usize,
        limit: usize,
        customer_id: Option<i64>,
    ) -> ConciergeResult<Vec<Rental>> {
        let (limit, skip) = (to_sql_i64(limit), to_sql_i64(skip));

        self.with_conn(move |conn| {
            let rentals = match customer_id {
                Some(customer_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM rental WHERE customer_id = ?1
                         ORDER BY rental_id DESC LIMIT ?2 OFFSET ?3",
                        RENTAL_COLUMNS
                    ))?;
                    let rows = stmt.query_map(params![customer_id, limit, skip], rental_from_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM rental ORDER BY rental_id LIMIT ?1 OFFSET ?2",
                        RENTAL_COLUMNS
                    ))?;
                    let rows = stmt.query_map(params![limit, skip], rental_from_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(rentals)
        })
        .await
    }

    async fn update_rental(
        &self,
        rental_id: i64,
        update: RentalUpdate,
    ) -> ConciergeResult<Option<Rental>> {
        let Some(return_date) = update.return_date else {
            return self.get_rental(rental_id).await;
        };

        self.with_conn(move |conn| {
            let return_date = normalize_timestamp(conn, &return_date)?;
            let changed = conn.execute(
                "UPDATE rental SET return_date = ?1, last_update = CURRENT_TIMESTAMP
                 WHERE rental_id = ?2",
                params![return_date, rental_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            tracing::debug!("[SqliteCatalog] Rental {} returned", rental_id);
            select_rental(conn, rental_id)
        })
        .await
    }

    async fn delete_rental(&self, rental_id: i64) -> ConciergeResult<bool> {
        self.with_conn(move |conn| {
            let deleted =
                conn.execute("DELETE FROM rental WHERE rental_id = ?1", params![rental_id])?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_films;

    async fn seeded() -> SqliteCatalog {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        for film in sample_films() {
            catalog.insert_film(film).await.unwrap();
        }
        catalog
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_search_joins_category() {
        let catalog = seeded().await;
        let fact = catalog.search_by_title("alien").await.unwrap().unwrap();
        assert_eq!(fact.title, "ALIEN CENTER");
        assert_eq!(fact.category, "Foreign");
        assert_eq!(fact.rental_rate, 2.99);
        assert_eq!(fact.rating.as_deref(), Some("NC-17"));
    }

    #[tokio::test]
    async fn test_search_prefers_exact_title() {
        let catalog = seeded().await;
        catalog
            .insert_film(NewFilm::new("Alien", 1.99).with_category("Horror"))
            .await
            .unwrap();

        let fact = catalog.search_by_title("ALIEN").await.unwrap().unwrap();
        assert_eq!(fact.title, "Alien");
        assert_eq!(fact.category, "Horror");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let catalog = seeded().await;
        assert!(catalog.search_by_title("%").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_film_without_category() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.insert_film(NewFilm::new("Orphan", 0.99)).await.unwrap();
        let fact = catalog.search_by_title("orphan").await.unwrap().unwrap();
        assert_eq!(fact.category, UNKNOWN_CATEGORY);
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let catalog = seeded().await;
        assert_eq!(catalog.film_count().await.unwrap(), 10);

        let horror = catalog.list_films(0, 100, Some("Horror")).await.unwrap();
        assert_eq!(horror.len(), 1);
        assert_eq!(horror[0].title, "ACE GOLDFINGER");

        let page = catalog.list_films(2, 3, None).await.unwrap();
        assert_eq!(page.iter().map(|f| f.id).collect::<Vec<_>>(), vec![3, 4, 5]);

        let film = catalog.get_film(1).await.unwrap().unwrap();
        assert_eq!(film.title, "ACADEMY DINOSAUR");
        assert_eq!(film.release_year, Some(2006));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let catalog = seeded().await;
        assert!(catalog.delete_film(1).await.unwrap());
        assert!(!catalog.delete_film(1).await.unwrap());
        assert!(catalog.get_film(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_is_atomic() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .with_conn(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER block_link BEFORE INSERT ON film_category
                     BEGIN SELECT RAISE(ABORT, 'link blocked'); END;",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let result = catalog
            .insert_film(NewFilm::new("Half Written", 1.99).with_category("Drama"))
            .await;
        assert!(matches!(result, Err(ConciergeError::Catalog(msg)) if msg.contains("link blocked")));
        assert_eq!(catalog.film_count().await.unwrap(), 0);
        assert!(catalog.list_categories(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_update_film() {
        let catalog = seeded().await;
        let created = catalog
            .create_film(NewFilm::new("Zorro Ark", 4.99).with_category("Comedy"))
            .await
            .unwrap();
        assert_eq!(created.id, 11);
        assert_eq!(created.rental_duration, 3);

        let updated = catalog
            .update_film(
                created.id,
                FilmUpdate {
                    rental_rate: Some(0.99),
                    rating: Some("PG".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.rental_rate, 0.99);
        assert_eq!(updated.rating.as_deref(), Some("PG"));
        assert_eq!(updated.title, "Zorro Ark");

        let unchanged = catalog
            .update_film(1, FilmUpdate::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.title, "ACADEMY DINOSAUR");

        assert!(catalog
            .update_film(404, FilmUpdate { length: Some(90), ..Default::default() })
            .await
            .unwrap()
            .is_none());
        assert!(catalog
            .update_film(1, FilmUpdate { rental_rate: Some(0.0), ..Default::default() })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_categories() {
        let catalog = seeded().await;
        let categories = catalog.list_categories(0, 100).await.unwrap();
        assert_eq!(categories[0].id, 1);
        assert_eq!(categories[0].name, "Documentary");
        assert!(categories.windows(2).all(|w| w[0].id < w[1].id));

        let first = catalog.get_category(1).await.unwrap().unwrap();
        assert_eq!(first, categories[0]);
        assert!(catalog.get_category(999).await.unwrap().is_none());
        assert_eq!(catalog.list_categories(1, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rental_lifecycle() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let rental = catalog
            .create_rental(NewRental::new(367, 130, 1).with_rental_date("2022-05-24T22:53:30"))
            .await
            .unwrap();
        assert_eq!(rental.rental_date, "2022-05-24 22:53:30");
        assert!(rental.return_date.is_none());

        let unchanged = catalog
            .update_rental(rental.id, RentalUpdate::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged, rental);

        let returned = catalog
            .update_rental(rental.id, RentalUpdate::returned_at("2022-05-26 22:04:30"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(returned.return_date.as_deref(), Some("2022-05-26 22:04:30"));

        assert!(catalog
            .update_rental(999, RentalUpdate::returned_at("2022-05-26"))
            .await
            .unwrap()
            .is_none());
        assert!(catalog.delete_rental(rental.id).await.unwrap());
        assert!(catalog.get_rental(rental.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rental_defaults_and_validation() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let rental = catalog.create_rental(NewRental::new(1, 2, 1)).await.unwrap();
        assert_eq!(rental.rental_date.len(), "2022-05-24 22:53:30".len());

        let bad_date = catalog
            .create_rental(NewRental::new(1, 2, 1).with_rental_date("next tuesday"))
            .await;
        assert!(matches!(bad_date, Err(ConciergeError::Parse(_))));
        assert!(catalog.create_rental(NewRental::new(1, 0, 1)).await.is_err());
        assert_eq!(catalog.list_rentals(0, 10, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rentals_by_customer_newest_first() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        for (inventory_id, customer_id) in [(10, 5), (11, 6), (12, 5)] {
            catalog
                .create_rental(NewRental::new(inventory_id, customer_id, 1))
                .await
                .unwrap();
        }

        let all = catalog.list_rentals(0, 10, None).await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let mine = catalog.list_rentals(0, 10, Some(5)).await.unwrap();
        assert_eq!(mine.iter().map(|r| r.inventory_id).collect::<Vec<_>>(), vec![12, 10]);
        assert!(catalog.list_rentals(0, 10, Some(99)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_rating() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let result = catalog
            .insert_film(NewFilm::new("Bad", 1.0).with_rating("X"))
            .await;
        assert!(result.is_err());
    }
}
