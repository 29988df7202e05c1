//! Simple async API facade
//!
//! Thin functions over the concierge actor held by the global `System`.
//! Call [`crate::init`] (or [`crate::init_with`]) first.

use crate::actors::messages::*;
use crate::agents::{AgentAnswer, FilmSummary};
use crate::catalog::{Category, Film, FilmUpdate, NewFilm, NewRental, Rental, RentalUpdate};
use crate::System;
use anyhow::Result;
use tokio::sync::oneshot;

/// Route a question to the film handler or the general handler
///
/// # Example
/// ```no_run
/// use film_concierge::{init, route};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     init().await?;
///     let answer = route("What is the rental rate for Alien Center?").await?;
///     println!("{}: {}", answer.agent, answer.answer);
///     Ok(())
/// }
/// ```
pub async fn route(question: impl Into<String>) -> Result<AgentAnswer> {
    System::global()?.concierge.route(question).await
}

/// Stream a general answer chunk by chunk, without routing.
/// Returns the concatenated text once the stream ends.
pub async fn ask_stream(
    question: impl Into<String>,
    mut callback: impl FnMut(String),
) -> Result<String> {
    let mut stream_rx = System::global()?.concierge.ask_stream(question).await?;

    let mut full_response = String::new();
    while let Some(chunk) = stream_rx.recv().await {
        full_response.push_str(&chunk);
        callback(chunk);
    }
    Ok(full_response)
}

/// Structured `{title, rating, recommended}` verdict for a film id
pub async fn film_summary(film_id: i64) -> Result<FilmSummary> {
    let (tx, rx) = oneshot::channel();
    System::global()?
        .concierge
        .send_message(ConciergeMessage::Summary(SummaryRequest {
            film_id,
            response: tx,
        }))
        .await?;

    Ok(rx.await??)
}

async fn catalog_request<T>(build: impl FnOnce(Reply<T>) -> CatalogRequest) -> Result<T> {
    let (tx, rx) = oneshot::channel();
    System::global()?
        .concierge
        .send_message(ConciergeMessage::Catalog(build(tx)))
        .await?;

    Ok(rx.await??)
}

/// Full catalog record for a film id, `None` if it does not exist
pub async fn film(film_id: i64) -> Result<Option<Film>> {
    catalog_request(|response| CatalogRequest::GetFilm { film_id, response }).await
}

/// Page through the catalog, optionally within one category
pub async fn films(skip: usize, limit: usize, category: Option<String>) -> Result<Vec<Film>> {
    catalog_request(|response| CatalogRequest::ListFilms {
        skip,
        limit,
        category,
        response,
    })
    .await
}

pub async fn create_film(film: NewFilm) -> Result<Film> {
    catalog_request(|response| CatalogRequest::CreateFilm { film, response }).await
}

/// Apply a partial update; `None` if the film does not exist
pub async fn update_film(film_id: i64, update: FilmUpdate) -> Result<Option<Film>> {
    catalog_request(|response| CatalogRequest::UpdateFilm {
        film_id,
        update,
        response,
    })
    .await
}

/// `false` if there was nothing to delete
pub async fn delete_film(film_id: i64) -> Result<bool> {
    catalog_request(|response| CatalogRequest::DeleteFilm { film_id, response }).await
}

pub async fn categories(skip: usize, limit: usize) -> Result<Vec<Category>> {
    catalog_request(|response| CatalogRequest::ListCategories {
        skip,
        limit,
        response,
    })
    .await
}

pub async fn category(category_id: i64) -> Result<Option<Category>> {
    catalog_request(|response| CatalogRequest::GetCategory {
        category_id,
        response,
    })
    .await
}

pub async fn create_rental(rental: NewRental) -> Result<Rental> {
    catalog_request(|response| CatalogRequest::CreateRental { rental, response }).await
}

/// Open a rental for `customer_id` dated now
pub async fn create_customer_rental(
    customer_id: i64,
    inventory_id: i64,
    staff_id: i64,
) -> Result<Rental> {
    create_rental(NewRental::new(inventory_id, customer_id, staff_id)).await
}

pub async fn rental(rental_id: i64) -> Result<Option<Rental>> {
    catalog_request(|response| CatalogRequest::GetRental {
        rental_id,
        response,
    })
    .await
}

/// All rentals, oldest first
pub async fn rentals(skip: usize, limit: usize) -> Result<Vec<Rental>> {
    list_rentals(skip, limit, None).await
}

/// One customer's rentals, newest first
pub async fn customer_rentals(customer_id: i64, skip: usize, limit: usize) -> Result<Vec<Rental>> {
    list_rentals(skip, limit, Some(customer_id)).await
}

async fn list_rentals(skip: usize, limit: usize, customer_id: Option<i64>) -> Result<Vec<Rental>> {
    catalog_request(|response| CatalogRequest::ListRentals {
        skip,
        limit,
        customer_id,
        response,
    })
    .await
}

pub async fn update_rental(rental_id: i64, update: RentalUpdate) -> Result<Option<Rental>> {
    catalog_request(|response| CatalogRequest::UpdateRental {
        rental_id,
        update,
        response,
    })
    .await
}

/// Mark a rental returned. `return_date` takes anything SQLite's
/// `datetime()` understands, including `"now"`.
pub async fn return_rental(
    rental_id: i64,
    return_date: impl Into<String>,
) -> Result<Option<Rental>> {
    update_rental(rental_id, RentalUpdate::returned_at(return_date)).await
}

pub async fn delete_rental(rental_id: i64) -> Result<bool> {
    catalog_request(|response| CatalogRequest::DeleteRental {
        rental_id,
        response,
    })
    .await
}
