//! Concierge Actor - owns the orchestrator and serves requests from the API facade
//!
//! Information Hiding:
//! - Orchestrator, summary service, catalog and rental store live inside the actor task
//! - Each request runs on its own task, so a slow question never blocks the mailbox
//! - A panicking handler is reported as an apology instead of a dropped reply

use crate::actors::messages::*;
use crate::agents::{AgentAnswer, FilmSummaryService, Orchestrator, ERROR_APOLOGY};
use crate::catalog::{FilmCatalog, RentalStore};
use crate::config::Settings;
use crate::core::TextGenerator;
use crate::error::bounded;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::oneshot;

#[derive(Clone)]
pub struct ConciergeHandle {
    sender: Sender<ConciergeMessage>,
}

struct Concierge {
    orchestrator: Orchestrator,
    summaries: FilmSummaryService,
    catalog: Arc<dyn FilmCatalog>,
    rentals: Arc<dyn RentalStore>,
    timeout: Duration,
}

impl ConciergeHandle {
    pub fn new(
        settings: Settings,
        catalog: Arc<dyn FilmCatalog>,
        rentals: Arc<dyn RentalStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        // tokio panics on a zero-capacity channel
        let (sender, receiver) = channel(settings.system.channel_buffer_size.max(1));

        let timeout = settings.collaborator_timeout();
        let concierge = Concierge {
            orchestrator: Orchestrator::from_settings(
                &settings,
                Arc::clone(&catalog),
                Arc::clone(&generator),
            ),
            summaries: FilmSummaryService::new(Arc::clone(&catalog), generator, timeout),
            catalog,
            rentals,
            timeout,
        };

        tokio::spawn(concierge_actor(receiver, Arc::new(concierge)));
        Self { sender }
    }

    pub async fn send_message(&self, message: ConciergeMessage) -> Result<()> {
        self.sender
            .send(message)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send message to Concierge actor: {}", e))
    }

    pub async fn route(&self, question: impl Into<String>) -> Result<AgentAnswer> {
        let (response, rx) = oneshot::channel();
        self.send_message(ConciergeMessage::Route(RouteRequest {
            question: question.into(),
            response,
        }))
        .await?;
        rx.await
            .map_err(|e| anyhow::anyhow!("Concierge dropped route reply: {}", e))
    }

    pub async fn ask_stream(&self, question: impl Into<String>) -> Result<Receiver<String>> {
        let (response, rx) = oneshot::channel();
        self.send_message(ConciergeMessage::Ask(AskRequest {
            question: question.into(),
            response,
        }))
        .await?;
        rx.await
            .map_err(|e| anyhow::anyhow!("Concierge dropped stream reply: {}", e))
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send_message(ConciergeMessage::Shutdown).await
    }
}

async fn concierge_actor(mut receiver: Receiver<ConciergeMessage>, concierge: Arc<Concierge>) {
    tracing::info!("[Concierge] Actor started");

    while let Some(message) = receiver.recv().await {
        match message {
            ConciergeMessage::Shutdown => {
                tracing::info!("[Concierge] Received shutdown signal");
                break;
            }
            message => {
                tokio::spawn(handle_message(message, Arc::clone(&concierge)));
            }
        }
    }

    tracing::info!("[Concierge] Actor stopped");
}

async fn handle_message(message: ConciergeMessage, concierge: Arc<Concierge>) {
    match message {
        ConciergeMessage::Route(request) => {
            let question = request.question;
            let worker = Arc::clone(&concierge);
            let answer = match tokio::spawn(async move { worker.orchestrator.route(&question).await })
                .await
            {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::error!("[Concierge] Route task failed: {}", e);
                    AgentAnswer::general(ERROR_APOLOGY)
                }
            };
            let _ = request.response.send(answer);
        }
        ConciergeMessage::Ask(request) => {
            let rx = concierge.orchestrator.ask_stream(&request.question).await;
            let _ = request.response.send(rx);
        }
        ConciergeMessage::Summary(request) => {
            let result = concierge.summaries.summarize(request.film_id).await;
            let _ = request.response.send(result);
        }
        ConciergeMessage::Catalog(request) => handle_catalog(request, &concierge).await,
        ConciergeMessage::Shutdown => {}
    }
}

async fn handle_catalog(request: CatalogRequest, concierge: &Concierge) {
    let limit = concierge.timeout;
    let catalog = &concierge.catalog;
    let rentals = &concierge.rentals;

    match request {
        CatalogRequest::GetFilm { film_id, response } => {
            let _ = response.send(bounded("film lookup", limit, catalog.get_film(film_id)).await);
        }
        CatalogRequest::ListFilms {
            skip,
            limit: count,
            category,
            response,
        } => {
            let result = bounded(
                "film listing",
                limit,
                catalog.list_films(skip, count, category.as_deref()),
            )
            .await;
            let _ = response.send(result);
        }
        CatalogRequest::CreateFilm { film, response } => {
            let _ = response.send(bounded("film insert", limit, catalog.create_film(film)).await);
        }
        CatalogRequest::UpdateFilm {
            film_id,
            update,
            response,
        } => {
            let result = bounded("film update", limit, catalog.update_film(film_id, update)).await;
            let _ = response.send(result);
        }
        CatalogRequest::DeleteFilm { film_id, response } => {
            let _ = response.send(bounded("film delete", limit, catalog.delete_film(film_id)).await);
        }
        CatalogRequest::ListCategories {
            skip,
            limit: count,
            response,
        } => {
            let result = bounded("category listing", limit, catalog.list_categories(skip, count)).await;
            let _ = response.send(result);
        }
        CatalogRequest::GetCategory {
            category_id,
            response,
        } => {
            let result = bounded("category lookup", limit, catalog.get_category(category_id)).await;
            let _ = response.send(result);
        }
        CatalogRequest::CreateRental { rental, response } => {
            let _ = response.send(bounded("rental insert", limit, rentals.create_rental(rental)).await);
        }
        CatalogRequest::GetRental {
            rental_id,
            response,
        } => {
            let _ = response.send(bounded("rental lookup", limit, rentals.get_rental(rental_id)).await);
        }
        CatalogRequest::ListRentals {
            skip,
            limit: count,
            customer_id,
            response,
        } => {
            let result = bounded(
                "rental listing",
                limit,
                rentals.list_rentals(skip, count, customer_id),
            )
            .await;
            let _ = response.send(result);
        }
        CatalogRequest::UpdateRental {
            rental_id,
            update,
            response,
        } => {
            let result = bounded("rental update", limit, rentals.update_rental(rental_id, update)).await;
            let _ = response.send(result);
        }
        CatalogRequest::DeleteRental {
            rental_id,
            response,
        } => {
            let result = bounded("rental delete", limit, rentals.delete_rental(rental_id)).await;
            let _ = response.send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentName;
    use crate::catalog::sqlite::SqliteCatalog;
    use crate::catalog::{sample_films, FilmUpdate, NewRental, RentalUpdate};
    use crate::error::ConciergeError;
    use crate::testing::ScriptedGenerator;

    fn offline_settings() -> Settings {
        let mut settings = Settings::default();
        settings.routing.use_classifier = false;
        settings
    }

    async fn handle_with(settings: Settings, generator: Arc<ScriptedGenerator>) -> ConciergeHandle {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        for film in sample_films() {
            catalog.insert_film(film).await.unwrap();
        }
        ConciergeHandle::new(
            settings,
            Arc::new(catalog.clone()),
            Arc::new(catalog),
            generator,
        )
    }

    async fn handle(generator: Arc<ScriptedGenerator>) -> ConciergeHandle {
        handle_with(offline_settings(), generator).await
    }

    async fn ask<T>(handle: &ConciergeHandle, build: impl FnOnce(Reply<T>) -> CatalogRequest) -> T {
        let (response, rx) = oneshot::channel();
        handle
            .send_message(ConciergeMessage::Catalog(build(response)))
            .await
            .unwrap();
        rx.await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_route_through_actor() {
        let handle = handle(ScriptedGenerator::new(vec![])).await;
        let answer = handle
            .route("What is the rental rate for Academy Dinosaur?")
            .await
            .unwrap();
        assert_eq!(answer.agent, AgentName::FilmHandler);
        assert_eq!(answer.answer, "ACADEMY DINOSAUR rents for $0.99.");
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_catalog_requests() {
        let handle = handle(ScriptedGenerator::new(vec![])).await;

        let film = ask(&handle, |response| CatalogRequest::GetFilm { film_id: 1, response })
            .await
            .unwrap();
        assert_eq!(film.id, 1);

        let page = ask(&handle, |response| CatalogRequest::ListFilms {
            skip: 0,
            limit: 3,
            category: None,
            response,
        })
        .await;
        assert_eq!(page.len(), 3);

        let updated = ask(&handle, |response| CatalogRequest::UpdateFilm {
            film_id: 1,
            update: FilmUpdate {
                rental_rate: Some(1.49),
                ..Default::default()
            },
            response,
        })
        .await
        .unwrap();
        assert_eq!(updated.rental_rate, 1.49);

        assert!(ask(&handle, |response| CatalogRequest::DeleteFilm { film_id: 1, response }).await);

        let categories = ask(&handle, |response| CatalogRequest::ListCategories {
            skip: 0,
            limit: 100,
            response,
        })
        .await;
        assert_eq!(categories.len(), 8);
        let games = ask(&handle, |response| CatalogRequest::GetCategory {
            category_id: 8,
            response,
        })
        .await
        .unwrap();
        assert_eq!(games.name, "Games");
    }

    #[tokio::test]
    async fn test_rental_requests() {
        let handle = handle(ScriptedGenerator::new(vec![])).await;

        let rental = ask(&handle, |response| CatalogRequest::CreateRental {
            rental: NewRental::new(1, 42, 1),
            response,
        })
        .await;
        let returned = ask(&handle, |response| CatalogRequest::UpdateRental {
            rental_id: rental.id,
            update: RentalUpdate::returned_at("2022-06-01 12:00:00"),
            response,
        })
        .await
        .unwrap();
        assert_eq!(returned.return_date.as_deref(), Some("2022-06-01 12:00:00"));

        let mine = ask(&handle, |response| CatalogRequest::ListRentals {
            skip: 0,
            limit: 10,
            customer_id: Some(42),
            response,
        })
        .await;
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_buffer_size_is_clamped() {
        let mut settings = offline_settings();
        settings.system.channel_buffer_size = 0;
        let handle = handle_with(settings, ScriptedGenerator::new(vec![])).await;
        let answer = handle
            .route("What category is Alien Center in?")
            .await
            .unwrap();
        assert_eq!(answer.answer, "ALIEN CENTER is in the Foreign category.");
    }

    #[tokio::test]
    async fn test_summary_for_unknown_film() {
        let handle = handle(ScriptedGenerator::new(vec![])).await;
        let (response, rx) = oneshot::channel();
        handle
            .send_message(ConciergeMessage::Summary(SummaryRequest {
                film_id: 9999,
                response,
            }))
            .await
            .unwrap();
        assert!(matches!(rx.await.unwrap(), Err(ConciergeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_requests_after_shutdown_fail() {
        let handle = handle(ScriptedGenerator::new(vec![])).await;
        handle.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.route("anything").await.is_err());
    }
}
