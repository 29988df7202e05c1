use crate::agents::{AgentAnswer, FilmSummary};
use crate::catalog::{Category, Film, FilmUpdate, NewFilm, NewRental, Rental, RentalUpdate};
use crate::error::ConciergeResult;
use tokio::sync::{mpsc, oneshot};

pub type Reply<T> = oneshot::Sender<ConciergeResult<T>>;

#[derive(Debug)]
pub struct RouteRequest {
    pub question: String,
    pub response: oneshot::Sender<AgentAnswer>,
}

#[derive(Debug)]
pub struct AskRequest {
    pub question: String,
    pub response: oneshot::Sender<mpsc::Receiver<String>>,
}

#[derive(Debug)]
pub struct SummaryRequest {
    pub film_id: i64,
    pub response: Reply<FilmSummary>,
}

/// Plain catalog and rental operations, each bounded by the collaborator timeout
#[derive(Debug)]
pub enum CatalogRequest {
    GetFilm {
        film_id: i64,
        response: Reply<Option<Film>>,
    },
    ListFilms {
        skip: usize,
        limit: usize,
        category: Option<String>,
        response: Reply<Vec<Film>>,
    },
    CreateFilm {
        film: NewFilm,
        response: Reply<Film>,
    },
    UpdateFilm {
        film_id: i64,
        update: FilmUpdate,
        response: Reply<Option<Film>>,
    },
    DeleteFilm {
        film_id: i64,
        response: Reply<bool>,
    },
    ListCategories {
        skip: usize,
        limit: usize,
        response: Reply<Vec<Category>>,
    },
    GetCategory {
        category_id: i64,
        response: Reply<Option<Category>>,
    },
    CreateRental {
        rental: NewRental,
        response: Reply<Rental>,
    },
    GetRental {
        rental_id: i64,
        response: Reply<Option<Rental>>,
    },
    ListRentals {
        skip: usize,
        limit: usize,
        customer_id: Option<i64>,
        response: Reply<Vec<Rental>>,
    },
    UpdateRental {
        rental_id: i64,
        update: RentalUpdate,
        response: Reply<Option<Rental>>,
    },
    DeleteRental {
        rental_id: i64,
        response: Reply<bool>,
    },
}

#[derive(Debug)]
pub enum ConciergeMessage {
    Route(RouteRequest),
    Ask(AskRequest),
    Summary(SummaryRequest),
    Catalog(CatalogRequest),
    Shutdown,
}
