use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "film-concierge")]
#[command(author, version, about = "Answer questions about a film rental catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route a question to the film or general handler
    Route { question: String },

    /// Stream a general answer without routing
    Ask { question: String },

    /// Ask the model for a structured verdict on a film
    Summary { film_id: i64 },

    /// List films from the catalog
    Films {
        /// Only films in this category (e.g. "Horror")
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one film record
    Film { film_id: i64 },

    /// Add a film to the catalog
    AddFilm {
        title: String,

        #[arg(long, default_value = "4.99")]
        rate: f64,

        #[arg(short, long)]
        category: Option<String>,

        /// G, PG, PG-13, R or NC-17
        #[arg(short, long)]
        rating: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change some fields of a film
    UpdateFilm {
        film_id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        rate: Option<f64>,

        #[arg(short, long)]
        rating: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,

        /// Running time in minutes
        #[arg(long)]
        length: Option<i32>,

        /// Rental duration in days
        #[arg(long)]
        duration: Option<i32>,

        #[arg(long)]
        replacement_cost: Option<f64>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Remove a film and its category links
    DeleteFilm { film_id: i64 },

    /// List categories
    Categories {
        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(short, long, default_value = "100")]
        limit: usize,
    },

    /// Show one category
    Category { category_id: i64 },

    /// List rentals, newest first when filtered by customer
    Rentals {
        #[arg(short, long)]
        customer: Option<i64>,

        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one rental
    Rental { rental_id: i64 },

    /// Open a rental for a customer
    Rent {
        customer_id: i64,
        inventory_id: i64,

        #[arg(long, default_value = "1")]
        staff_id: i64,
    },

    /// Record a rental as returned
    ReturnRental {
        rental_id: i64,

        /// Any timestamp SQLite understands
        #[arg(long, default_value = "now")]
        date: String,
    },

    /// Remove a rental record
    DeleteRental { rental_id: i64 },

    /// Load a small sample catalog into an empty database
    Seed,

    /// Ask routed questions in a loop
    Interactive {
        /// Stream general answers instead of routing
        #[arg(short, long)]
        stream: bool,
    },
}
