use anyhow::{Context, Result};
use clap::Parser;
use film_concierge::catalog::{sample_films, FilmUpdate, NewFilm};
use film_concierge::catalog::sqlite::SqliteCatalog;
use film_concierge::cli::{Cli, Commands};
use film_concierge::{init, shutdown, utils, Settings};
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new().context("Failed to load settings")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    if let Commands::Seed = cli.command {
        return handle_seed(&settings).await;
    }

    init().await?;

    let result = match cli.command {
        Commands::Route { question } => handle_route(question).await,
        Commands::Ask { question } => handle_ask(question).await,
        Commands::Summary { film_id } => handle_summary(film_id).await,
        Commands::Films {
            category,
            skip,
            limit,
        } => handle_films(category, skip, limit).await,
        Commands::Film { film_id } => handle_film(film_id).await,
        Commands::AddFilm {
            title,
            rate,
            category,
            rating,
            year,
            description,
        } => {
            let mut film = NewFilm::new(title, rate);
            film.category = category;
            film.rating = rating;
            film.release_year = year;
            film.description = description;
            handle_add_film(film).await
        }
        Commands::UpdateFilm {
            film_id,
            title,
            rate,
            rating,
            year,
            length,
            duration,
            replacement_cost,
            description,
        } => {
            let update = FilmUpdate {
                title,
                description,
                release_year: year,
                rental_duration: duration,
                rental_rate: rate,
                length,
                replacement_cost,
                rating,
            };
            handle_update_film(film_id, update).await
        }
        Commands::DeleteFilm { film_id } => handle_delete_film(film_id).await,
        Commands::Categories { skip, limit } => handle_categories(skip, limit).await,
        Commands::Category { category_id } => handle_category(category_id).await,
        Commands::Rentals {
            customer,
            skip,
            limit,
        } => handle_rentals(customer, skip, limit).await,
        Commands::Rental { rental_id } => handle_rental(rental_id).await,
        Commands::Rent {
            customer_id,
            inventory_id,
            staff_id,
        } => handle_rent(customer_id, inventory_id, staff_id).await,
        Commands::ReturnRental { rental_id, date } => handle_return(rental_id, date).await,
        Commands::DeleteRental { rental_id } => handle_delete_rental(rental_id).await,
        Commands::Interactive { stream } => handle_interactive(stream).await,
        Commands::Seed => Ok(()),
    };

    shutdown().await?;

    result
}

async fn handle_route(question: String) -> Result<()> {
    let answer = film_concierge::route(question).await?;
    utils::print_answer(&answer);
    Ok(())
}

async fn handle_ask(question: String) -> Result<()> {
    film_concierge::ask_stream(question, print_chunk).await?;
    println!();
    Ok(())
}

async fn handle_summary(film_id: i64) -> Result<()> {
    utils::print_info("Asking for a verdict...");
    let summary = film_concierge::film_summary(film_id).await?;
    utils::print_summary(&summary);
    Ok(())
}

async fn handle_films(category: Option<String>, skip: usize, limit: usize) -> Result<()> {
    let films = film_concierge::films(skip, limit, category).await?;
    if films.is_empty() {
        utils::print_info("No films found. Run `film-concierge seed` to load a sample catalog.");
        return Ok(());
    }
    for film in &films {
        utils::print_film_row(film);
    }
    Ok(())
}

async fn handle_film(film_id: i64) -> Result<()> {
    match film_concierge::film(film_id).await? {
        Some(film) => utils::print_film(&film),
        None => utils::print_error(&format!("Film {} not found", film_id)),
    }
    Ok(())
}

async fn handle_add_film(film: NewFilm) -> Result<()> {
    let film = film_concierge::create_film(film).await?;
    utils::print_success(&format!("Added film {}", film.id));
    utils::print_film(&film);
    Ok(())
}

async fn handle_update_film(film_id: i64, update: FilmUpdate) -> Result<()> {
    match film_concierge::update_film(film_id, update).await? {
        Some(film) => utils::print_film(&film),
        None => utils::print_error(&format!("Film {} not found", film_id)),
    }
    Ok(())
}

async fn handle_delete_film(film_id: i64) -> Result<()> {
    if film_concierge::delete_film(film_id).await? {
        utils::print_success(&format!("Deleted film {}", film_id));
    } else {
        utils::print_error(&format!("Film {} not found", film_id));
    }
    Ok(())
}

async fn handle_categories(skip: usize, limit: usize) -> Result<()> {
    let categories = film_concierge::categories(skip, limit).await?;
    if categories.is_empty() {
        utils::print_info("No categories found");
    }
    for category in &categories {
        utils::print_category(category);
    }
    Ok(())
}

async fn handle_category(category_id: i64) -> Result<()> {
    match film_concierge::category(category_id).await? {
        Some(category) => utils::print_category(&category),
        None => utils::print_error(&format!("Category {} not found", category_id)),
    }
    Ok(())
}

async fn handle_rentals(customer: Option<i64>, skip: usize, limit: usize) -> Result<()> {
    let rentals = match customer {
        Some(customer_id) => film_concierge::customer_rentals(customer_id, skip, limit).await?,
        None => film_concierge::rentals(skip, limit).await?,
    };
    if rentals.is_empty() {
        utils::print_info("No rentals found");
    }
    for rental in &rentals {
        utils::print_rental(rental);
    }
    Ok(())
}

async fn handle_rental(rental_id: i64) -> Result<()> {
    match film_concierge::rental(rental_id).await? {
        Some(rental) => utils::print_rental(&rental),
        None => utils::print_error(&format!("Rental {} not found", rental_id)),
    }
    Ok(())
}

async fn handle_rent(customer_id: i64, inventory_id: i64, staff_id: i64) -> Result<()> {
    let rental = film_concierge::create_customer_rental(customer_id, inventory_id, staff_id).await?;
    utils::print_success(&format!("Opened rental {}", rental.id));
    utils::print_rental(&rental);
    Ok(())
}

async fn handle_return(rental_id: i64, date: String) -> Result<()> {
    match film_concierge::return_rental(rental_id, date).await? {
        Some(rental) => utils::print_rental(&rental),
        None => utils::print_error(&format!("Rental {} not found", rental_id)),
    }
    Ok(())
}

async fn handle_delete_rental(rental_id: i64) -> Result<()> {
    if film_concierge::delete_rental(rental_id).await? {
        utils::print_success(&format!("Deleted rental {}", rental_id));
    } else {
        utils::print_error(&format!("Rental {} not found", rental_id));
    }
    Ok(())
}

async fn handle_seed(settings: &Settings) -> Result<()> {
    let catalog = SqliteCatalog::open(&settings.catalog.database_path)
        .with_context(|| format!("Failed to open {}", settings.catalog.database_path))?;

    let existing = catalog.film_count().await?;
    if existing > 0 {
        utils::print_info(&format!(
            "Catalog already has {} films, nothing to seed",
            existing
        ));
        return Ok(());
    }

    let films = sample_films();
    let total = films.len();
    for film in films {
        catalog.insert_film(film).await?;
    }
    utils::print_success(&format!(
        "Seeded {} films into {}",
        total, settings.catalog.database_path
    ));
    Ok(())
}

async fn handle_interactive(stream: bool) -> Result<()> {
    utils::print_header("Film Concierge");
    if stream {
        utils::print_info("Streaming mode: answers come straight from the model");
    }
    utils::print_info("Ask about a film, or anything else (Ctrl+C to exit)\n");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("You: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if stream {
            film_concierge::ask_stream(input, print_chunk).await?;
            println!("\n");
        } else {
            let answer = film_concierge::route(input).await?;
            utils::print_answer(&answer);
            println!();
        }
    }

    Ok(())
}

fn print_chunk(chunk: String) {
    print!("{}", chunk);
    let _ = std::io::stdout().flush();
}
