use crate::agents::{AgentAnswer, AgentName, FilmSummary};
use crate::catalog::{Category, Film, Rental};
use colored::*;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.len()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
}

pub fn print_answer(answer: &AgentAnswer) {
    let label = match answer.agent {
        AgentName::FilmHandler => answer.agent.as_str().magenta().bold(),
        AgentName::GeneralHandler => answer.agent.as_str().cyan().bold(),
    };
    println!("[{}] {}", label, answer.answer);
}

pub fn print_film_row(film: &Film) {
    println!(
        "{:>5}  {:<28} {:>6}  {}",
        film.id.to_string().dimmed(),
        film.title,
        film.rating.as_deref().unwrap_or("-"),
        format!("${:.2}", film.rental_rate).green()
    );
}

pub fn print_film(film: &Film) {
    print_header(&film.title);
    println!("{:<18}{}", "Id:", film.id);
    println!(
        "{:<18}{}",
        "Description:",
        film.description.as_deref().unwrap_or("N/A")
    );
    println!(
        "{:<18}{}",
        "Release year:",
        film.release_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("{:<18}{}", "Rating:", film.rating.as_deref().unwrap_or("N/A"));
    println!("{:<18}${:.2}", "Rental rate:", film.rental_rate);
    println!("{:<18}{} days", "Rental duration:", film.rental_duration);
    if let Some(length) = film.length {
        println!("{:<18}{} min", "Length:", length);
    }
    println!("{:<18}${:.2}", "Replacement cost:", film.replacement_cost);
}

pub fn print_summary(summary: &FilmSummary) {
    let verdict = if summary.recommended {
        "recommended".green().bold()
    } else {
        "not recommended".yellow()
    };
    println!("{} ({}): {}", summary.title.bold(), summary.rating, verdict);
}

pub fn print_category(category: &Category) {
    println!("{:>5}  {}", category.id.to_string().dimmed(), category.name);
}

pub fn print_rental(rental: &Rental) {
    let status = match &rental.return_date {
        Some(date) => format!("returned {}", date).green(),
        None => "out".yellow().bold(),
    };
    println!(
        "{:>5}  customer {:<5} inventory {:<5} rented {}  {}",
        rental.id.to_string().dimmed(),
        rental.customer_id,
        rental.inventory_id,
        rental.rental_date,
        status
    );
}
