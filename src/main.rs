use anyhow::Result;
use cinerent::app::{rental_price, Affordance, AppState};
use cinerent::catalog::{is_searchable, MIN_QUERY_LEN};
use cinerent::config::{Credentials, Settings};
use cinerent::models::{Movie, MovieId};
use cinerent::storage::FileStore;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cinerent", version, about = "Browse, rent and track movies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog
    Search { query: Vec<String> },
    /// List popular movies
    Popular,
    /// Search, hiding movies already rented or watched
    Available { query: Vec<String> },
    /// Rent a movie by TMDB id
    Rent { id: MovieId },
    /// List rented movies
    Rented,
    /// List watched movies
    Watched,
    /// Mark a rented movie as watched
    Finish { id: MovieId },
    /// Give a rental back without watching it
    Return { id: MovieId },
    /// Remove a movie from the watched list
    Forget { id: MovieId },
    /// Print the embeddable trailer URL
    Trailer { id: MovieId },
    /// Save a TMDB API key
    Login { api_key: String },
    /// Delete the saved TMDB API key
    Logout,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_movies(state: &AppState, movies: &[Movie]) {
    if movies.is_empty() {
        println!("(no movies)");
        return;
    }
    for m in movies {
        let tag = match state.affordance(m.id) {
            Affordance::Rent => "rent",
            Affordance::WatchNow => "watch now",
            Affordance::Watched => "watched",
        };
        println!(
            "{:>8}  {} ({})  * {:.1}  [{}]",
            m.id,
            m.title,
            m.year().unwrap_or_else(|| "Unknown".to_string()),
            m.vote_average,
            tag
        );
    }
}

async fn run_search(state: &AppState, words: &[String]) {
    let query = words.join(" ");
    if !is_searchable(&query) {
        warn!(
            "Query '{}' is shorter than {} characters, skipping search",
            query, MIN_QUERY_LEN
        );
        return;
    }
    state.catalog.search(&query).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => info!("No .env file loaded ({}) - relying on environment", e),
    }

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match &cli.command {
        Command::Login { api_key } => {
            let credentials = Credentials::new(Arc::new(FileStore::open(settings.credentials_dir())?));
            credentials.save_api_key(api_key).await;
            return Ok(());
        }
        Command::Logout => {
            let credentials = Credentials::new(Arc::new(FileStore::open(settings.credentials_dir())?));
            credentials.delete_api_key().await;
            return Ok(());
        }
        _ => {}
    }

    let state = AppState::bootstrap(&settings).await?;

    match cli.command {
        Command::Search { query } => {
            run_search(&state, &query).await;
            print_movies(&state, &state.catalog.results());
        }
        Command::Popular => {
            state.catalog.popular().await;
            print_movies(&state, &state.catalog.results());
        }
        Command::Available { query } => {
            run_search(&state, &query).await;
            print_movies(&state, &state.available());
        }
        Command::Rent { id } => {
            let movie = state.rent_by_id(id).await?;
            println!("Rented '{}' for ${:.2}", movie.title, rental_price());
        }
        Command::Rented => print_movies(&state, &state.rented.movies()),
        Command::Watched => print_movies(&state, &state.watched.movies()),
        Command::Finish { id } => {
            let movie = state.finish_watching(id).await?;
            println!("Marked '{}' as watched", movie.title);
        }
        Command::Return { id } => {
            state.return_rental(id).await?;
            println!("Returned {}", id);
        }
        Command::Forget { id } => {
            state.forget_watched(id).await?;
            println!("Removed {} from watched", id);
        }
        Command::Trailer { id } => match state.trailer(id).await? {
            Some(url) => println!("{}", url),
            None => println!("No trailer available"),
        },
        Command::Login { .. } | Command::Logout => {}
    }
    Ok(())
}
