use crate::availability::available;
use crate::catalog::CatalogSearch;
use crate::config::{Credentials, Settings};
use crate::error::AppError;
use crate::library::{Library, LibraryKind};
use crate::models::{Movie, MovieId};
use crate::storage::{FileStore, KeyValueStore};
use crate::tmdb::{TmdbApi, TmdbClient};
use rand::Rng;
use std::ops::Range;
use std::sync::Arc;
use tracing::{info, warn};

// Quoted in the rent confirmation; nothing is charged.
const PRICE_RANGE: Range<f64> = 2.99..9.99;

pub fn rental_price() -> f64 {
    let raw = rand::rng().random_range(PRICE_RANGE);
    (raw * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Rent,
    WatchNow,
    Watched,
}

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub catalog: Arc<CatalogSearch>,
    pub rented: Arc<Library>,
    pub watched: Arc<Library>,
}

impl AppState {
    pub async fn new(tmdb: Arc<dyn TmdbApi>, store: Arc<dyn KeyValueStore>) -> Self {
        let (rented, watched) = tokio::join!(
            Library::load(LibraryKind::Rented, store.clone()),
            Library::load(LibraryKind::Watched, store),
        );
        Self {
            catalog: Arc::new(CatalogSearch::new(tmdb.clone())),
            tmdb,
            rented: Arc::new(rented),
            watched: Arc::new(watched),
        }
    }

    pub async fn bootstrap(settings: &Settings) -> Result<Self, AppError> {
        let credentials = Credentials::new(Arc::new(
            FileStore::open(settings.credentials_dir()).map_err(AppError::Storage)?,
        ));
        let api_key = settings.resolve_api_key(&credentials).await?;
        let tmdb: Arc<dyn TmdbApi> = Arc::new(
            TmdbClient::new(&settings.tmdb_base_url, &api_key)
                .map_err(|e| AppError::Config(format!("{:#}", e)))?,
        );
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open(settings.library_dir()).map_err(AppError::Storage)?);
        info!("Library data in {}", settings.library_dir().display());
        Ok(Self::new(tmdb, store).await)
    }

    pub fn available(&self) -> Vec<Movie> {
        available(
            &self.catalog.results(),
            &self.rented.movies(),
            &self.watched.movies(),
        )
    }

    pub fn affordance(&self, id: MovieId) -> Affordance {
        if self.rented.contains(id) {
            Affordance::WatchNow
        } else if self.watched.contains(id) {
            Affordance::Watched
        } else {
            Affordance::Rent
        }
    }

    pub async fn rent(&self, movie: Movie) -> bool {
        self.rented.add(movie).await
    }

    pub async fn rent_by_id(&self, id: MovieId) -> Result<Movie, AppError> {
        let movie = match self.catalog.find(id) {
            Some(movie) => movie,
            None => self.tmdb.fetch_movie(id).await.map_err(AppError::Network)?,
        };
        if !self.rent(movie.clone()).await {
            info!(movie_id = %id, "'{}' is already rented", movie.title);
        }
        Ok(movie)
    }

    pub async fn finish_watching(&self, id: MovieId) -> Result<Movie, AppError> {
        let movie = self.rented.find(id).ok_or(AppError::NotFound(id))?;
        self.watched.add(movie.clone()).await;
        self.rented.remove(id).await;
        info!(movie_id = %id, "Finished watching '{}'", movie.title);
        Ok(movie)
    }

    pub async fn return_rental(&self, id: MovieId) -> Result<(), AppError> {
        if self.rented.remove(id).await {
            Ok(())
        } else {
            Err(AppError::NotFound(id))
        }
    }

    pub async fn forget_watched(&self, id: MovieId) -> Result<(), AppError> {
        if self.watched.remove(id).await {
            Ok(())
        } else {
            Err(AppError::NotFound(id))
        }
    }

    pub async fn trailer(&self, id: MovieId) -> Result<Option<String>, AppError> {
        match self.tmdb.fetch_trailer(id).await {
            Ok(url) => Ok(url),
            Err(e) => {
                warn!(movie_id = %id, "Failed to fetch trailer: {:#}", e);
                Err(AppError::Network(e))
            }
        }
    }
}
