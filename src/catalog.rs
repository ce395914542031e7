use crate::models::{Movie, MovieId};
use crate::tmdb::TmdbApi;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const MIN_QUERY_LEN: usize = 3;

pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

// Overlapping requests are not coordinated: the last response to land wins.
pub struct CatalogSearch {
    api: Arc<dyn TmdbApi>,
    results: watch::Sender<Vec<Movie>>,
}

impl CatalogSearch {
    pub fn new(api: Arc<dyn TmdbApi>) -> Self {
        let (results, _) = watch::channel(Vec::new());
        Self { api, results }
    }

    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        match self.api.search_movies(query).await {
            Ok(movies) => {
                info!("Search '{}' returned {} movies", query, movies.len());
                self.results.send_replace(movies);
            }
            Err(e) => warn!("Movie search for '{}' failed: {:#}", query, e),
        }
    }

    pub async fn popular(&self) {
        match self.api.popular_movies().await {
            Ok(movies) => {
                info!("Popular listing returned {} movies", movies.len());
                self.results.send_replace(movies);
            }
            Err(e) => warn!("Popular movies fetch failed: {:#}", e),
        }
    }

    pub fn results(&self) -> Vec<Movie> {
        self.results.borrow().clone()
    }

    pub fn find(&self, id: MovieId) -> Option<Movie> {
        self.results.borrow().iter().find(|m| m.id == id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Movie>> {
        self.results.subscribe()
    }
}

impl std::fmt::Debug for CatalogSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSearch")
            .field("results", &self.results.borrow().len())
            .finish()
    }
}
