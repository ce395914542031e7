use crate::models::{validate_records, Movie, MovieId};
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Rented,
    Watched,
}

impl LibraryKind {
    pub fn storage_key(&self) -> &'static str {
        match self {
            LibraryKind::Rented => "rentedMovies",
            LibraryKind::Watched => "watchedMovies",
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            LibraryKind::Rented => "rented",
            LibraryKind::Watched => "watched",
        }
    }
}

pub struct Library {
    kind: LibraryKind,
    store: Arc<dyn KeyValueStore>,
    // Held across mutate + persist so snapshot writes never interleave.
    movies: Mutex<Vec<Movie>>,
    updates: watch::Sender<Vec<Movie>>,
}

impl Library {
    pub async fn load(kind: LibraryKind, store: Arc<dyn KeyValueStore>) -> Self {
        let movies = match read_snapshot(store.as_ref(), kind).await {
            Ok(movies) => {
                info!(
                    library = kind.event_name(),
                    "Loaded {} movies",
                    movies.len()
                );
                movies
            }
            Err(e) => {
                warn!(
                    library = kind.event_name(),
                    "Failed to load library, starting empty: {:#}", e
                );
                Vec::new()
            }
        };
        let (updates, _) = watch::channel(movies.clone());
        Self {
            kind,
            store,
            movies: Mutex::new(movies),
            updates,
        }
    }

    pub fn kind(&self) -> LibraryKind {
        self.kind
    }

    pub async fn add(&self, movie: Movie) -> bool {
        let mut movies = self.movies.lock().await;
        if movies.iter().any(|m| m.id == movie.id) {
            debug!(
                library = self.kind.event_name(),
                movie_id = %movie.id,
                "Already present, ignoring"
            );
            return false;
        }
        info!(
            library = self.kind.event_name(),
            movie_id = %movie.id,
            "Adding '{}'",
            movie.title
        );
        movies.push(movie);
        self.commit(&movies).await;
        true
    }

    pub async fn remove(&self, id: MovieId) -> bool {
        let mut movies = self.movies.lock().await;
        let before = movies.len();
        movies.retain(|m| m.id != id);
        if movies.len() == before {
            debug!(
                library = self.kind.event_name(),
                movie_id = %id,
                "Nothing to remove"
            );
            return false;
        }
        info!(library = self.kind.event_name(), movie_id = %id, "Removed");
        self.commit(&movies).await;
        true
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.updates.borrow().iter().any(|m| m.id == id)
    }

    pub fn find(&self, id: MovieId) -> Option<Movie> {
        self.updates.borrow().iter().find(|m| m.id == id).cloned()
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.updates.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Movie>> {
        self.updates.subscribe()
    }

    // The in-memory sequence stays authoritative even when the write fails.
    async fn commit(&self, movies: &[Movie]) {
        if let Err(e) = write_snapshot(self.store.as_ref(), self.kind, movies).await {
            error!(
                library = self.kind.event_name(),
                "Failed to persist library: {:#}", e
            );
        }
        self.updates.send_replace(movies.to_vec());
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

async fn read_snapshot(store: &dyn KeyValueStore, kind: LibraryKind) -> Result<Vec<Movie>> {
    let Some(raw) = store.get(kind.storage_key()).await? else {
        return Ok(Vec::new());
    };
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&raw).context("library JSON parse failed")?;
    let (movies, rejected) = validate_records(records);
    for reason in &rejected {
        warn!(library = kind.event_name(), "Skipping stored entry: {}", reason);
    }
    Ok(movies)
}

async fn write_snapshot(store: &dyn KeyValueStore, kind: LibraryKind, movies: &[Movie]) -> Result<()> {
    let json = serde_json::to_string(movies).context("library JSON encode failed")?;
    store.set(kind.storage_key(), &json).await
}
