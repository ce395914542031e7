use crate::error::AppError;
use crate::storage::KeyValueStore;
use crate::tmdb::TMDB_BASE;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

const API_KEY_ENTRY: &str = "tmdbApiKey";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub tmdb_base_url: String,
    pub data_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let api_key = env::var("TMDB_API_KEY").ok().filter(|s| !s.trim().is_empty());
        let tmdb_base_url = env::var("TMDB_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| TMDB_BASE.to_string());
        let data_dir = env::var("CINERENT_DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("cinerent")))
            .unwrap_or_else(|| PathBuf::from(".cinerent"));
        Self {
            api_key,
            tmdb_base_url,
            data_dir,
        }
    }

    pub fn library_dir(&self) -> PathBuf {
        self.data_dir.join("library")
    }

    pub fn credentials_dir(&self) -> PathBuf {
        self.data_dir.join("credentials")
    }

    pub async fn resolve_api_key(&self, credentials: &Credentials) -> Result<String, AppError> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        credentials.api_key().await.ok_or_else(|| {
            AppError::Config(
                "no TMDB API key: set TMDB_API_KEY or run `cinerent login <key>`".to_string(),
            )
        })
    }
}

#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KeyValueStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save_api_key(&self, key: &str) {
        match self.store.set(API_KEY_ENTRY, key.trim()).await {
            Ok(()) => info!("Saved TMDB API key"),
            Err(e) => error!("Error saving API key: {:#}", e),
        }
    }

    pub async fn api_key(&self) -> Option<String> {
        match self.store.get(API_KEY_ENTRY).await {
            Ok(key) => key.filter(|k| !k.is_empty()),
            Err(e) => {
                error!("Error retrieving API key: {:#}", e);
                None
            }
        }
    }

    pub async fn delete_api_key(&self) {
        match self.store.remove(API_KEY_ENTRY).await {
            Ok(()) => info!("Deleted saved TMDB API key"),
            Err(e) => error!("Error deleting API key: {:#}", e),
        }
    }
}
