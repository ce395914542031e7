use crate::models::{validate_records, Movie, MovieId, RawMovie};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const LANGUAGE: &str = "en-US";

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>>;
    async fn popular_movies(&self) -> Result<Vec<Movie>>;
    async fn fetch_movie(&self, id: MovieId) -> Result<Movie>;
    async fn fetch_trailer(&self, id: MovieId) -> Result<Option<String>>;
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let user_agent = format!("cinerent/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    // The URL carries the api key; reqwest errors are stripped of it and the
    // url never goes into our own messages.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("request failed")?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("TMDB returned {}: {}", status, text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>> {
        let url = format!(
            "{}/search/movie?api_key={}&query={}&language={LANGUAGE}",
            self.base_url,
            self.api_key,
            urlencoding::encode(query)
        );
        let data: ResultsPage = self.get_json(&url).await?;
        Ok(data.into_movies())
    }

    async fn popular_movies(&self) -> Result<Vec<Movie>> {
        let url = format!(
            "{}/movie/popular?api_key={}&language={LANGUAGE}&page=1",
            self.base_url, self.api_key
        );
        let data: ResultsPage = self.get_json(&url).await?;
        Ok(data.into_movies())
    }

    async fn fetch_movie(&self, id: MovieId) -> Result<Movie> {
        let url = format!(
            "{}/movie/{id}?api_key={}&language={LANGUAGE}",
            self.base_url, self.api_key
        );
        let raw: RawMovie = self.get_json(&url).await?;
        Movie::try_from(raw).map_err(|e| anyhow!("TMDB movie {} unusable: {}", id, e))
    }

    async fn fetch_trailer(&self, id: MovieId) -> Result<Option<String>> {
        let url = format!(
            "{}/movie/{id}/videos?api_key={}&language={LANGUAGE}",
            self.base_url, self.api_key
        );
        let videos: Videos = self.get_json(&url).await?;
        Ok(select_trailer(&videos))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsPage {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

impl ResultsPage {
    pub(crate) fn into_movies(self) -> Vec<Movie> {
        let total = self.results.len();
        let (movies, rejected) = validate_records(self.results);
        for reason in &rejected {
            debug!("Dropping catalog record: {}", reason);
        }
        if movies.len() < total {
            debug!("Kept {} of {} catalog records", movies.len(), total);
        }
        movies
    }
}

#[derive(Debug, Deserialize)]
struct Videos {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    site: Option<String>,
    #[serde(rename = "type")]
    video_type: Option<String>,
    key: Option<String>,
}

fn select_trailer(videos: &Videos) -> Option<String> {
    videos
        .results
        .iter()
        .filter(|v| {
            v.site.as_deref() == Some("YouTube") && v.video_type.as_deref() == Some("Trailer")
        })
        .find_map(|v| v.key.as_deref().filter(|k| !k.is_empty()))
        .map(|key| format!("https://www.youtube.com/embed/{key}?autoplay=1&fs=1"))
}
