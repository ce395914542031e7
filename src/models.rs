use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MovieId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("'{}' is not a valid movie id", s))?;
        Ok(MovieId(id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Movie {
    pub fn poster_url(&self) -> String {
        match self.poster_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{POSTER_BASE}{path}"),
            _ => POSTER_PLACEHOLDER.to_string(),
        }
    }

    pub fn year(&self) -> Option<String> {
        self.release_date.map(|d| d.format("%Y").to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMovie {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMovie {
    #[error("movie record has no id")]
    MissingId,
    #[error("movie {0} has no title")]
    MissingTitle(MovieId),
}

impl TryFrom<RawMovie> for Movie {
    type Error = InvalidMovie;

    fn try_from(raw: RawMovie) -> Result<Self, Self::Error> {
        let id = MovieId(raw.id.ok_or(InvalidMovie::MissingId)?);
        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(InvalidMovie::MissingTitle(id))?;
        Ok(Movie {
            id,
            title,
            overview: raw.overview.unwrap_or_default(),
            release_date: raw.release_date.as_deref().and_then(parse_date),
            vote_average: raw.vote_average.unwrap_or(0.0),
            poster_path: raw.poster_path.filter(|p| !p.is_empty()),
        })
    }
}

// Each record stands alone: one unusable entry never takes the others down.
pub fn validate_records(records: Vec<serde_json::Value>) -> (Vec<Movie>, Vec<String>) {
    let mut movies = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for value in records {
        let raw = match serde_json::from_value::<RawMovie>(value) {
            Ok(raw) => raw,
            Err(e) => {
                rejected.push(format!("malformed record: {}", e));
                continue;
            }
        };
        match Movie::try_from(raw) {
            Ok(movie) => movies.push(movie),
            Err(e) => rejected.push(e.to_string()),
        }
    }
    (movies, rejected)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    s.trim().parse::<NaiveDate>().ok()
}

// TMDB sends "" for unknown dates, and older snapshots may carry anything.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<u64>, title: Option<&str>) -> RawMovie {
        RawMovie {
            id,
            title: title.map(str::to_string),
            ..RawMovie::default()
        }
    }

    #[test]
    fn raw_record_without_id_or_title_is_rejected() {
        assert_eq!(
            Movie::try_from(raw(None, Some("Heat"))),
            Err(InvalidMovie::MissingId)
        );
        assert_eq!(
            Movie::try_from(raw(Some(7), Some("   "))),
            Err(InvalidMovie::MissingTitle(MovieId(7)))
        );
    }

    #[test]
    fn raw_record_defaults_optional_fields() {
        let mut r = raw(Some(949), Some("Heat"));
        r.release_date = Some(String::new());
        r.poster_path = Some(String::new());
        let movie = Movie::try_from(r).unwrap();
        assert_eq!(movie.overview, "");
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.release_date, None);
        assert_eq!(movie.poster_path, None);
        assert!(movie.poster_url().contains("placeholder"));
    }

    #[test]
    fn raw_record_parses_release_date() {
        let mut r = raw(Some(272), Some("Batman Begins"));
        r.release_date = Some("2005-06-10".to_string());
        r.poster_path = Some("/batman.jpg".to_string());
        let movie = Movie::try_from(r).unwrap();
        assert_eq!(movie.year().as_deref(), Some("2005"));
        assert_eq!(
            movie.poster_url(),
            "https://image.tmdb.org/t/p/w500/batman.jpg"
        );
    }

    #[test]
    fn stale_persisted_record_still_loads() {
        let json = r#"[{"id": 42, "title": "X", "release_date": ""}]"#;
        let movies: Vec<Movie> = serde_json::from_str(json).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, MovieId(42));
        assert_eq!(movies[0].release_date, None);
        assert_eq!(movies[0].poster_path, None);
    }

    #[test]
    fn bad_records_are_rejected_one_by_one() {
        let records: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "Heat", "overview": null, "vote_average": null},
                {"id": 2},
                {"id": "three", "title": "Bad id"},
                {"id": 4, "title": "Ronin", "release_date": "1998-09-25"}
            ]"#,
        )
        .unwrap();
        let (movies, rejected) = validate_records(records);
        let ids: Vec<u64> = movies.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(movies[0].overview, "");
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn movie_id_parses_from_cli_input() {
        assert_eq!(" 42 ".parse::<MovieId>().unwrap(), MovieId(42));
        assert!("tt0111161".parse::<MovieId>().is_err());
    }
}
