use crate::models::{Movie, MovieId};
use std::collections::HashSet;

pub fn available(catalog: &[Movie], rented: &[Movie], watched: &[Movie]) -> Vec<Movie> {
    let taken: HashSet<MovieId> = rented.iter().chain(watched).map(|m| m.id).collect();
    catalog
        .iter()
        .filter(|m| !taken.contains(&m.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64) -> Movie {
        Movie {
            id: MovieId(id),
            title: format!("Movie {id}"),
            overview: String::new(),
            release_date: None,
            vote_average: 0.0,
            poster_path: None,
        }
    }

    fn ids(movies: &[Movie]) -> Vec<u64> {
        movies.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn excludes_rented_and_watched() {
        let catalog = [movie(1), movie(2), movie(3)];
        let out = available(&catalog, &[movie(2)], &[movie(3)]);
        assert_eq!(ids(&out), vec![1]);
    }

    #[test]
    fn keeps_catalog_order() {
        let catalog = [movie(9), movie(4), movie(7), movie(1), movie(5)];
        let out = available(&catalog, &[movie(7)], &[]);
        assert_eq!(ids(&out), vec![9, 4, 1, 5]);
    }

    #[test]
    fn empty_libraries_return_whole_catalog() {
        let catalog = [movie(1), movie(2)];
        assert_eq!(available(&catalog, &[], &[]), catalog.to_vec());
        assert!(available(&[], &[movie(1)], &[movie(2)]).is_empty());
    }
}
