//! Movie record types
//!
//! Wire-faithful mirrors of the backend's movie model. Field names are
//! camelCase on the wire; optional fields the backend may omit are `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Genre of a movie, serialized as the backend's enum constant names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovieGenre {
    Action,
    Comedy,
    Tragedy,
    Thriller,
    Fantasy,
}

/// One movie record as returned by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub genre: Option<MovieGenre>,
    pub oscars_count: u32,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
}

/// One page of the catalog plus the collection-wide total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_page_decodes_backend_envelope() {
        let json = r#"{
            "movies": [{
                "id": 7,
                "name": "Stalker",
                "genre": "TRAGEDY",
                "oscarsCount": 0,
                "creationDate": "2024-03-01T12:00:00Z",
                "budget": 1000000.0
            }],
            "totalCount": 42
        }"#;

        let page: MoviePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, 42);
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].name, "Stalker");
        assert_eq!(page.movies[0].genre, Some(MovieGenre::Tragedy));
        assert_eq!(page.movies[0].director, None);
    }
}
