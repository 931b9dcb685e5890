use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::{director, genre, movie};

/// Wire representation of a movie. `genre` and `director` carry the display
/// name of the referenced row, not a nested object.
#[derive(Clone, Debug, Serialize)]
pub struct MovieResponse {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub trailer: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genre_id: Option<i32>,
    pub genre: Option<String>,
    pub director_id: Option<i32>,
    pub director: Option<String>,
}

impl MovieResponse {
    pub fn from_model(
        m: movie::Model,
        genres: &HashMap<i32, Option<String>>,
        directors: &HashMap<i32, Option<String>>,
    ) -> Self {
        let genre = m.genre_id.and_then(|id| genres.get(&id).cloned().flatten());
        let director = m.director_id.and_then(|id| directors.get(&id).cloned().flatten());
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            trailer: m.trailer,
            year: m.year,
            rating: m.rating,
            genre_id: m.genre_id,
            genre,
            director_id: m.director_id,
            director,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GenreResponse {
    pub id: i32,
    pub name: Option<String>,
}

impl From<genre::Model> for GenreResponse {
    fn from(g: genre::Model) -> Self {
        Self { id: g.id, name: g.name }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DirectorResponse {
    pub id: i32,
    pub name: Option<String>,
}

impl From<director::Model> for DirectorResponse {
    fn from(d: director::Model) -> Self {
        Self { id: d.id, name: d.name }
    }
}

/// Writable movie fields. Absent fields land as NULL in the store.
#[derive(Debug, Deserialize)]
pub struct MovieBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub trailer: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genre_id: Option<i32>,
    pub director_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MovieListQuery {
    pub genre_id: Option<i32>,
    pub director_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_movie_model() -> movie::Model {
        movie::Model {
            id: 7,
            title: Some("Dune".into()),
            description: Some("Spice and sand".into()),
            trailer: Some("https://example.com/dune".into()),
            year: Some(2021),
            rating: Some(8.1),
            genre_id: Some(1),
            director_id: Some(2),
        }
    }

    #[test]
    fn movie_response_flattens_related_names() {
        let genres = HashMap::from([(1, Some("Drama".to_string()))]);
        let directors = HashMap::from([(2, Some("Denis Villeneuve".to_string()))]);

        let resp = MovieResponse::from_model(make_movie_model(), &genres, &directors);
        assert_eq!(resp.id, 7);
        assert_eq!(resp.genre_id, Some(1));
        assert_eq!(resp.genre.as_deref(), Some("Drama"));
        assert_eq!(resp.director_id, Some(2));
        assert_eq!(resp.director.as_deref(), Some("Denis Villeneuve"));
    }

    #[test]
    fn movie_response_dangling_reference_maps_to_null() {
        let resp =
            MovieResponse::from_model(make_movie_model(), &HashMap::new(), &HashMap::new());
        assert_eq!(resp.genre_id, Some(1));
        assert!(resp.genre.is_none());
        assert!(resp.director.is_none());
    }

    #[test]
    fn movie_response_wire_shape() {
        let genres = HashMap::from([(1, Some("Drama".to_string()))]);
        let resp = MovieResponse::from_model(make_movie_model(), &genres, &HashMap::new());
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["title"], "Dune");
        assert_eq!(json["year"], 2021);
        assert_eq!(json["genre"], "Drama");
        assert!(json["director"].is_null());
        for key in
            ["id", "title", "description", "trailer", "year", "rating", "genre_id", "genre",
                "director_id", "director"]
        {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn genre_response_from_model() {
        let resp = GenreResponse::from(genre::Model { id: 1, name: Some("Drama".into()) });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "name": "Drama" }));
    }
}
