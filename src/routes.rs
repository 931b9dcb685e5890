use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        DirectorResponse, GenreResponse, MovieBody, MovieListQuery, MovieResponse, NameBody,
        RenameBody,
    },
    store::{MovieFilter, Removal},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies/", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie).delete(delete_movie))
        .route("/genres/", get(list_genres).post(create_genre))
        .route("/genres/{id}", get(get_genre).put(update_genre).delete(delete_genre))
        .route("/directors/", get(list_directors).post(create_director))
        .route(
            "/directors/{id}",
            get(get_director).put(update_director).delete(delete_director),
        )
        .with_state(state)
}

fn removal_status(entity: &'static str, id: i32, removal: Removal) -> AppResult<StatusCode> {
    match removal {
        Removal::Removed => Ok(StatusCode::NO_CONTENT),
        Removal::Missing => Err(AppError::not_found(entity, id)),
        Removal::Referenced(count) => Err(AppError::InUse { entity, id, count }),
    }
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MovieListQuery>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let movies = state
        .catalog
        .list_movies(MovieFilter { genre_id: q.genre_id, director_id: q.director_id })
        .await?;

    let genre_ids: Vec<i32> = movies.iter().filter_map(|m| m.genre_id).collect();
    let director_ids: Vec<i32> = movies.iter().filter_map(|m| m.director_id).collect();
    let genres = state.catalog.genre_names(&genre_ids).await?;
    let directors = state.catalog.director_names(&director_ids).await?;

    Ok(Json(
        movies.into_iter().map(|m| MovieResponse::from_model(m, &genres, &directors)).collect(),
    ))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MovieBody>,
) -> AppResult<StatusCode> {
    state.catalog.create_movie(body).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<MovieResponse>> {
    let movie =
        state.catalog.find_movie(id).await?.ok_or_else(|| AppError::not_found("movie", id))?;

    let genre_ids: Vec<i32> = movie.genre_id.into_iter().collect();
    let director_ids: Vec<i32> = movie.director_id.into_iter().collect();
    let genres = state.catalog.genre_names(&genre_ids).await?;
    let directors = state.catalog.director_names(&director_ids).await?;

    Ok(Json(MovieResponse::from_model(movie, &genres, &directors)))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if state.catalog.delete_movie(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("movie", id))
    }
}

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<GenreResponse>>> {
    let genres = state.catalog.list_genres().await?;
    Ok(Json(genres.into_iter().map(GenreResponse::from).collect()))
}

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NameBody>,
) -> AppResult<StatusCode> {
    state.catalog.create_genre(body).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<GenreResponse>> {
    let genre =
        state.catalog.find_genre(id).await?.ok_or_else(|| AppError::not_found("genre", id))?;
    Ok(Json(GenreResponse::from(genre)))
}

pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<RenameBody>,
) -> AppResult<StatusCode> {
    if state.catalog.rename_genre(id, body.name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("genre", id))
    }
}

pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let removal = state.catalog.delete_genre(id).await?;
    removal_status("genre", id, removal)
}

pub async fn list_directors(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<DirectorResponse>>> {
    let directors = state.catalog.list_directors().await?;
    Ok(Json(directors.into_iter().map(DirectorResponse::from).collect()))
}

pub async fn create_director(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NameBody>,
) -> AppResult<StatusCode> {
    state.catalog.create_director(body).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get_director(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<DirectorResponse>> {
    let director = state
        .catalog
        .find_director(id)
        .await?
        .ok_or_else(|| AppError::not_found("director", id))?;
    Ok(Json(DirectorResponse::from(director)))
}

pub async fn update_director(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<RenameBody>,
) -> AppResult<StatusCode> {
    if state.catalog.rename_director(id, body.name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("director", id))
    }
}

pub async fn delete_director(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let removal = state.catalog.delete_director(id).await?;
    removal_status("director", id, removal)
}
