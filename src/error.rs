use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{entity} {id} is referenced by {count} movie(s)")]
    InUse { entity: &'static str, id: i32, count: u64 },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Lookups that miss answer with an empty body.
            AppError::NotFound { .. } => StatusCode::NOT_FOUND.into_response(),
            AppError::InUse { .. } => {
                (StatusCode::CONFLICT, Json(json!({ "error": self.to_string() }))).into_response()
            }
            AppError::Db(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
