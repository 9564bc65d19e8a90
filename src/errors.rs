use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EphemerisError {
    #[error("Database error: {0}")]
    #[diagnostic(
        code(ephemeris::db),
        help("Check that the database behind `database.url` is reachable")
    )]
    Db(#[from] sea_orm::DbErr),

    #[error("`{0}` is not a valid run date")]
    #[diagnostic(
        code(ephemeris::invalid_date),
        help("Dates are integer day keys in YYYYMMDD form, e.g. 20251110")
    )]
    InvalidDate(String),

    #[error("No occurrence of job `{0}` on the requested date")]
    #[diagnostic(code(ephemeris::job_not_found))]
    JobNotFound(String),
}

impl IntoResponse for EphemerisError {
    fn into_response(self) -> Response {
        let status = match &self {
            EphemerisError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            EphemerisError::JobNotFound(_) => StatusCode::NOT_FOUND,
            // A failing source aborts the whole load; there is no stale fallback
            EphemerisError::Db(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
