use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

/// Closed set of failure kinds for the attendance/payroll core.
///
/// Validation  -> input rejected before any calculation runs
/// StateConflict -> business rule violated (already clocked in, break open,
///                  payroll exists, wrong lifecycle status)
/// Boundary    -> transition blocked without corrupting state (geofence, leave)
/// NotFound    -> record lookup missed
/// Infrastructure -> repository I/O; original cause only in logs
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("{0}")]
    Boundary(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Something went wrong, Contact with system admin")]
    Infrastructure(#[from] sqlx::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl actix_web::ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_)
            | DomainError::StateConflict(_)
            | DomainError::Boundary(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let DomainError::Infrastructure(e) = self {
            tracing::error!(error = %e, "Repository operation failed");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}
