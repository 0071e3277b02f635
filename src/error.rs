use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Farmer not found: {0}")]
    FarmerNotFound(i32),

    #[error("Farm not found: {0}")]
    FarmNotFound(i32),

    #[error("Mortgage not found: {0}")]
    MortgageNotFound(i32),

    #[error("Disbursement not found: {0}")]
    DisbursementNotFound(i32),

    #[error("User not found: {0}")]
    UserNotFound(i32),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::FarmerNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::FarmNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::MortgageNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::DisbursementNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::UserNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::EmailTaken(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ServerError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
