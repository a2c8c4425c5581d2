#[cfg(feature = "web")]
use axum::http::StatusCode;
#[cfg(feature = "web")]
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Value already present for key {0}")]
    AlreadyExists(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identifier and password are required")]
    MissingCredentials,

    #[error("Invalid email/roll number or password")]
    InvalidCredentials,

    #[error("{0} is already registered")]
    AlreadyRegistered(String),

    #[error("Password hashing failed")]
    Hashing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(feature = "web")]
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Template error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Malformed form upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Stored submission has an unreadable timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("A submission is already being processed")]
    SubmitInFlight,
}

#[cfg(feature = "web")]
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PortalError::Render(_) | PortalError::Store(_) | PortalError::Timestamp(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
            PortalError::Auth(AuthError::InvalidCredentials)
            | PortalError::Auth(AuthError::MissingCredentials) => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            PortalError::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error"),
            PortalError::Multipart(_) => (StatusCode::BAD_REQUEST, "Malformed form upload"),
            PortalError::SubmitInFlight => (
                StatusCode::CONFLICT,
                "Your submission is already being processed",
            ),
        };

        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        (
            status,
            Html(format!(
                "<!DOCTYPE html><html><body><h1>{}</h1><p>{}</p><a href=\"/dashboard\">Back</a></body></html>",
                status.as_u16(),
                message
            )),
        )
            .into_response()
    }
}
