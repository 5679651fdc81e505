use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// missing or unusable host, the message goes straight back to the client
    #[error("{0}")]
    BadRequest(String),

    /// host resolved fine but isn't one we relay for
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    /// anything that went wrong talking to upstream
    #[error("upstream request failed: {0}")]
    BadGateway(String),

    #[error("internal server error: {0}")]
    InternalServerErrorWithContext(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::InternalServerErrorWithContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // client mistakes are echoed back, everything else is logged and kept vague
        let body = match &self {
            Self::BadRequest(msg) | Self::Forbidden(msg) | Self::MethodNotAllowed(msg) => {
                msg.clone()
            }
            Self::BadGateway(_) | Self::InternalServerErrorWithContext(_) => {
                error!("request failed: {}", self);
                metrics::counter!("ytproxy_requests_total", "outcome" => "failed").increment(1);
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
        };

        (status, body).into_response()
    }
}
