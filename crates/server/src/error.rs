use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pollbus_core::BusError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Bus(err) => match err {
                BusError::BadRequest(_) | BusError::MalformedCursor(_) => StatusCode::BAD_REQUEST,
                BusError::StaleCursor(_) => StatusCode::GONE,
                err if err.is_storage_failure() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("{} -> {}", message, status);
        } else {
            warn!("{} -> {}", message, status);
        }

        let body = Json(json!({
            "error": {
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollbus_core::MessageId;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::BadRequest("missing t".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::from(BusError::MalformedCursor("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::from(BusError::StaleCursor(MessageId::new(3))).status(),
            StatusCode::GONE
        );
        assert_eq!(
            Error::from(BusError::StorageUnavailable("down".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::from(BusError::IdsExhausted(MessageId::new(u64::MAX))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::from(BusError::WriterClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
