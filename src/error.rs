use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sqlx::error::Error as SQL_ERROR;
use std::{env::VarError, io::Error as IO_ERROR};
use thiserror::Error;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tracing::error;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Missing params: {0}")]
    MissingParams(String),

    #[error("Subscription not found: {0}")]
    NotFound(i64),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(SQL_ERROR),

    #[error("Query failed: {0}")]
    QueryFailed(SQL_ERROR),

    #[error("Query cancelled: {0}")]
    QueryCancelled(#[from] Elapsed),
}

/// Connectivity problems and statement failures are reported as different
/// kinds so callers can tell "the store is down" from "the query broke".
impl From<SQL_ERROR> for Error {
    fn from(e: SQL_ERROR) -> Self {
        match e {
            SQL_ERROR::PoolTimedOut
            | SQL_ERROR::PoolClosed
            | SQL_ERROR::WorkerCrashed
            | SQL_ERROR::Io(_)
            | SQL_ERROR::Tls(_) => Error::StorageUnavailable(e),
            _ => Error::QueryFailed(e),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - client sent invalid input
            Error::InvalidFilter(_)
            | Error::InvalidSubscription(_)
            | Error::InvalidId(_)
            | Error::MissingParams(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found - requested resource does not exist
            Error::NotFound(_) => StatusCode::NOT_FOUND,

            // 504 Gateway Timeout - query outlived the request budget
            Error::QueryCancelled(_) => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error - everything else
            Error::StorageUnavailable(_)
            | Error::QueryFailed(_)
            | Error::ConfigurationError(_)
            | Error::Io(_)
            | Error::VAR(_)
            | Error::TokioJoinError(_)
            | Error::SetGlobalDefaultError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        let body = serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "message": self.to_string(),
            "status": status.as_u16(),
        });
        HttpResponse::build(status).json(body)
    }
}
