use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::infra::error::InfraError;

/// Returned when the caller's cancellation token fired before the operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Diagnostic carried on a failed response for the logging middleware.
///
/// Never rendered to the client; only `HttpError::public_message` is.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    /// Flattens `error` and its `source()` chain, outermost first.
    pub fn from_error(source: &'static str, error: &(dyn StdError + 'static)) -> Self {
        let messages = std::iter::successors(Some(error), |current| (*current).source())
            .map(ToString::to_string)
            .collect();
        Self { source, messages }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Handler error: a status, a fixed client-facing line, and a private report.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn not_found(source: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            public_message: "not found",
            report: ErrorReport::from_message(source, detail),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = format!("{}\n", self.public_message);
        let mut response = (self.status, body).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<Cancelled> for HttpError {
    fn from(error: Cancelled) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            public_message: "server is shutting down",
            report: ErrorReport::from_error("infra::http::cancelled", &error),
        }
    }
}

/// Failure that ends the process with a non-zero exit.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
