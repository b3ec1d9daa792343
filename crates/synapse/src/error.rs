// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Domain errors surfaced at the API seams.
///
/// Evaluator and notifier failures are deliberately absent: they are
/// logged and isolated inside the pipeline and never reach a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynapseError {
    /// Malformed JSON or a payload missing its service id.
    InvalidPayload(String),
    /// The payload's auth token did not match the configured secret.
    Unauthorized,
    /// No service row for the requested id.
    NotFound,
    /// The service exists but exposes no such action.
    UnknownAction(String),
    /// The persistence layer failed; the upsert did not commit.
    Store(String),
    /// No command publisher is wired (broker connection absent).
    Unavailable,
    Internal(String),
}

impl SynapseError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidPayload(_) => 400,
            // The discovery surface reports rejection without
            // distinguishing a bad token from a bad payload.
            Self::Unauthorized => 400,
            Self::NotFound => 404,
            Self::UnknownAction(_) => 400,
            Self::Store(_) => 500,
            Self::Unavailable => 503,
            Self::Internal(_) => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::UnknownAction(_) => "UNKNOWN_ACTION",
            Self::Store(_) => "STORE_FAILURE",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidPayload(msg) | Self::UnknownAction(msg) | Self::Store(msg) => msg.clone(),
            Self::Internal(msg) => msg.clone(),
            Self::Unauthorized => "invalid auth token".to_owned(),
            Self::NotFound => "service not found".to_owned(),
            Self::Unavailable => "command publisher not available".to_owned(),
        }
    }

    pub fn to_http_response(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: ErrorBody { code: self.as_str().to_owned(), message: self.message() },
        };
        (status, Json(body))
    }
}

impl fmt::Display for SynapseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.as_str(), self.message())
    }
}

impl std::error::Error for SynapseError {}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
