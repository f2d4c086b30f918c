//! Request/response envelopes shared by the endpoint and its transports.
//!
//! Bodies are JSON text. Record writes are wrapped as
//! `{"record": {"label": .., "formula": .., "note": ..}}`; failures other than
//! validation carry `{"error": "<message>"}`.

use crate::model::contract_term::ContractTermFields;
use crate::session::CsrfToken;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

/// Write request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEnvelope {
    #[serde(alias = "contract_term")]
    pub record: ContractTermFields,
}

/// Generic failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Transport-neutral request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path without query string, e.g. `/contract_terms/7`.
    pub path: String,
    /// Raw query string without the leading `?`; empty when absent.
    pub query: String,
    /// Value of the anti-forgery header, if any.
    pub csrf_token: Option<String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: String::new(),
            csrf_token: None,
            body: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_csrf_token(mut self, token: &CsrfToken) -> Self {
        self.csrf_token = Some(token.as_str().to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Transport-neutral response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl ApiResponse {
    /// Serializes `value` as the JSON body.
    ///
    /// Serialization failures of in-crate types are reported as a 500.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(err) => Self::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode response: {err}"),
            ),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: message.into(),
        };
        Self {
            status,
            body: serde_json::to_string(&body).ok(),
        }
    }

    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}
