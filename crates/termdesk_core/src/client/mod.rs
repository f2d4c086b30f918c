//! Client side of the contract term JSON API.
//!
//! # Responsibility
//! - Define the `ContractTermApi` seam the view-state controller talks to.
//! - Build requests and decode responses once, independent of the transport.
//! - Provide an HTTP transport and an in-process transport.
//!
//! # Invariants
//! - Every request carries the session's anti-forgery token.
//! - Only 422 responses become `ApiError::Validation`.

mod decode;
pub mod http_transport;
pub mod local_transport;

use crate::endpoint::routes::{member_path, RESOURCE_PATH};
use crate::model::contract_term::{ContractTerm, ContractTermFields, ContractTermId, FieldErrors};
use crate::model::listing::ListParams;
use crate::session::CsrfToken;
use crate::wire::{ApiRequest, ApiResponse, RecordEnvelope};
use http::{Method, StatusCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use http_transport::HttpTransport;
pub use local_transport::LocalTransport;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure taxonomy seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request never produced a response.
    Transport(String),
    /// 422 with field-level messages.
    Validation(FieldErrors),
    /// 404; carries the raw server message.
    NotFound(String),
    /// Any other non-success status, including token and policy rejections.
    Rejected { status: StatusCode, message: String },
    /// Success status with a body that does not decode.
    Decode(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::NotFound(message) => write!(f, "{message}"),
            Self::Rejected { status, message } => write!(f, "{status}: {message}"),
            Self::Decode(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Operations the view-state controller needs from the resource.
pub trait ContractTermApi {
    fn list(&self, csrf: &CsrfToken, params: &ListParams) -> ApiResult<Vec<ContractTerm>>;
    fn create(&self, csrf: &CsrfToken, fields: &ContractTermFields) -> ApiResult<ContractTerm>;
    fn update(
        &self,
        csrf: &CsrfToken,
        id: ContractTermId,
        fields: &ContractTermFields,
    ) -> ApiResult<ContractTerm>;
    fn delete(&self, csrf: &CsrfToken, id: ContractTermId) -> ApiResult<()>;
}

/// Moves one request to the endpoint and back.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// `ContractTermApi` over any [`Transport`].
pub struct ResourceClient<T: Transport> {
    transport: T,
    mount: String,
}

impl<T: Transport> ResourceClient<T> {
    /// Creates a client for a resource mounted at [`RESOURCE_PATH`].
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            mount: RESOURCE_PATH.to_string(),
        }
    }

    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn write_request(
        &self,
        method: Method,
        path: String,
        csrf: &CsrfToken,
        fields: &ContractTermFields,
    ) -> ApiResult<ApiRequest> {
        let envelope = RecordEnvelope {
            record: fields.clone(),
        };
        let body = serde_json::to_string(&envelope)
            .map_err(|err| ApiError::Decode(format!("failed to encode request: {err}")))?;
        Ok(ApiRequest::new(method, path)
            .with_csrf_token(csrf)
            .with_body(body))
    }
}

impl<T: Transport> ContractTermApi for ResourceClient<T> {
    fn list(&self, csrf: &CsrfToken, params: &ListParams) -> ApiResult<Vec<ContractTerm>> {
        let request = ApiRequest::new(Method::GET, self.mount.clone())
            .with_query(params.to_query_string())
            .with_csrf_token(csrf);
        let response = self.transport.send(request)?;
        decode::json_body(&response)
    }

    fn create(&self, csrf: &CsrfToken, fields: &ContractTermFields) -> ApiResult<ContractTerm> {
        let request = self.write_request(Method::POST, self.mount.clone(), csrf, fields)?;
        let response = self.transport.send(request)?;
        decode::json_body(&response)
    }

    fn update(
        &self,
        csrf: &CsrfToken,
        id: ContractTermId,
        fields: &ContractTermFields,
    ) -> ApiResult<ContractTerm> {
        let path = member_path(&self.mount, id);
        let request = self.write_request(Method::PUT, path, csrf, fields)?;
        let response = self.transport.send(request)?;
        decode::json_body(&response)
    }

    fn delete(&self, csrf: &CsrfToken, id: ContractTermId) -> ApiResult<()> {
        let request =
            ApiRequest::new(Method::DELETE, member_path(&self.mount, id)).with_csrf_token(csrf);
        let response = self.transport.send(request)?;
        decode::no_content(&response)
    }
}
