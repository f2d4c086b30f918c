//! JSON resource endpoint for contract terms.
//!
//! # Responsibility
//! - Route list/create/update/delete requests to the service layer.
//! - Enforce the anti-forgery token and the authorization policy.
//! - Map outcomes to status codes and JSON bodies.
//!
//! # Invariants
//! - Token and policy checks run before any persistence work.
//! - Authorization and token failures never leak detail beyond a fixed message.
//! - Validation failures are the only 422 responses and carry a field error map.

pub mod policy;
pub mod routes;

use crate::model::contract_term::{ContractTermFields, ContractTermId};
use crate::model::listing::ListParams;
use crate::repo::contract_term_repo::ContractTermRepository;
use crate::service::contract_term_service::{ContractTermService, ServiceError};
use crate::session::CsrfToken;
use crate::wire::{ApiRequest, ApiResponse, RecordEnvelope};
use http::StatusCode;
use log::{error, info, warn};
use policy::AuthorizationPolicy;
use routes::{resolve, Route, RouteError, RESOURCE_PATH};
use std::time::Instant;

pub const INVALID_TOKEN_MESSAGE: &str = "invalid authenticity token";
pub const NOT_AUTHORIZED_MESSAGE: &str = "not authorized";

/// One session's view of the contract term resource.
pub struct ResourceEndpoint<R: ContractTermRepository, P: AuthorizationPolicy> {
    service: ContractTermService<R>,
    policy: P,
    csrf: CsrfToken,
    mount: String,
}

impl<R: ContractTermRepository, P: AuthorizationPolicy> ResourceEndpoint<R, P> {
    /// Creates an endpoint mounted at [`RESOURCE_PATH`].
    pub fn new(repo: R, policy: P, csrf: CsrfToken) -> Self {
        Self {
            service: ContractTermService::new(repo),
            policy,
            csrf,
            mount: RESOURCE_PATH.to_string(),
        }
    }

    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Handles one request and logs its outcome.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let started_at = Instant::now();
        let response = self.dispatch(request);
        info!(
            "event=endpoint_request module=endpoint method={} path={} status={} duration_ms={}",
            request.method,
            request.path,
            response.status.as_u16(),
            started_at.elapsed().as_millis()
        );
        response
    }

    fn dispatch(&self, request: &ApiRequest) -> ApiResponse {
        let route = match resolve(&self.mount, &request.method, &request.path) {
            Ok(route) => route,
            Err(RouteError::NotFound) => {
                return ApiResponse::error(StatusCode::NOT_FOUND, "no such route")
            }
            Err(RouteError::MethodNotAllowed) => {
                return ApiResponse::error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
            }
        };

        if !self.csrf.verify(request.csrf_token.as_deref()) {
            warn!(
                "event=csrf_rejected module=endpoint action={} token_present={}",
                route.action().as_str(),
                request.csrf_token.is_some()
            );
            return ApiResponse::error(StatusCode::FORBIDDEN, INVALID_TOKEN_MESSAGE);
        }

        if let Err(denied) = self.policy.authorize(route.action()) {
            warn!(
                "event=policy_denied module=endpoint action={}",
                denied.0.as_str()
            );
            return ApiResponse::error(StatusCode::FORBIDDEN, NOT_AUTHORIZED_MESSAGE);
        }

        match route {
            Route::Index => self.index(request),
            Route::Create => self.create(request),
            Route::Update(id) => self.update(id, request),
            Route::Destroy(id) => self.destroy(id),
        }
    }

    fn index(&self, request: &ApiRequest) -> ApiResponse {
        let params = ListParams::from_query(&request.query);
        match self.service.list_terms(&params) {
            Ok(terms) => ApiResponse::json(StatusCode::OK, &self.policy.scope(terms)),
            Err(err) => service_failure(err),
        }
    }

    fn create(&self, request: &ApiRequest) -> ApiResponse {
        let requested = match parse_record(request) {
            Ok(fields) => fields,
            Err(response) => return response,
        };
        let fields = self.policy.permit(requested, ContractTermFields::default());

        match self.service.create_term(fields) {
            Ok(term) => ApiResponse::json(StatusCode::CREATED, &term),
            Err(err) => service_failure(err),
        }
    }

    fn update(&self, id: ContractTermId, request: &ApiRequest) -> ApiResponse {
        let requested = match parse_record(request) {
            Ok(fields) => fields,
            Err(response) => return response,
        };
        let current = match self.service.get_term(id) {
            Ok(Some(term)) => term,
            Ok(None) => return service_failure(ServiceError::NotFound(id)),
            Err(err) => return service_failure(err.into()),
        };
        let fields = self.policy.permit(requested, current.fields());

        match self.service.update_term(id, fields) {
            Ok(term) => ApiResponse::json(StatusCode::OK, &term),
            Err(err) => service_failure(err),
        }
    }

    fn destroy(&self, id: ContractTermId) -> ApiResponse {
        match self.service.delete_term(id) {
            Ok(()) => ApiResponse::empty(StatusCode::NO_CONTENT),
            Err(err) => service_failure(err),
        }
    }
}

fn parse_record(request: &ApiRequest) -> Result<ContractTermFields, ApiResponse> {
    let Some(body) = request.body.as_deref() else {
        return Err(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "param is missing or the value is empty: record",
        ));
    };
    serde_json::from_str::<RecordEnvelope>(body)
        .map(|envelope| envelope.record)
        .map_err(|err| {
            ApiResponse::error(StatusCode::BAD_REQUEST, format!("malformed request body: {err}"))
        })
}

fn service_failure(err: ServiceError) -> ApiResponse {
    match err {
        ServiceError::Validation(errors) => {
            ApiResponse::json(StatusCode::UNPROCESSABLE_ENTITY, &errors)
        }
        ServiceError::NotFound(id) => ApiResponse::error(
            StatusCode::NOT_FOUND,
            format!("Couldn't find contract term with id={id}"),
        ),
        other => {
            error!(
                "event=endpoint_failure module=endpoint status=error error={}",
                other
            );
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}
