//! Core of the contract terms admin screen.
//! Server-side resource (SQLite-backed) and client-side view state live here;
//! the `termdesk` binary only wires them to a terminal.

pub mod client;
pub mod config;
pub mod controller;
pub mod db;
pub mod endpoint;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod wire;

pub use client::{
    ApiError, ApiResult, ContractTermApi, HttpTransport, LocalTransport, ResourceClient,
};
pub use config::{ClientConfig, ConfigError, ConfigOverrides};
pub use controller::{ContractTermsController, ControllerError, DeleteOutcome, UpdateOutcome};
pub use endpoint::policy::{AuthorizationPolicy, GrantPolicy};
pub use endpoint::ResourceEndpoint;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::contract_term::{
    ContractTerm, ContractTermFields, ContractTermId, Field, FieldErrors,
};
pub use repo::contract_term_repo::{
    ContractTermRepository, RepoError, RepoResult, SqliteContractTermRepository,
};
pub use service::contract_term_service::{ContractTermService, ServiceError};
pub use session::CsrfToken;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
