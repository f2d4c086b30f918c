//! Server-side use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into resource-level operations.
//! - Keep the endpoint decoupled from storage details.

pub mod contract_term_service;
