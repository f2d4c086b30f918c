//! Contract term domain model.
//!
//! # Responsibility
//! - Define the record shape shared by persistence, endpoint and controller.
//! - Own field-level validation rules and the validation error map.
//!
//! # Invariants
//! - Every persisted record is identified by a server-assigned `ContractTermId`.
//! - `label` and `formula` are never blank on a valid record.

pub mod contract_term;
pub mod formula;
pub mod listing;
