//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract behind the resource endpoint.
//! - Keep SQL details out of service and endpoint code.
//!
//! # Invariants
//! - Writes validate required fields before touching storage.
//! - Missing ids surface as `RepoError::NotFound`, not as empty success.

pub mod contract_term_repo;
