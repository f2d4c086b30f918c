//! Contract term use-case service.
//!
//! # Responsibility
//! - Provide list/create/update/delete entry points for the resource endpoint.
//! - Return the full persisted record after every write (read-back).
//!
//! # Invariants
//! - Field validation happens before persistence and reports every blank
//!   required field at once.
//! - Missing ids map to `ServiceError::NotFound`.

use crate::model::contract_term::{ContractTerm, ContractTermFields, ContractTermId, FieldErrors};
use crate::model::listing::ListParams;
use crate::repo::contract_term_repo::{ContractTermRepository, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for contract term use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// One or more fields failed validation.
    Validation(FieldErrors),
    /// Target record does not exist.
    NotFound(ContractTermId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::NotFound(id) => write!(f, "contract term not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent contract term state: {details}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(errors) => Self::Validation(errors),
            other => Self::Repo(other),
        }
    }
}

/// Contract term service facade over repository implementations.
pub struct ContractTermService<R: ContractTermRepository> {
    repo: R,
}

impl<R: ContractTermRepository> ContractTermService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists one page of records using raw query parameters.
    pub fn list_terms(&self, params: &ListParams) -> Result<Vec<ContractTerm>, ServiceError> {
        Ok(self.repo.list_terms(&params.normalize())?)
    }

    pub fn get_term(&self, id: ContractTermId) -> RepoResult<Option<ContractTerm>> {
        self.repo.get_term(id)
    }

    /// Creates one record and returns it as persisted.
    pub fn create_term(
        &self,
        fields: ContractTermFields,
    ) -> Result<ContractTerm, ServiceError> {
        let fields = fields.normalized();
        fields.validate().map_err(ServiceError::Validation)?;

        let id = self.repo.create_term(&fields)?;
        self.repo
            .get_term(id)?
            .ok_or(ServiceError::InconsistentState(
                "created contract term not found in read-back",
            ))
    }

    /// Replaces label, formula and note of one record and returns it.
    pub fn update_term(
        &self,
        id: ContractTermId,
        fields: ContractTermFields,
    ) -> Result<ContractTerm, ServiceError> {
        let fields = fields.normalized();
        fields.validate().map_err(ServiceError::Validation)?;

        self.repo.update_term(id, &fields)?;
        self.repo
            .get_term(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated contract term not found in read-back",
            ))
    }

    pub fn delete_term(&self, id: ContractTermId) -> Result<(), ServiceError> {
        Ok(self.repo.delete_term(id)?)
    }
}
