//! Authorization policy for resource actions.
//!
//! # Invariants
//! - Actions are denied unless explicitly granted.
//! - Attributes outside `permitted_fields` never reach persistence.

use crate::model::contract_term::{ContractTerm, ContractTermFields, Field};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resource action checked by the policy before any persistence work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceAction {
    Index,
    Create,
    Update,
    Destroy,
}

impl ResourceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }
}

/// Denied action. Carries no detail beyond the action name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAuthorized(pub ResourceAction);

impl Display for NotAuthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "action `{}` is not authorized", self.0.as_str())
    }
}

impl Error for NotAuthorized {}

/// Authorization collaborator consulted by the endpoint.
pub trait AuthorizationPolicy {
    fn authorize(&self, action: ResourceAction) -> Result<(), NotAuthorized>;

    /// Writable attributes for create/update.
    fn permitted_fields(&self) -> &[Field];

    /// Restricts a listed page to what the session may see.
    fn scope(&self, terms: Vec<ContractTerm>) -> Vec<ContractTerm> {
        terms
    }

    /// Drops non-permitted attributes, taking them from `base` instead.
    ///
    /// For create `base` is the empty field set; for update it is the
    /// currently persisted record.
    fn permit(
        &self,
        requested: ContractTermFields,
        base: ContractTermFields,
    ) -> ContractTermFields {
        let permitted = self.permitted_fields();
        ContractTermFields {
            label: if permitted.contains(&Field::Label) {
                requested.label
            } else {
                base.label
            },
            formula: if permitted.contains(&Field::Formula) {
                requested.formula
            } else {
                base.formula
            },
            note: if permitted.contains(&Field::Note) {
                requested.note
            } else {
                base.note
            },
        }
    }
}

const ALL_FIELDS: &[Field] = &[Field::Label, Field::Formula, Field::Note];

/// Policy backed by an explicit set of granted actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPolicy {
    granted: BTreeSet<ResourceAction>,
    fields: Vec<Field>,
}

impl GrantPolicy {
    pub fn new(
        granted: impl IntoIterator<Item = ResourceAction>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Self {
        Self {
            granted: granted.into_iter().collect(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Every action and every attribute.
    pub fn full_access() -> Self {
        Self::new(
            [
                ResourceAction::Index,
                ResourceAction::Create,
                ResourceAction::Update,
                ResourceAction::Destroy,
            ],
            ALL_FIELDS.iter().copied(),
        )
    }

    /// Listing only; nothing is writable.
    pub fn read_only() -> Self {
        Self::new([ResourceAction::Index], [])
    }
}

impl AuthorizationPolicy for GrantPolicy {
    fn authorize(&self, action: ResourceAction) -> Result<(), NotAuthorized> {
        if self.granted.contains(&action) {
            Ok(())
        } else {
            Err(NotAuthorized(action))
        }
    }

    fn permitted_fields(&self) -> &[Field] {
        &self.fields
    }
}
