//! Contract term record and its writable field set.
//!
//! # Responsibility
//! - Define the wire/storage shape `{id, label, formula, note}`.
//! - Validate required fields before any create/update leaves the caller.
//!
//! # Invariants
//! - `id` is assigned by the server and never changes for a record.
//! - `label` and `formula` must be non-blank; `note` is optional.
//! - A blank `note` is equivalent to an absent note after normalization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Server-assigned record identifier.
pub type ContractTermId = i64;

/// Message attached to a required field that is blank.
pub const BLANK_MESSAGE: &str = "can't be blank";

/// One persisted contract term as returned by the resource endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerm {
    pub id: ContractTermId,
    pub label: String,
    pub formula: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl ContractTerm {
    /// Returns the writable field set of this record.
    pub fn fields(&self) -> ContractTermFields {
        ContractTermFields {
            label: self.label.clone(),
            formula: self.formula.clone(),
            note: self.note.clone(),
        }
    }

    /// Note text for display; `-` when the record has no note.
    pub fn display_note(&self) -> &str {
        match self.note.as_deref() {
            Some(note) if !note.trim().is_empty() => note,
            _ => "-",
        }
    }
}

/// Writable fields sent in create/update request bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTermFields {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl ContractTermFields {
    pub fn new(label: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            formula: formula.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Checks the required-field invariant.
    ///
    /// # Errors
    /// - Returns every blank required field, not just the first one.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.label.trim().is_empty() {
            errors.add(Field::Label, BLANK_MESSAGE);
        }
        if self.formula.trim().is_empty() {
            errors.add(Field::Formula, BLANK_MESSAGE);
        }
        errors.into_result()
    }

    /// Collapses a blank note into `None`.
    pub fn normalized(mut self) -> Self {
        if self
            .note
            .as_deref()
            .is_some_and(|note| note.trim().is_empty())
        {
            self.note = None;
        }
        self
    }

    /// Whether `label` and `formula` match the given record exactly.
    ///
    /// `note` is deliberately not part of this comparison; the row editor
    /// uses it to skip no-op saves.
    pub fn same_label_and_formula(&self, term: &ContractTerm) -> bool {
        self.label == term.label && self.formula == term.formula
    }
}

/// Writable field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Label,
    Formula,
    Note,
}

impl Field {
    /// Stable wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Formula => "formula",
            Self::Note => "note",
        }
    }

    /// Capitalized name used in user-facing messages.
    pub fn human_name(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::Formula => "Formula",
            Self::Note => "Note",
        }
    }
}

/// Field-level validation messages, serialized as `{"label": ["can't be blank"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message for `field`.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0
            .entry(field.as_str().to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Whether at least one message exists for `field`.
    pub fn has(&self, field: Field) -> bool {
        !self.messages(field).is_empty()
    }

    pub fn messages(&self, field: Field) -> &[String] {
        self.0
            .get(field.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates `(field_name, messages)` pairs, including keys the server
    /// sent that do not map to a known [`Field`].
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{field} {message}")?;
            }
        }
        Ok(())
    }
}

impl Error for FieldErrors {}
