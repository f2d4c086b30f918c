//! Form state for the "new contract term" dialog and the inline row editor.
//!
//! Both forms keep a draft plus one error flag per required field. Editing a
//! flagged field clears its flag; submitting re-validates every field.

use crate::model::contract_term::{ContractTerm, ContractTermFields, Field, FieldErrors};

/// Placeholder text for an input, reflecting its error flag.
pub fn placeholder(field: Field, has_error: bool) -> &'static str {
    match (field, has_error) {
        (Field::Label, true) => "Label can't be blank",
        (Field::Formula, true) => "Formula can't be blank",
        (Field::Label, false) => "Label",
        (Field::Formula, false) => "Formula",
        (Field::Note, _) => "Note",
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ErrorFlags {
    label: bool,
    formula: bool,
}

impl ErrorFlags {
    fn get(self, field: Field) -> bool {
        match field {
            Field::Label => self.label,
            Field::Formula => self.formula,
            Field::Note => false,
        }
    }

    fn clear(&mut self, field: Field) {
        match field {
            Field::Label => self.label = false,
            Field::Formula => self.formula = false,
            Field::Note => {}
        }
    }

    fn from_errors(errors: &FieldErrors) -> Self {
        Self {
            label: errors.has(Field::Label),
            formula: errors.has(Field::Formula),
        }
    }
}

fn set_draft_field(draft: &mut ContractTermFields, field: Field, value: String) {
    match field {
        Field::Label => draft.label = value,
        Field::Formula => draft.formula = value,
        Field::Note => draft.note = Some(value),
    }
}

/// State of the "new contract term" dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTermForm {
    draft: ContractTermFields,
    errors: ErrorFlags,
}

impl NewTermForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ContractTermFields {
        &self.draft
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.errors.get(field)
    }

    /// Stores input for `field` and clears that field's error flag.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        set_draft_field(&mut self.draft, field, value.into());
        self.errors.clear(field);
    }

    /// Validates the draft. On success the form is cleared and the captured
    /// fields are returned for submission.
    pub fn submit(&mut self) -> Option<ContractTermFields> {
        match self.draft.validate() {
            Ok(()) => {
                self.errors = ErrorFlags::default();
                Some(std::mem::take(&mut self.draft))
            }
            Err(errors) => {
                self.errors = ErrorFlags::from_errors(&errors);
                None
            }
        }
    }

    /// Puts a rejected submission back into the form with server-side flags.
    pub fn restore(&mut self, fields: ContractTermFields, errors: &FieldErrors) {
        self.draft = fields;
        self.errors = ErrorFlags::from_errors(errors);
    }
}

/// Outcome of saving a row editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveDecision {
    /// At least one required field is blank; flags were set.
    Invalid,
    /// Label and formula match the record; nothing is submitted.
    Unchanged,
    /// Submit these fields as an update.
    Submit(ContractTermFields),
}

/// Inline editor attached to one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEditor {
    record: ContractTerm,
    draft: ContractTermFields,
    editing: bool,
    errors: ErrorFlags,
}

impl RowEditor {
    pub fn new(record: &ContractTerm) -> Self {
        Self {
            record: record.clone(),
            draft: record.fields(),
            editing: false,
            errors: ErrorFlags::default(),
        }
    }

    pub fn record(&self) -> &ContractTerm {
        &self.record
    }

    pub fn draft(&self) -> &ContractTermFields {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.errors.get(field)
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        set_draft_field(&mut self.draft, field, value.into());
        self.errors.clear(field);
    }

    /// Leaves edit mode and discards the draft.
    pub fn cancel(&mut self) {
        self.editing = false;
        self.errors = ErrorFlags::default();
        self.draft = self.record.fields();
    }

    /// Validates the draft and applies the no-op guard.
    ///
    /// Only label and formula are compared against the record: a draft that
    /// changes nothing but the note yields `Unchanged`.
    pub fn save(&mut self) -> SaveDecision {
        if let Err(errors) = self.draft.validate() {
            self.errors = ErrorFlags::from_errors(&errors);
            return SaveDecision::Invalid;
        }
        self.errors = ErrorFlags::default();

        if self.draft.same_label_and_formula(&self.record) {
            SaveDecision::Unchanged
        } else {
            SaveDecision::Submit(self.draft.clone())
        }
    }

    /// Marks flags from a server-side validation failure.
    pub fn apply_server_errors(&mut self, errors: &FieldErrors) {
        self.errors = ErrorFlags::from_errors(errors);
    }

    /// Follows the record after the list changed. Leaves edit mode when any
    /// displayed field differs from what the editor was showing.
    pub fn sync(&mut self, record: &ContractTerm) {
        if record.label != self.record.label
            || record.formula != self.record.formula
            || record.note != self.record.note
        {
            self.editing = false;
            self.errors = ErrorFlags::default();
            self.record = record.clone();
            self.draft = record.fields();
        }
    }
}
