//! View-state controller for the contract terms screen.
//!
//! # Responsibility
//! - Own the client-side record cache and the derived filtered/sorted view.
//! - Issue list/create/update/delete calls through [`ContractTermApi`].
//! - Merge confirmed server responses into local state and start highlights.
//!
//! # Invariants
//! - Local state changes only after the server confirmed a mutation.
//! - `filtered` never holds a record that is absent from the cache.
//! - Validation failures go back to the caller for inline display; every
//!   other failure is alerted with the raw server message.

pub mod cache;
pub mod form;
pub mod highlight;
pub mod prompt;
pub mod view;

use crate::client::{ApiError, ContractTermApi};
use crate::model::contract_term::{ContractTerm, ContractTermFields, ContractTermId, FieldErrors};
use crate::model::listing::ListParams;
use crate::session::CsrfToken;
use cache::RecordCache;
use highlight::Highlights;
use prompt::UserPrompt;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

pub const EMPTY_MESSAGE: &str = "There aren't any Contract Terms yet.";
pub const DELETE_QUESTION: &str = "Are you sure you want to delete this contract?";
pub const CREATED_MESSAGE: &str = "The contract was created successfully.";
pub const SAVED_MESSAGE: &str = "The contract was saved successfully.";
pub const DELETED_MESSAGE: &str = "The contract was deleted.";

const LOAD_FAILED: &str = "Something went wrong when trying to fetch the contract terms:";
const CREATE_FAILED: &str = "Something went wrong when trying to create the contract:";
const SAVE_FAILED: &str = "Something went wrong when trying to save the contract:";
const DELETE_FAILED: &str = "Something went wrong when trying to delete the contract:";

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Rejected before any request was sent.
    Invalid(FieldErrors),
    Api(ApiError),
}

impl ControllerError {
    /// Field errors to show inline, from either side of the wire.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) | Self::Api(ApiError::Validation(errors)) => Some(errors),
            Self::Api(_) => None,
        }
    }
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "invalid input: {errors}"),
            Self::Api(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Api(err) => Some(err),
        }
    }
}

impl From<ApiError> for ControllerError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Saved(ContractTerm),
    /// Label and formula matched the cached record; no request was sent.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation.
    Cancelled,
}

pub struct ContractTermsController<A: ContractTermApi, P: UserPrompt> {
    api: A,
    prompt: P,
    csrf: CsrfToken,
    list_params: ListParams,
    cache: RecordCache,
    filtered: Vec<ContractTerm>,
    search_query: String,
    next_sort_ascending: bool,
    highlights: Highlights,
    clock: fn() -> Instant,
    loaded: bool,
}

impl<A: ContractTermApi, P: UserPrompt> ContractTermsController<A, P> {
    pub fn new(api: A, prompt: P, csrf: CsrfToken) -> Self {
        Self {
            api,
            prompt,
            csrf,
            list_params: ListParams::default(),
            cache: RecordCache::new(),
            filtered: Vec::new(),
            search_query: String::new(),
            next_sort_ascending: true,
            highlights: Highlights::default(),
            clock: Instant::now,
            loaded: false,
        }
    }

    /// Server-side list parameters used by [`Self::load`].
    pub fn with_list_params(mut self, params: ListParams) -> Self {
        self.list_params = params;
        self
    }

    pub fn with_highlight_step(mut self, step: Duration) -> Self {
        self.highlights = Highlights::new(step);
        self
    }

    /// Time source that stamps the start of create/update highlights.
    pub fn with_clock(mut self, clock: fn() -> Instant) -> Self {
        self.clock = clock;
        self
    }

    /// Fetches the list and resets both the cache and the view to it.
    ///
    /// On failure the user is alerted and local state is left untouched.
    pub fn load(&mut self) -> ControllerResult<()> {
        let records = match self.api.list(&self.csrf, &self.list_params) {
            Ok(records) => records,
            Err(err) => return Err(self.fail(LOAD_FAILED, err)),
        };
        self.cache.replace_all(records);
        self.search_query.clear();
        self.filtered = self.cache.records().to_vec();
        self.loaded = true;
        log::info!(
            "event=terms_load module=controller status=ok count={}",
            self.cache.len()
        );
        Ok(())
    }

    /// Filters the view by label. A blank query shows every cached record.
    pub fn search(&mut self, query: &str) {
        self.search_query = query.to_string();
        self.filtered = view::filter_by_label(self.cache.records(), query);
    }

    pub fn clear_search(&mut self) {
        self.search("");
    }

    /// Reorders the current view by label; the cache keeps server order.
    pub fn sort(&mut self, ascending: bool) {
        view::sort_by_label(&mut self.filtered, ascending);
    }

    /// Sorts in the pending direction, then inverts it for the next call.
    /// Returns the direction that was applied.
    pub fn toggle_sort(&mut self) -> bool {
        let ascending = self.next_sort_ascending;
        self.sort(ascending);
        self.next_sort_ascending = !ascending;
        ascending
    }

    pub fn create(&mut self, fields: ContractTermFields) -> ControllerResult<ContractTerm> {
        let fields = fields.normalized();
        fields.validate().map_err(ControllerError::Invalid)?;

        let created = match self.api.create(&self.csrf, &fields) {
            Ok(created) => created,
            Err(err) => return Err(self.fail(CREATE_FAILED, err)),
        };

        self.cache.prepend(created.clone());
        self.search_query.clear();
        self.filtered = self.cache.records().to_vec();
        self.prompt.notify_success(CREATED_MESSAGE);
        self.highlights.start(created.id, (self.clock)());
        log::info!(
            "event=term_create module=controller status=ok id={}",
            created.id
        );
        Ok(created)
    }

    /// Submits label/formula/note for `id`.
    ///
    /// Skips the request when label and formula equal the cached record.
    /// The note is not compared, so a note-only edit is never sent.
    pub fn update(
        &mut self,
        id: ContractTermId,
        fields: ContractTermFields,
    ) -> ControllerResult<UpdateOutcome> {
        let fields = fields.normalized();
        fields.validate().map_err(ControllerError::Invalid)?;

        if let Some(current) = self.cache.get(id) {
            if fields.same_label_and_formula(current) {
                log::debug!("event=term_update module=controller status=unchanged id={id}");
                return Ok(UpdateOutcome::Unchanged);
            }
        }

        let saved = match self.api.update(&self.csrf, id, &fields) {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail(SAVE_FAILED, err)),
        };

        self.cache.upsert_by_id(saved.clone());
        if let Some(slot) = self.filtered.iter_mut().find(|record| record.id == saved.id) {
            *slot = saved.clone();
        }
        self.prompt.notify_success(SAVED_MESSAGE);
        self.highlights.start(saved.id, (self.clock)());
        log::info!("event=term_update module=controller status=ok id={id}");
        Ok(UpdateOutcome::Saved(saved))
    }

    /// Deletes `id` after explicit confirmation.
    pub fn delete(&mut self, id: ContractTermId) -> ControllerResult<DeleteOutcome> {
        if !self.prompt.confirm(DELETE_QUESTION) {
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(err) = self.api.delete(&self.csrf, id) {
            return Err(self.fail(DELETE_FAILED, err));
        }

        self.cache.remove_by_id(id);
        self.filtered.retain(|record| record.id != id);
        self.highlights.cancel(id);
        self.prompt.notify_success(DELETED_MESSAGE);
        log::info!("event=term_delete module=controller status=ok id={id}");
        Ok(DeleteOutcome::Deleted)
    }

    /// Drops finished highlights; returns the ids whose fade ended.
    pub fn tick(&mut self, now: Instant) -> Vec<ContractTermId> {
        self.highlights.sweep(now)
    }

    pub fn is_highlighted(&self, id: ContractTermId, now: Instant) -> bool {
        self.highlights.is_active(id, now)
    }

    pub fn highlight_alpha(&self, id: ContractTermId, now: Instant) -> Option<f32> {
        self.highlights.alpha(id, now)
    }

    /// Full cached list in server order, newest creations first.
    pub fn data(&self) -> &[ContractTerm] {
        self.cache.records()
    }

    /// Current view after search and sort.
    pub fn filtered(&self) -> &[ContractTerm] {
        &self.filtered
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Message to show instead of the table, if any.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.loaded && self.cache.is_empty() {
            Some(EMPTY_MESSAGE)
        } else {
            None
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    fn fail(&mut self, context: &str, err: ApiError) -> ControllerError {
        match &err {
            ApiError::Validation(errors) => {
                log::debug!(
                    "event=controller_validation module=controller status=rejected fields={}",
                    errors.iter().count()
                );
            }
            _ => {
                log::warn!("event=controller_request module=controller status=error error={err}");
                self.prompt.alert(context, &err.to_string());
            }
        }
        ControllerError::Api(err)
    }
}
