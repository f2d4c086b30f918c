use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::cell::Cell;
use std::time::{Duration, Instant};
use termdesk_core::client::{ApiError, ApiResult, ContractTermApi, LocalTransport, ResourceClient};
use termdesk_core::controller::prompt::RecordingPrompt;
use termdesk_core::controller::{
    ContractTermsController, ControllerError, DeleteOutcome, UpdateOutcome, CREATED_MESSAGE,
    DELETED_MESSAGE, DELETE_QUESTION, EMPTY_MESSAGE, SAVED_MESSAGE,
};
use termdesk_core::db::open_db_in_memory;
use termdesk_core::endpoint::policy::GrantPolicy;
use termdesk_core::endpoint::ResourceEndpoint;
use termdesk_core::model::contract_term::{ContractTermId, Field, FieldErrors};
use termdesk_core::model::listing::ListParams;
use termdesk_core::session::CsrfToken;
use termdesk_core::{ContractTerm, ContractTermFields, SqliteContractTermRepository};

type LocalApi<'conn> =
    ResourceClient<LocalTransport<SqliteContractTermRepository<'conn>, GrantPolicy>>;
type Controller<'conn> = ContractTermsController<CountingApi<LocalApi<'conn>>, RecordingPrompt>;

/// Counts every call that reaches the API.
struct CountingApi<A> {
    inner: A,
    calls: Cell<usize>,
}

impl<A> CountingApi<A> {
    fn bump(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl<A: ContractTermApi> ContractTermApi for CountingApi<A> {
    fn list(&self, csrf: &CsrfToken, params: &ListParams) -> ApiResult<Vec<ContractTerm>> {
        self.bump();
        self.inner.list(csrf, params)
    }

    fn create(&self, csrf: &CsrfToken, fields: &ContractTermFields) -> ApiResult<ContractTerm> {
        self.bump();
        self.inner.create(csrf, fields)
    }

    fn update(
        &self,
        csrf: &CsrfToken,
        id: ContractTermId,
        fields: &ContractTermFields,
    ) -> ApiResult<ContractTerm> {
        self.bump();
        self.inner.update(csrf, id, fields)
    }

    fn delete(&self, csrf: &CsrfToken, id: ContractTermId) -> ApiResult<()> {
        self.bump();
        self.inner.delete(csrf, id)
    }
}

/// Rejects every write with a server-side validation failure.
struct RejectingApi;

impl ContractTermApi for RejectingApi {
    fn list(&self, _csrf: &CsrfToken, _params: &ListParams) -> ApiResult<Vec<ContractTerm>> {
        Ok(Vec::new())
    }

    fn create(&self, _csrf: &CsrfToken, _fields: &ContractTermFields) -> ApiResult<ContractTerm> {
        let mut errors = FieldErrors::new();
        errors.add(Field::Label, "has already been taken");
        Err(ApiError::Validation(errors))
    }

    fn update(
        &self,
        _csrf: &CsrfToken,
        _id: ContractTermId,
        _fields: &ContractTermFields,
    ) -> ApiResult<ContractTerm> {
        Err(ApiError::NotFound("Couldn't find contract term".to_string()))
    }

    fn delete(&self, _csrf: &CsrfToken, _id: ContractTermId) -> ApiResult<()> {
        Ok(())
    }
}

fn controller_with_tokens<'conn>(
    conn: &'conn Connection,
    server_token: CsrfToken,
    client_token: CsrfToken,
) -> Controller<'conn> {
    let repo = SqliteContractTermRepository::try_new(conn).unwrap();
    let endpoint = ResourceEndpoint::new(repo, GrantPolicy::full_access(), server_token);
    let api = CountingApi {
        inner: ResourceClient::new(LocalTransport::new(endpoint)),
        calls: Cell::new(0),
    };
    ContractTermsController::new(api, RecordingPrompt::confirming(), client_token)
}

fn controller(conn: &Connection) -> Controller<'_> {
    let csrf = CsrfToken::generate();
    controller_with_tokens(conn, csrf.clone(), csrf)
}

fn seeded<'c>(conn: &'c Connection, labels: &[&str]) -> Controller<'c> {
    let mut controller = controller(conn);
    for label in labels {
        controller
            .create(ContractTermFields::new(*label, "{app_usage}*1"))
            .unwrap();
    }
    controller.load().unwrap();
    controller
}

static CLOCK_START: Lazy<Instant> = Lazy::new(Instant::now);

fn fixed_clock() -> Instant {
    *CLOCK_START
}

fn labels(terms: &[ContractTerm]) -> Vec<&str> {
    terms.iter().map(|term| term.label.as_str()).collect()
}

fn calls(controller: &Controller<'_>) -> usize {
    controller.api().calls.get()
}

#[test]
fn create_then_load_contains_matching_record() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = controller(&conn);

    let fields = ContractTermFields::new("Usage", "{app_usage} * 1000 / 12525255 * 10%")
        .with_note("pool share");
    let created = controller.create(fields.clone()).unwrap();
    controller.load().unwrap();

    let loaded = controller
        .data()
        .iter()
        .find(|term| term.id == created.id)
        .unwrap();
    assert_eq!(loaded.fields(), fields);
}

#[test]
fn create_prepends_resets_search_and_highlights() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["Alpha", "beta"]);
    controller.search("beta");
    assert_eq!(controller.filtered().len(), 1);

    let created = controller
        .create(ContractTermFields::new(
            "Install Fee",
            "{app_install_count}*0.52",
        ))
        .unwrap();

    assert_eq!(controller.data()[0].label, "Install Fee");
    assert_eq!(controller.data().len(), 3);
    assert_eq!(controller.search_query(), "");
    assert_eq!(controller.filtered(), controller.data());
    assert!(controller.is_highlighted(created.id, Instant::now()));
    let later = Instant::now() + Duration::from_secs(3);
    assert_eq!(controller.highlight_alpha(created.id, later), None);
    assert_eq!(
        controller.prompt().successes.last().map(String::as_str),
        Some(CREATED_MESSAGE)
    );
}

#[test]
fn highlights_start_at_the_injected_clock() {
    let conn = open_db_in_memory().unwrap();
    let step = Duration::from_millis(200);
    let mut controller = controller(&conn)
        .with_highlight_step(step)
        .with_clock(fixed_clock);

    let created = controller
        .create(ContractTermFields::new("Install Fee", "{app_install_count}*0.52"))
        .unwrap();
    assert_eq!(controller.highlight_alpha(created.id, fixed_clock()), Some(1.0));
    assert_eq!(controller.highlight_alpha(created.id, fixed_clock() + step), Some(0.9));
    assert_eq!(controller.highlight_alpha(created.id, fixed_clock() + step * 11), None);

    let outcome = controller
        .update(created.id, ContractTermFields::new("Install Fee v2", "1"))
        .unwrap();
    let UpdateOutcome::Saved(saved) = outcome else {
        panic!("expected a saved record");
    };
    assert_eq!(controller.highlight_alpha(saved.id, fixed_clock() + step * 5), Some(0.5));
    assert_eq!(controller.tick(fixed_clock() + step * 11), vec![saved.id]);
    assert!(!controller.is_highlighted(saved.id, fixed_clock()));
}

#[test]
fn blank_fields_are_rejected_without_a_request() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = controller(&conn);

    let err = controller
        .create(ContractTermFields::new("Fee", "   "))
        .unwrap_err();
    match &err {
        ControllerError::Invalid(errors) => {
            assert!(errors.has(Field::Formula));
            assert!(!errors.has(Field::Label));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.field_errors().is_some());
    assert_eq!(calls(&controller), 0);
    assert!(controller.prompt().alerts.is_empty());
}

#[test]
fn empty_search_shows_everything() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["Alpha", "beta", "Gamma"]);

    controller.search("zzz");
    assert!(controller.filtered().is_empty());
    controller.search("");
    assert_eq!(controller.filtered(), controller.data());
    controller.search("a");
    controller.clear_search();
    assert_eq!(controller.filtered(), controller.data());
}

#[test]
fn search_is_a_case_insensitive_subset() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["Install Fee", "Usage", "install bonus", "Flat"]);

    controller.search("INSTALL");
    assert_eq!(controller.filtered().len(), 2);
    for term in controller.filtered() {
        assert!(term.label.to_lowercase().contains("install"));
        assert!(controller.data().contains(term));
    }
}

#[test]
fn alpha_beta_search_scenario() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["Alpha", "beta"]);

    controller.search("a");
    assert_eq!(controller.filtered().len(), 2);
    controller.search("z");
    assert!(controller.filtered().is_empty());
}

#[test]
fn sort_descending_is_the_inverse_of_ascending() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["beta", "Alpha", "delta", "Charlie"]);

    controller.sort(true);
    let ascending: Vec<ContractTerm> = controller.filtered().to_vec();
    assert_eq!(labels(&ascending), vec!["Alpha", "beta", "Charlie", "delta"]);

    controller.sort(false);
    let mut descending = controller.filtered().to_vec();
    descending.reverse();
    assert_eq!(descending, ascending);
}

#[test]
fn toggle_sort_alternates_starting_ascending() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["b", "a", "c"]);
    let before: Vec<ContractTerm> = controller.data().to_vec();

    assert!(controller.toggle_sort());
    assert_eq!(labels(controller.filtered()), vec!["a", "b", "c"]);
    assert!(!controller.toggle_sort());
    assert_eq!(labels(controller.filtered()), vec!["c", "b", "a"]);
    assert!(controller.toggle_sort());
    assert_eq!(controller.data(), before.as_slice());
}

#[test]
fn update_replaces_record_in_place() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["Alpha", "beta", "gamma"]);
    let target = controller.data()[1].clone();

    let outcome = controller
        .update(
            target.id,
            ContractTermFields::new("beta v2", target.formula.clone()).with_note("changed"),
        )
        .unwrap();

    let UpdateOutcome::Saved(saved) = outcome else {
        panic!("expected a saved record");
    };
    assert_eq!(saved.id, target.id);
    assert_eq!(labels(controller.data()), vec!["Alpha", "beta v2", "gamma"]);
    assert_eq!(controller.filtered()[1], saved);
    assert_eq!(saved.note.as_deref(), Some("changed"));
    assert!(controller.is_highlighted(saved.id, Instant::now()));
    assert_eq!(
        controller.prompt().successes.last().map(String::as_str),
        Some(SAVED_MESSAGE)
    );
}

// Only label and formula are compared by the no-op guard, so an edit that
// changes nothing but the note is never sent.
#[test]
fn note_only_update_issues_no_request() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["Fee"]);
    let target = controller.data()[0].clone();
    let before = calls(&controller);

    let outcome = controller
        .update(
            target.id,
            ContractTermFields::new(target.label.clone(), target.formula.clone()).with_note("new"),
        )
        .unwrap();

    assert_eq!(outcome, UpdateOutcome::Unchanged);
    assert_eq!(calls(&controller), before);
    assert_eq!(controller.data()[0].note, None);
}

#[test]
fn delete_requires_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = seeded(&conn, &["a", "b", "c"]);
    let before: Vec<ContractTerm> = controller.data().to_vec();
    let target = before[1].id;

    controller.prompt_mut().confirm_answer = false;
    assert_eq!(controller.delete(target).unwrap(), DeleteOutcome::Cancelled);
    assert_eq!(controller.data(), before.as_slice());
    assert_eq!(controller.prompt().questions, vec![DELETE_QUESTION.to_string()]);

    controller.prompt_mut().confirm_answer = true;
    assert_eq!(controller.delete(target).unwrap(), DeleteOutcome::Deleted);
    let remaining: Vec<ContractTermId> = controller.data().iter().map(|term| term.id).collect();
    assert_eq!(remaining, vec![before[0].id, before[2].id]);
    assert!(controller.filtered().iter().all(|term| term.id != target));
    assert_eq!(controller.prompt().successes.last().map(String::as_str), Some(DELETED_MESSAGE));

    controller.load().unwrap();
    assert_eq!(controller.data().len(), 2);
}

#[test]
fn deleting_a_highlighted_row_cancels_its_highlight() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = controller(&conn);
    let created = controller.create(ContractTermFields::new("a", "1")).unwrap();

    controller.delete(created.id).unwrap();
    assert!(!controller.is_highlighted(created.id, Instant::now()));
}

#[test]
fn rejected_token_alerts_and_leaves_state_unset() {
    let conn = open_db_in_memory().unwrap();
    let mut controller =
        controller_with_tokens(&conn, CsrfToken::generate(), CsrfToken::generate());

    let err = controller.load().unwrap_err();
    assert!(matches!(err, ControllerError::Api(ApiError::Rejected { .. })));
    assert!(!controller.is_loaded());
    assert_eq!(controller.empty_message(), None);

    let (context, detail) = &controller.prompt().alerts[0];
    assert_eq!(
        context,
        "Something went wrong when trying to fetch the contract terms:"
    );
    assert!(detail.contains("invalid authenticity token"));

    assert!(controller.create(ContractTermFields::new("a", "1")).is_err());
    assert!(controller.data().is_empty());
    assert_eq!(controller.prompt().alerts.len(), 2);
}

#[test]
fn server_validation_errors_are_returned_without_alert() {
    let mut controller = ContractTermsController::new(
        RejectingApi,
        RecordingPrompt::confirming(),
        CsrfToken::generate(),
    );
    controller.load().unwrap();

    let err = controller
        .create(ContractTermFields::new("Fee", "1"))
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.messages(Field::Label), ["has already been taken"]);
    assert!(controller.prompt().alerts.is_empty());
    assert!(controller.data().is_empty());

    let missing = controller
        .update(9, ContractTermFields::new("x", "y"))
        .unwrap_err();
    assert!(missing.field_errors().is_none());
    assert_eq!(controller.prompt().alerts.len(), 1);
}

#[test]
fn empty_message_only_after_successful_load() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = controller(&conn);
    assert_eq!(controller.empty_message(), None);

    controller.load().unwrap();
    assert_eq!(controller.empty_message(), Some(EMPTY_MESSAGE));

    controller.create(ContractTermFields::new("a", "1")).unwrap();
    assert_eq!(controller.empty_message(), None);
}

#[test]
fn tick_sweeps_finished_highlights() {
    let conn = open_db_in_memory().unwrap();
    let mut controller = controller(&conn).with_highlight_step(Duration::from_millis(1));
    let created = controller.create(ContractTermFields::new("a", "1")).unwrap();

    let finished = controller.tick(Instant::now() + Duration::from_secs(1));
    assert_eq!(finished, vec![created.id]);
    assert!(!controller.is_highlighted(created.id, Instant::now()));
}
