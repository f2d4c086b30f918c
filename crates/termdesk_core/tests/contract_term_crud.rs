use termdesk_core::db::open_db_in_memory;
use termdesk_core::model::listing::{ListParams, ListQuery, SortDirection, PER_PAGE_MAX};
use termdesk_core::{
    ContractTermFields, ContractTermRepository, ContractTermService, Field, RepoError,
    ServiceError, SqliteContractTermRepository,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let fields = ContractTermFields::new("Install Fee", "{app_install_count}*0.52").with_note("q3");
    let id = repo.create_term(&fields).unwrap();

    let loaded = repo.get_term(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.label, "Install Fee");
    assert_eq!(loaded.formula, "{app_install_count}*0.52");
    assert_eq!(loaded.note.as_deref(), Some("q3"));
}

#[test]
fn ids_are_server_assigned_and_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let first = repo.create_term(&ContractTermFields::new("a", "1")).unwrap();
    let second = repo.create_term(&ContractTermFields::new("a", "1")).unwrap();
    assert_ne!(first, second);
}

#[test]
fn blank_note_is_stored_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let id = repo
        .create_term(&ContractTermFields::new("Fee", "1").with_note("   "))
        .unwrap();
    let stored: Option<String> = conn
        .query_row("SELECT note FROM contract_terms WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(stored, None);
}

#[test]
fn create_rejects_blank_required_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let err = repo
        .create_term(&ContractTermFields::new(" ", ""))
        .unwrap_err();
    match err {
        RepoError::Validation(errors) => {
            assert!(errors.has(Field::Label));
            assert!(errors.has(Field::Formula));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn update_and_delete_missing_ids_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let update = repo.update_term(404, &ContractTermFields::new("a", "1"));
    assert!(matches!(update, Err(RepoError::NotFound(404))));
    assert!(matches!(repo.delete_term(404), Err(RepoError::NotFound(404))));
}

#[test]
fn delete_is_permanent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let id = repo.create_term(&ContractTermFields::new("a", "1")).unwrap();
    repo.delete_term(id).unwrap();
    assert!(repo.get_term(id).unwrap().is_none());
    assert!(matches!(repo.delete_term(id), Err(RepoError::NotFound(_))));
}

#[test]
fn list_orders_by_label_case_insensitively_with_id_tiebreak() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();

    let beta = repo.create_term(&ContractTermFields::new("beta", "1")).unwrap();
    let alpha = repo.create_term(&ContractTermFields::new("Alpha", "1")).unwrap();
    let alpha_again = repo.create_term(&ContractTermFields::new("alpha", "2")).unwrap();

    let ascending = repo.list_terms(&ListQuery::default()).unwrap();
    let ids: Vec<i64> = ascending.iter().map(|term| term.id).collect();
    assert_eq!(ids, vec![alpha, alpha_again, beta]);

    let descending = repo
        .list_terms(&ListQuery {
            direction: SortDirection::Desc,
            ..ListQuery::default()
        })
        .unwrap();
    let ids: Vec<i64> = descending.iter().map(|term| term.id).collect();
    assert_eq!(ids, vec![beta, alpha, alpha_again]);
}

#[test]
fn list_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContractTermRepository::try_new(&conn).unwrap();
    for label in ["a", "b", "c", "d", "e"] {
        repo.create_term(&ContractTermFields::new(label, "1")).unwrap();
    }

    let query = ListQuery {
        page: 2,
        per_page: 2,
        ..ListQuery::default()
    };
    let labels: Vec<String> = repo
        .list_terms(&query)
        .unwrap()
        .into_iter()
        .map(|term| term.label)
        .collect();
    assert_eq!(labels, vec!["c", "d"]);

    let past_end = ListQuery {
        page: 9,
        per_page: 2,
        ..ListQuery::default()
    };
    assert!(repo.list_terms(&past_end).unwrap().is_empty());
}

#[test]
fn service_returns_persisted_record_after_writes() {
    let conn = open_db_in_memory().unwrap();
    let service = ContractTermService::new(SqliteContractTermRepository::try_new(&conn).unwrap());

    let created = service
        .create_term(ContractTermFields::new("Usage", "{app_usage}*1").with_note(""))
        .unwrap();
    assert_eq!(created.note, None);

    let updated = service
        .update_term(
            created.id,
            ContractTermFields::new("Usage v2", "{app_usage}*2").with_note("raised"),
        )
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.label, "Usage v2");
    assert_eq!(updated.note.as_deref(), Some("raised"));

    let listed = service.list_terms(&ListParams::default()).unwrap();
    assert_eq!(listed, vec![updated]);
}

#[test]
fn service_maps_repository_failures() {
    let conn = open_db_in_memory().unwrap();
    let service = ContractTermService::new(SqliteContractTermRepository::try_new(&conn).unwrap());

    match service.update_term(7, ContractTermFields::new("a", "1")) {
        Err(ServiceError::NotFound(7)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
    match service.create_term(ContractTermFields::new("a", " ")) {
        Err(ServiceError::Validation(errors)) => {
            assert!(!errors.has(Field::Label));
            assert_eq!(errors.messages(Field::Formula), ["can't be blank"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(service.delete_term(7), Err(ServiceError::NotFound(7))));
}

#[test]
fn service_clamps_oversized_pages() {
    let conn = open_db_in_memory().unwrap();
    let service = ContractTermService::new(SqliteContractTermRepository::try_new(&conn).unwrap());
    for index in 0..(PER_PAGE_MAX + 5) {
        service
            .create_term(ContractTermFields::new(format!("term {index:03}"), "1"))
            .unwrap();
    }

    let params = ListParams {
        per_page: Some(10_000),
        ..ListParams::default()
    };
    assert_eq!(service.list_terms(&params).unwrap().len(), PER_PAGE_MAX as usize);
}
