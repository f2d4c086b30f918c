//! Contract term repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and paginated listing over the `contract_terms` table.
//! - Reject invalid persisted rows instead of masking them.
//!
//! # Invariants
//! - Create/update call `ContractTermFields::validate()` before SQL mutations.
//! - Blank notes are stored as `NULL`.
//! - List order is `label COLLATE NOCASE <direction>, id ASC`.

use crate::db::DbError;
use crate::model::contract_term::{ContractTerm, ContractTermFields, ContractTermId, FieldErrors};
use crate::model::listing::{ListQuery, SortColumn, SortDirection};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TERM_SELECT_SQL: &str = "SELECT
    id,
    label,
    formula,
    note
FROM contract_terms";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contract term persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(FieldErrors),
    Db(DbError),
    NotFound(ContractTermId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contract term not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted contract term data: {message}")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<FieldErrors> for RepoError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contract term CRUD operations.
pub trait ContractTermRepository {
    /// Inserts one record and returns its server-assigned id.
    fn create_term(&self, fields: &ContractTermFields) -> RepoResult<ContractTermId>;
    /// Replaces label, formula and note of an existing record.
    fn update_term(&self, id: ContractTermId, fields: &ContractTermFields) -> RepoResult<()>;
    fn get_term(&self, id: ContractTermId) -> RepoResult<Option<ContractTerm>>;
    /// Lists one page of records in the requested order.
    fn list_terms(&self, query: &ListQuery) -> RepoResult<Vec<ContractTerm>>;
    /// Permanently removes one record.
    fn delete_term(&self, id: ContractTermId) -> RepoResult<()>;
}

/// SQLite-backed contract term repository.
pub struct SqliteContractTermRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContractTermRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "contract_terms")? {
            return Err(RepoError::MissingRequiredTable("contract_terms"));
        }
        Ok(Self { conn })
    }
}

impl ContractTermRepository for SqliteContractTermRepository<'_> {
    fn create_term(&self, fields: &ContractTermFields) -> RepoResult<ContractTermId> {
        fields.validate()?;

        self.conn.execute(
            "INSERT INTO contract_terms (label, formula, note) VALUES (?1, ?2, ?3);",
            params![
                fields.label.as_str(),
                fields.formula.as_str(),
                stored_note(fields),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_term(&self, id: ContractTermId, fields: &ContractTermFields) -> RepoResult<()> {
        fields.validate()?;

        let changed = self.conn.execute(
            "UPDATE contract_terms
             SET
                label = ?2,
                formula = ?3,
                note = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                fields.label.as_str(),
                fields.formula.as_str(),
                stored_note(fields),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_term(&self, id: ContractTermId) -> RepoResult<Option<ContractTerm>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TERM_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_term_row(row)?));
        }

        Ok(None)
    }

    fn list_terms(&self, query: &ListQuery) -> RepoResult<Vec<ContractTerm>> {
        let order_column = match query.sort {
            SortColumn::Label => "label COLLATE NOCASE",
        };
        let order_direction = match query.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        let sql = format!(
            "{TERM_SELECT_SQL}
             ORDER BY {order_column} {order_direction}, id ASC
             LIMIT ?1 OFFSET ?2;"
        );
        let offset = i64::try_from(query.offset())
            .map_err(|_| RepoError::InvalidData(format!("page {} is out of range", query.page)))?;

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![i64::from(query.per_page), offset])?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }

        Ok(terms)
    }

    fn delete_term(&self, id: ContractTermId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contract_terms WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn stored_note(fields: &ContractTermFields) -> Option<&str> {
    fields
        .note
        .as_deref()
        .filter(|note| !note.trim().is_empty())
}

fn parse_term_row(row: &Row<'_>) -> RepoResult<ContractTerm> {
    let term = ContractTerm {
        id: row.get("id")?,
        label: row.get("label")?,
        formula: row.get("formula")?,
        note: row.get("note")?,
    };

    term.fields().validate().map_err(|err| {
        RepoError::InvalidData(format!("row {} violates required fields: {err}", term.id))
    })?;
    Ok(term)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
