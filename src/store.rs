// SQLite persistence for the record layer.
//
// Referential actions are delegated to SQLite: general_accounts.rep_id is
// SET NULL when the rep is deleted, account_holders rows CASCADE with their
// account. Uniqueness of rep_number/account_number is the engine's unique
// constraint, so concurrent duplicate creates resolve to exactly one
// success without app-level locking.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::records::{
    AccountHolder, Address, GeneralAccount, RepCategory, RepCode, Status,
};
use crate::validators::ValidationError;

// ============================================================================
// SAVE ERROR
// ============================================================================

/// Write-time failure taxonomy: field validation, uniqueness, broken
/// reference, or the storage layer itself. A record is either fully valid
/// and persisted or not persisted at all.
#[derive(Debug)]
pub enum SaveError {
    Invalid(Vec<ValidationError>),
    Duplicate { field: &'static str },
    MissingReference { field: &'static str },
    Storage(rusqlite::Error),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Invalid(errors) => {
                write!(f, "validation failed: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            SaveError::Duplicate { field } => {
                write!(f, "duplicate value for unique field '{}'", field)
            }
            SaveError::MissingReference { field } => {
                write!(f, "'{}' does not reference an existing record", field)
            }
            SaveError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SaveError {
    fn from(e: rusqlite::Error) -> Self {
        SaveError::Storage(e)
    }
}

/// Classify a constraint violation by the column named in the engine
/// message; anything else stays a storage error.
fn map_constraint(e: rusqlite::Error, reference_field: &'static str) -> SaveError {
    if let rusqlite::Error::SqliteFailure(err, msg) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            let msg = msg.as_deref().unwrap_or("");
            if msg.contains("FOREIGN KEY") {
                return SaveError::MissingReference {
                    field: reference_field,
                };
            }
            if msg.contains("rep_number") {
                return SaveError::Duplicate { field: "rep_number" };
            }
            if msg.contains("account_number") {
                return SaveError::Duplicate {
                    field: "account_number",
                };
            }
            return SaveError::Duplicate { field: "id" };
        }
    }
    SaveError::Storage(e)
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery; foreign_keys is per-connection and must
    // be on for SET NULL / CASCADE to fire.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS rep_codes (
            id TEXT PRIMARY KEY,
            rep_number TEXT UNIQUE NOT NULL,
            rep_category TEXT NOT NULL,
            name TEXT NOT NULL,
            email_1 TEXT NOT NULL,
            email_2 TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            country TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            zip_code TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            phone_number TEXT NOT NULL DEFAULT '',
            sharing_agreement REAL NOT NULL DEFAULT 100,
            created TEXT NOT NULL,
            modified TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS general_accounts (
            id TEXT PRIMARY KEY,
            account_number TEXT UNIQUE NOT NULL,
            account_name TEXT NOT NULL,
            rep_id TEXT REFERENCES rep_codes(id) ON DELETE SET NULL,
            status TEXT NOT NULL,
            open_date TEXT,
            close_date TEXT,
            account_holders INTEGER NOT NULL DEFAULT 1,
            is_cash INTEGER NOT NULL DEFAULT 0,
            is_margin INTEGER NOT NULL DEFAULT 0,
            option_level INTEGER NOT NULL DEFAULT 0,
            country TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            zip_code TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            phone_number TEXT NOT NULL DEFAULT '',
            created TEXT NOT NULL,
            modified TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS account_holders (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            account_id TEXT NOT NULL REFERENCES general_accounts(id) ON DELETE CASCADE,
            created TEXT NOT NULL,
            modified TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_general_accounts_rep ON general_accounts(rep_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_holders_account ON account_holders(account_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rep_codes_name ON rep_codes(name)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn parse_datetime(s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidQuery)
}

fn parse_date_opt(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
}

fn rep_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepCode> {
    let category: String = row.get(2)?;
    let status: String = row.get(6)?;
    Ok(RepCode {
        id: row.get(0)?,
        rep_number: row.get(1)?,
        rep_category: RepCategory::parse(&category).ok_or(rusqlite::Error::InvalidQuery)?,
        name: row.get(3)?,
        email_1: row.get(4)?,
        email_2: row.get(5)?,
        status: Status::parse(&status).ok_or(rusqlite::Error::InvalidQuery)?,
        address: Address {
            country: row.get(7)?,
            state: row.get(8)?,
            city: row.get(9)?,
            zip_code: row.get(10)?,
            address: row.get(11)?,
            phone_number: row.get(12)?,
        },
        sharing_agreement: row.get(13)?,
        created: parse_datetime(row.get(14)?)?,
        modified: parse_datetime(row.get(15)?)?,
    })
}

const REP_COLUMNS: &str = "id, rep_number, rep_category, name, email_1, email_2, status, \
     country, state, city, zip_code, address, phone_number, sharing_agreement, \
     created, modified";

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GeneralAccount> {
    let status: String = row.get(4)?;
    let open_date: Option<String> = row.get(5)?;
    let close_date: Option<String> = row.get(6)?;
    Ok(GeneralAccount {
        id: row.get(0)?,
        account_number: row.get(1)?,
        account_name: row.get(2)?,
        rep_id: row.get(3)?,
        status: Status::parse(&status).ok_or(rusqlite::Error::InvalidQuery)?,
        open_date: parse_date_opt(open_date),
        close_date: parse_date_opt(close_date),
        account_holders: row.get(7)?,
        is_cash: row.get(8)?,
        is_margin: row.get(9)?,
        option_level: row.get(10)?,
        address: Address {
            country: row.get(11)?,
            state: row.get(12)?,
            city: row.get(13)?,
            zip_code: row.get(14)?,
            address: row.get(15)?,
            phone_number: row.get(16)?,
        },
        created: parse_datetime(row.get(17)?)?,
        modified: parse_datetime(row.get(18)?)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, account_number, account_name, rep_id, status, open_date, \
     close_date, account_holders, is_cash, is_margin, option_level, country, state, city, \
     zip_code, address, phone_number, created, modified";

fn holder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountHolder> {
    Ok(AccountHolder {
        id: row.get(0)?,
        name: row.get(1)?,
        account_id: row.get(2)?,
        created: parse_datetime(row.get(3)?)?,
        modified: parse_datetime(row.get(4)?)?,
    })
}

const HOLDER_COLUMNS: &str = "id, name, account_id, created, modified";

// ============================================================================
// REP CODES
// ============================================================================

pub fn insert_rep_code(conn: &Connection, rep: &RepCode) -> Result<(), SaveError> {
    rep.validate().map_err(SaveError::Invalid)?;

    conn.execute(
        "INSERT INTO rep_codes (
            id, rep_number, rep_category, name, email_1, email_2, status,
            country, state, city, zip_code, address, phone_number,
            sharing_agreement, created, modified
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            rep.id,
            rep.rep_number,
            rep.rep_category.as_str(),
            rep.name,
            rep.email_1,
            rep.email_2,
            rep.status.as_str(),
            rep.address.country,
            rep.address.state,
            rep.address.city,
            rep.address.zip_code,
            rep.address.address,
            rep.address.phone_number,
            rep.sharing_agreement,
            rep.created.to_rfc3339(),
            rep.modified.to_rfc3339(),
        ],
    )
    .map_err(|e| map_constraint(e, "rep_id"))?;

    Ok(())
}

pub fn update_rep_code(conn: &Connection, rep: &mut RepCode) -> Result<(), SaveError> {
    rep.validate().map_err(SaveError::Invalid)?;
    rep.touch();

    let changed = conn
        .execute(
            "UPDATE rep_codes SET
                rep_number = ?2, rep_category = ?3, name = ?4, email_1 = ?5,
                email_2 = ?6, status = ?7, country = ?8, state = ?9, city = ?10,
                zip_code = ?11, address = ?12, phone_number = ?13,
                sharing_agreement = ?14, modified = ?15
             WHERE id = ?1",
            params![
                rep.id,
                rep.rep_number,
                rep.rep_category.as_str(),
                rep.name,
                rep.email_1,
                rep.email_2,
                rep.status.as_str(),
                rep.address.country,
                rep.address.state,
                rep.address.city,
                rep.address.zip_code,
                rep.address.address,
                rep.address.phone_number,
                rep.sharing_agreement,
                rep.modified.to_rfc3339(),
            ],
        )
        .map_err(|e| map_constraint(e, "rep_id"))?;

    if changed == 0 {
        return Err(SaveError::Storage(rusqlite::Error::QueryReturnedNoRows));
    }
    Ok(())
}

pub fn get_rep_code(conn: &Connection, id: &str) -> Result<Option<RepCode>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM rep_codes WHERE id = ?1",
        REP_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], rep_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn get_rep_code_by_number(conn: &Connection, rep_number: &str) -> Result<Option<RepCode>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM rep_codes WHERE rep_number = ?1",
        REP_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![rep_number], rep_from_row)?;
    Ok(rows.next().transpose()?)
}

/// Rep listing for the admin view: optional free-text search over
/// rep_number and name, always ordered by rep_number ascending.
pub fn search_rep_codes(conn: &Connection, query: Option<&str>) -> Result<Vec<RepCode>> {
    let reps = match query {
        Some(q) if !q.is_empty() => {
            let like = format!("%{}%", q);
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM rep_codes
                 WHERE rep_number LIKE ?1 OR name LIKE ?1
                 ORDER BY rep_number ASC",
                REP_COLUMNS
            ))?;
            let rows = stmt.query_map(params![like], rep_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        _ => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM rep_codes ORDER BY rep_number ASC",
                REP_COLUMNS
            ))?;
            let rows = stmt.query_map([], rep_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(reps)
}

/// Delete a rep. Accounts booked under it survive with their rep reference
/// cleared by the engine's SET NULL action.
pub fn delete_rep_code(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM rep_codes WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_rep_codes(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM rep_codes", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// GENERAL ACCOUNTS
// ============================================================================

pub fn insert_general_account(conn: &Connection, acct: &GeneralAccount) -> Result<(), SaveError> {
    acct.validate().map_err(SaveError::Invalid)?;

    conn.execute(
        "INSERT INTO general_accounts (
            id, account_number, account_name, rep_id, status, open_date,
            close_date, account_holders, is_cash, is_margin, option_level,
            country, state, city, zip_code, address, phone_number,
            created, modified
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                  ?15, ?16, ?17, ?18, ?19)",
        params![
            acct.id,
            acct.account_number,
            acct.account_name,
            acct.rep_id,
            acct.status.as_str(),
            acct.open_date.map(|d| d.to_string()),
            acct.close_date.map(|d| d.to_string()),
            acct.account_holders,
            acct.is_cash,
            acct.is_margin,
            acct.option_level,
            acct.address.country,
            acct.address.state,
            acct.address.city,
            acct.address.zip_code,
            acct.address.address,
            acct.address.phone_number,
            acct.created.to_rfc3339(),
            acct.modified.to_rfc3339(),
        ],
    )
    .map_err(|e| map_constraint(e, "rep_id"))?;

    Ok(())
}

pub fn update_general_account(
    conn: &Connection,
    acct: &mut GeneralAccount,
) -> Result<(), SaveError> {
    acct.validate().map_err(SaveError::Invalid)?;
    acct.touch();

    let changed = conn
        .execute(
            "UPDATE general_accounts SET
                account_number = ?2, account_name = ?3, rep_id = ?4, status = ?5,
                open_date = ?6, close_date = ?7, account_holders = ?8,
                is_cash = ?9, is_margin = ?10, option_level = ?11, country = ?12,
                state = ?13, city = ?14, zip_code = ?15, address = ?16,
                phone_number = ?17, modified = ?18
             WHERE id = ?1",
            params![
                acct.id,
                acct.account_number,
                acct.account_name,
                acct.rep_id,
                acct.status.as_str(),
                acct.open_date.map(|d| d.to_string()),
                acct.close_date.map(|d| d.to_string()),
                acct.account_holders,
                acct.is_cash,
                acct.is_margin,
                acct.option_level,
                acct.address.country,
                acct.address.state,
                acct.address.city,
                acct.address.zip_code,
                acct.address.address,
                acct.address.phone_number,
                acct.modified.to_rfc3339(),
            ],
        )
        .map_err(|e| map_constraint(e, "rep_id"))?;

    if changed == 0 {
        return Err(SaveError::Storage(rusqlite::Error::QueryReturnedNoRows));
    }
    Ok(())
}

pub fn get_general_account(conn: &Connection, id: &str) -> Result<Option<GeneralAccount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM general_accounts WHERE id = ?1",
        ACCOUNT_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], account_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn get_general_account_by_number(
    conn: &Connection,
    account_number: &str,
) -> Result<Option<GeneralAccount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM general_accounts WHERE account_number = ?1",
        ACCOUNT_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![account_number], account_from_row)?;
    Ok(rows.next().transpose()?)
}

/// Default admin listing: no search, insertion order by account number.
pub fn list_general_accounts(conn: &Connection) -> Result<Vec<GeneralAccount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM general_accounts ORDER BY account_number ASC",
        ACCOUNT_COLUMNS
    ))?;
    let accounts = stmt
        .query_map([], account_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn accounts_for_rep(conn: &Connection, rep_id: &str) -> Result<Vec<GeneralAccount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM general_accounts WHERE rep_id = ?1 ORDER BY account_number ASC",
        ACCOUNT_COLUMNS
    ))?;
    let accounts = stmt
        .query_map(params![rep_id], account_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

/// Delete an account. Its holders go with it via the engine's CASCADE.
pub fn delete_general_account(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM general_accounts WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_general_accounts(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM general_accounts", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// ACCOUNT HOLDERS
// ============================================================================

pub fn insert_account_holder(conn: &Connection, holder: &AccountHolder) -> Result<(), SaveError> {
    holder.validate().map_err(SaveError::Invalid)?;

    conn.execute(
        "INSERT INTO account_holders (id, name, account_id, created, modified)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            holder.id,
            holder.name,
            holder.account_id,
            holder.created.to_rfc3339(),
            holder.modified.to_rfc3339(),
        ],
    )
    .map_err(|e| map_constraint(e, "account_id"))?;

    Ok(())
}

pub fn update_account_holder(conn: &Connection, holder: &mut AccountHolder) -> Result<(), SaveError> {
    holder.validate().map_err(SaveError::Invalid)?;
    holder.touch();

    let changed = conn
        .execute(
            "UPDATE account_holders SET name = ?2, account_id = ?3, modified = ?4
             WHERE id = ?1",
            params![
                holder.id,
                holder.name,
                holder.account_id,
                holder.modified.to_rfc3339(),
            ],
        )
        .map_err(|e| map_constraint(e, "account_id"))?;

    if changed == 0 {
        return Err(SaveError::Storage(rusqlite::Error::QueryReturnedNoRows));
    }
    Ok(())
}

pub fn get_account_holder(conn: &Connection, id: &str) -> Result<Option<AccountHolder>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM account_holders WHERE id = ?1",
        HOLDER_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], holder_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn list_account_holders(conn: &Connection) -> Result<Vec<AccountHolder>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM account_holders ORDER BY name ASC",
        HOLDER_COLUMNS
    ))?;
    let holders = stmt
        .query_map([], holder_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(holders)
}

pub fn holders_for_account(conn: &Connection, account_id: &str) -> Result<Vec<AccountHolder>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM account_holders WHERE account_id = ?1 ORDER BY name ASC",
        HOLDER_COLUMNS
    ))?;
    let holders = stmt
        .query_map(params![account_id], holder_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(holders)
}

pub fn delete_account_holder(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM account_holders WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_account_holders(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM account_holders", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RepCategory;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn test_rep(number: &str, name: &str) -> RepCode {
        RepCode::new(
            number,
            RepCategory::FenixSecurities,
            name,
            "rep@example.com",
            Status::Open,
            Address::new("US"),
        )
    }

    fn test_account(number: &str, name: &str) -> GeneralAccount {
        GeneralAccount::new(number, name, Status::Open, Address::new("US"))
    }

    #[test]
    fn test_insert_and_get_rep_code() {
        let conn = test_conn();
        let rep = test_rep("007", "Jane Doe");
        insert_rep_code(&conn, &rep).unwrap();

        let loaded = get_rep_code(&conn, &rep.id).unwrap().unwrap();
        assert_eq!(loaded.rep_number, "007");
        assert_eq!(loaded.name, "Jane Doe");
        assert_eq!(loaded.rep_category, RepCategory::FenixSecurities);
        assert_eq!(loaded.status, Status::Open);
        assert_eq!(loaded.sharing_agreement, 100.0);
        assert_eq!(loaded.to_string(), "Jane Doe (007)");

        let by_number = get_rep_code_by_number(&conn, "007").unwrap().unwrap();
        assert_eq!(by_number.id, rep.id);
    }

    #[test]
    fn test_duplicate_rep_number_fails() {
        let conn = test_conn();
        insert_rep_code(&conn, &test_rep("123", "First")).unwrap();

        let err = insert_rep_code(&conn, &test_rep("123", "Second")).unwrap_err();
        match err {
            SaveError::Duplicate { field } => assert_eq!(field, "rep_number"),
            other => panic!("expected duplicate error, got {}", other),
        }
        assert_eq!(count_rep_codes(&conn).unwrap(), 1);
    }

    #[test]
    fn test_invalid_rep_is_not_persisted() {
        let conn = test_conn();
        let mut rep = test_rep("007", "Jane Doe");
        rep.sharing_agreement = 101.0;

        let err = insert_rep_code(&conn, &rep).unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));
        assert_eq!(count_rep_codes(&conn).unwrap(), 0);
    }

    #[test]
    fn test_search_rep_codes_ordering_and_filter() {
        let conn = test_conn();
        insert_rep_code(&conn, &test_rep("300", "Charlie")).unwrap();
        insert_rep_code(&conn, &test_rep("100", "Alice")).unwrap();
        insert_rep_code(&conn, &test_rep("200", "Bob")).unwrap();

        let all = search_rep_codes(&conn, None).unwrap();
        let numbers: Vec<&str> = all.iter().map(|r| r.rep_number.as_str()).collect();
        assert_eq!(numbers, vec!["100", "200", "300"]);

        // Search matches name or rep_number
        let by_name = search_rep_codes(&conn, Some("Ali")).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Alice");

        let by_number = search_rep_codes(&conn, Some("20")).unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].rep_number, "200");

        let none = search_rep_codes(&conn, Some("zzz")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_update_rep_code_bumps_modified() {
        let conn = test_conn();
        let mut rep = test_rep("007", "Jane Doe");
        insert_rep_code(&conn, &rep).unwrap();
        let before = rep.modified;

        std::thread::sleep(std::time::Duration::from_millis(5));
        rep.name = "Jane Smith".to_string();
        update_rep_code(&conn, &mut rep).unwrap();

        let loaded = get_rep_code(&conn, &rep.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Jane Smith");
        assert!(loaded.modified > before);
        assert_eq!(loaded.created, rep.created);
    }

    #[test]
    fn test_update_missing_rep_fails() {
        let conn = test_conn();
        let mut rep = test_rep("007", "Jane Doe");
        let err = update_rep_code(&conn, &mut rep).unwrap_err();
        assert!(matches!(err, SaveError::Storage(_)));
    }

    #[test]
    fn test_delete_rep_clears_account_reference() {
        let conn = test_conn();
        let rep = test_rep("007", "Jane Doe");
        insert_rep_code(&conn, &rep).unwrap();

        let acct = test_account("12345678", "Doe Family Trust").with_rep(rep.id.clone());
        insert_general_account(&conn, &acct).unwrap();

        assert!(delete_rep_code(&conn, &rep.id).unwrap());

        // Account survives, reference cleared
        let loaded = get_general_account(&conn, &acct.id).unwrap().unwrap();
        assert!(loaded.rep_id.is_none());
        assert_eq!(count_general_accounts(&conn).unwrap(), 1);
    }

    #[test]
    fn test_delete_account_cascades_holders() {
        let conn = test_conn();
        let acct = test_account("12345678", "Doe Family Trust");
        insert_general_account(&conn, &acct).unwrap();

        insert_account_holder(&conn, &AccountHolder::new("John Doe", &acct.id)).unwrap();
        insert_account_holder(&conn, &AccountHolder::new("Jane Doe", &acct.id)).unwrap();
        assert_eq!(count_account_holders(&conn).unwrap(), 2);

        assert!(delete_general_account(&conn, &acct.id).unwrap());
        assert_eq!(count_account_holders(&conn).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_account_number_fails() {
        let conn = test_conn();
        insert_general_account(&conn, &test_account("12345678", "First")).unwrap();

        let err =
            insert_general_account(&conn, &test_account("12345678", "Second")).unwrap_err();
        match err {
            SaveError::Duplicate { field } => assert_eq!(field, "account_number"),
            other => panic!("expected duplicate error, got {}", other),
        }
        assert_eq!(count_general_accounts(&conn).unwrap(), 1);
    }

    #[test]
    fn test_account_holders_bounds_enforced_at_save() {
        let conn = test_conn();

        let mut acct = test_account("11111111", "Six Holders");
        acct.account_holders = 6;
        let err = insert_general_account(&conn, &acct).unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));
        assert_eq!(count_general_accounts(&conn).unwrap(), 0);

        acct.account_holders = 5;
        insert_general_account(&conn, &acct).unwrap();
        assert_eq!(count_general_accounts(&conn).unwrap(), 1);
    }

    #[test]
    fn test_holder_requires_existing_account() {
        let conn = test_conn();
        let holder = AccountHolder::new("Orphan", "no-such-account");

        let err = insert_account_holder(&conn, &holder).unwrap_err();
        match err {
            SaveError::MissingReference { field } => assert_eq!(field, "account_id"),
            other => panic!("expected missing reference error, got {}", other),
        }
    }

    #[test]
    fn test_account_requires_existing_rep_when_set() {
        let conn = test_conn();
        let acct = test_account("12345678", "Bad Rep").with_rep("no-such-rep");

        let err = insert_general_account(&conn, &acct).unwrap_err();
        assert!(matches!(err, SaveError::MissingReference { field: "rep_id" }));
    }

    #[test]
    fn test_account_round_trip_with_dates_and_flags() {
        let conn = test_conn();
        let mut acct = test_account("12345678", "Doe Family Trust");
        acct.open_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        acct.is_margin = true;
        acct.option_level = 3;
        insert_general_account(&conn, &acct).unwrap();

        let loaded = get_general_account_by_number(&conn, "12345678")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.open_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(loaded.close_date.is_none());
        assert!(loaded.is_margin);
        assert!(!loaded.is_cash);
        assert_eq!(loaded.option_level, 3);
    }

    #[test]
    fn test_holders_for_account() {
        let conn = test_conn();
        let acct1 = test_account("11111111", "First");
        let acct2 = test_account("22222222", "Second");
        insert_general_account(&conn, &acct1).unwrap();
        insert_general_account(&conn, &acct2).unwrap();

        insert_account_holder(&conn, &AccountHolder::new("Bob", &acct1.id)).unwrap();
        insert_account_holder(&conn, &AccountHolder::new("Alice", &acct1.id)).unwrap();
        insert_account_holder(&conn, &AccountHolder::new("Carol", &acct2.id)).unwrap();

        let holders = holders_for_account(&conn, &acct1.id).unwrap();
        let names: Vec<&str> = holders.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_delete_holder_leaves_account() {
        let conn = test_conn();
        let acct = test_account("12345678", "Doe Family Trust");
        insert_general_account(&conn, &acct).unwrap();
        let holder = AccountHolder::new("John Doe", &acct.id);
        insert_account_holder(&conn, &holder).unwrap();

        assert!(delete_account_holder(&conn, &holder.id).unwrap());
        assert!(!delete_account_holder(&conn, &holder.id).unwrap());
        assert_eq!(count_general_accounts(&conn).unwrap(), 1);
    }

    #[test]
    fn test_accounts_for_rep() {
        let conn = test_conn();
        let rep = test_rep("007", "Jane Doe");
        insert_rep_code(&conn, &rep).unwrap();

        insert_general_account(&conn, &test_account("11111111", "A").with_rep(rep.id.clone()))
            .unwrap();
        insert_general_account(&conn, &test_account("22222222", "B").with_rep(rep.id.clone()))
            .unwrap();
        insert_general_account(&conn, &test_account("33333333", "C")).unwrap();

        let booked = accounts_for_rep(&conn, &rep.id).unwrap();
        assert_eq!(booked.len(), 2);
    }
}
