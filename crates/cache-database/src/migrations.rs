//! Database migrations.
//!
//! Migrations run in order and are tracked in the `migrations` table.
//! Cache tables carry no SQL foreign keys: parent/child cleanup is done by
//! the reconciler's registered cascade links, so a child may legitimately
//! reference a parent that is not cached (yet).

use crate::DatabaseResult;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 4;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> DatabaseResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM migrations",
        [],
        |row| row.get(0),
    )?;

    if current_version >= CURRENT_VERSION {
        debug!(current_version, "Schema up to date");
        return Ok(());
    }

    info!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_aggregation(conn)?;
    }
    if current_version < 2 {
        migrate_v2_cdr(conn)?;
    }
    if current_version < 3 {
        migrate_v3_budgets(conn)?;
    }
    if current_version < 4 {
        migrate_v4_messages_and_reports(conn)?;
    }

    info!("Migrations complete");
    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> DatabaseResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "Migration applied");
    Ok(())
}

/// V1: providers, provider accounts, accounts.
fn migrate_v1_aggregation(conn: &Connection) -> DatabaseResult<()> {
    info!("Applying migration v1: aggregation tables");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS providers (
            id INTEGER PRIMARY KEY,
            status TEXT NOT NULL,
            popular INTEGER NOT NULL DEFAULT 0,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_providers_status ON providers(status);

        CREATE TABLE IF NOT EXISTS provider_accounts (
            id INTEGER PRIMARY KEY,
            provider_id INTEGER NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_provider_accounts_provider_id
            ON provider_accounts(provider_id);

        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY,
            provider_account_id INTEGER NOT NULL,
            account_type TEXT NOT NULL,
            account_status TEXT NOT NULL,
            included INTEGER NOT NULL DEFAULT 1,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_accounts_provider_account_id
            ON accounts(provider_account_id);
        CREATE INDEX IF NOT EXISTS idx_accounts_account_type ON accounts(account_type);
        ",
    )?;

    record_migration(conn, 1, "aggregation")?;
    Ok(())
}

/// V2: consumer data right tables (consents, external parties, disclosures).
fn migrate_v2_cdr(conn: &Connection) -> DatabaseResult<()> {
    info!("Applying migration v2: cdr tables");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS consents (
            id INTEGER PRIMARY KEY,
            provider_id INTEGER NOT NULL,
            provider_account_id INTEGER,
            status TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_consents_provider_id ON consents(provider_id);
        CREATE INDEX IF NOT EXISTS idx_consents_status ON consents(status);

        CREATE TABLE IF NOT EXISTS external_parties (
            id INTEGER PRIMARY KEY,
            trusted_advisor INTEGER NOT NULL DEFAULT 0,
            party_type TEXT NOT NULL,
            payload TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS disclosure_consents (
            id INTEGER PRIMARY KEY,
            status TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_disclosure_consents_status
            ON disclosure_consents(status);
        ",
    )?;

    record_migration(conn, 2, "cdr")?;
    Ok(())
}

/// V3: budgets and budget periods.
fn migrate_v3_budgets(conn: &Connection) -> DatabaseResult<()> {
    info!("Applying migration v3: budgets");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY,
            is_current INTEGER NOT NULL,
            budget_type TEXT NOT NULL,
            type_value TEXT NOT NULL,
            status TEXT NOT NULL,
            tracking_status TEXT NOT NULL,
            frequency TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_budgets_type ON budgets(budget_type, type_value);
        CREATE INDEX IF NOT EXISTS idx_budgets_is_current ON budgets(is_current);

        CREATE TABLE IF NOT EXISTS budget_periods (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            tracking_status TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_budget_periods_budget_id ON budget_periods(budget_id);
        CREATE INDEX IF NOT EXISTS idx_budget_periods_start_date ON budget_periods(start_date);
        ",
    )?;

    record_migration(conn, 3, "budgets")?;
    Ok(())
}

/// V4: messages and account balance reports.
fn migrate_v4_messages_and_reports(conn: &Connection) -> DatabaseResult<()> {
    info!("Applying migration v4: messages and reports");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY,
            event TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0,
            interacted INTEGER NOT NULL DEFAULT 0,
            content_type TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_messages_read ON messages(read);

        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            period TEXT NOT NULL,
            date TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reports_account_period
            ON reports(account_id, period, date);
        ",
    )?;

    record_migration(conn, 4, "messages_and_reports")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", table))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn migrations_create_every_known_table() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for schema in tables::ALL {
            let columns = table_columns(&conn, schema.name);
            assert!(columns.contains(&"id".to_string()), "{} has no id", schema.name);
            assert!(
                columns.contains(&"payload".to_string()),
                "{} has no payload",
                schema.name
            );
            for column in schema.columns {
                assert!(
                    columns.contains(&column.to_string()),
                    "{} is missing {}",
                    schema.name,
                    column
                );
            }
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i32 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, CURRENT_VERSION);
    }
}
