//! Schema steps for the key-value table.
//!
//! Each step commits on its own together with its `PRAGMA user_version`
//! bump, so an interrupted upgrade resumes at the first unfinished step.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::cmp::Ordering;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "kv_entries",
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.iter().map(|step| step.version).max().unwrap_or(0)
}

/// Version recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    match from.cmp(&latest) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from,
                latest_supported: latest,
            })
        }
        Ordering::Equal => {
            debug!("event=db_migrate module=db status=up_to_date version={from}");
            return Ok(());
        }
        Ordering::Less => {}
    }

    for step in pending_steps(from) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok step={} version={}",
            step.name, step.version
        );
    }
    Ok(())
}

fn pending_steps(from: u32) -> impl Iterator<Item = &'static SchemaStep> {
    STEPS.iter().filter(move |step| step.version > from)
}
