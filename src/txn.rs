use rusqlite::{Connection, Params};

use crate::errors::MirrorError;

/// Runs `f` inside a transaction, committing on `Ok` and rolling back on
/// `Err`. Fails fast with `AlreadyInTransaction` if a transaction is open;
/// tolerates a callback that committed on its own (anything the callback
/// left open is committed on return).
pub(crate) fn transactionally<T, F>(conn: &Connection, f: F) -> Result<T, MirrorError>
where
    F: FnOnce(&Connection) -> Result<T, MirrorError>,
{
    if !conn.is_autocommit() {
        return Err(MirrorError::AlreadyInTransaction);
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| MirrorError::query(e.to_string()))?;
    match f(conn) {
        Ok(value) => {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")
                    .map_err(|e| MirrorError::query(e.to_string()))?;
            }
            Ok(value)
        }
        Err(err) => {
            if !conn.is_autocommit() {
                let _ = conn.execute_batch("ROLLBACK");
            }
            Err(err)
        }
    }
}

/// Runs a statement that must change exactly one row (primary-key UPDATE or
/// stub INSERT). Any other count is an invariant violation and aborts the
/// surrounding transaction.
pub(crate) fn execute_one<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<(), MirrorError> {
    let changed = conn
        .execute(sql, params)
        .map_err(|e| MirrorError::query(e.to_string()))?;
    if changed != 1 {
        return Err(MirrorError::invariant(format!(
            "expected exactly one changed row, got {changed}: {sql}"
        )));
    }
    Ok(())
}
