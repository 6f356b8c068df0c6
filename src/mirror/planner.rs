//! Staleness planning.

use std::time::SystemTime;

use crate::errors::MirrorError;
use crate::mirror::{epoch_millis, Mirror};
use crate::plan::{ConnectionRef, EndCursor, ObjectRef, QueryPlan};
use crate::txn::transactionally;

impl Mirror {
    /// Everything older than `since`: objects whose last update is missing
    /// or earlier, and connections that were never fetched, were fetched
    /// earlier, or last reported another page outstanding. Results come back
    /// in registration order.
    pub fn find_outdated(&self, since: SystemTime) -> Result<QueryPlan, MirrorError> {
        let threshold = epoch_millis(since);
        transactionally(self.connection(), |conn| {
            let mut objects_stmt = conn
                .prepare_cached(
                    "SELECT objects.typename, objects.id
                     FROM objects
                     LEFT JOIN updates ON objects.last_update = updates.rowid
                     WHERE objects.last_update IS NULL
                        OR updates.time_epoch_millis < ?1
                     ORDER BY objects.rowid",
                )
                .map_err(|e| MirrorError::query(e.to_string()))?;
            let object_rows = objects_stmt
                .query_map([threshold], |row| {
                    Ok(ObjectRef {
                        typename: row.get(0)?,
                        id: row.get(1)?,
                    })
                })
                .map_err(|e| MirrorError::query(e.to_string()))?;
            let mut objects = Vec::new();
            for row in object_rows {
                objects.push(row.map_err(|e| MirrorError::query(e.to_string()))?);
            }

            let mut connections_stmt = conn
                .prepare_cached(
                    "SELECT connections.object_id,
                            connections.fieldname,
                            connections.last_update IS NOT NULL,
                            connections.end_cursor
                     FROM connections
                     LEFT JOIN updates ON connections.last_update = updates.rowid
                     WHERE connections.last_update IS NULL
                        OR updates.time_epoch_millis < ?1
                        OR connections.has_next_page
                     ORDER BY connections.rowid",
                )
                .map_err(|e| MirrorError::query(e.to_string()))?;
            let connection_rows = connections_stmt
                .query_map([threshold], |row| {
                    let fetched: bool = row.get(2)?;
                    let cursor: Option<String> = row.get(3)?;
                    Ok(ConnectionRef {
                        object_id: row.get(0)?,
                        fieldname: row.get(1)?,
                        end_cursor: if fetched {
                            EndCursor::Fetched(cursor)
                        } else {
                            EndCursor::Unfetched
                        },
                    })
                })
                .map_err(|e| MirrorError::query(e.to_string()))?;
            let mut connections = Vec::new();
            for row in connection_rows {
                connections.push(row.map_err(|e| MirrorError::query(e.to_string()))?);
            }

            Ok(QueryPlan {
                objects,
                connections,
            })
        })
    }
}
