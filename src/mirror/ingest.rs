//! Connection page ingestion.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::errors::MirrorError;
use crate::mirror::Mirror;
use crate::txn::{execute_one, transactionally};

/// Typename and ID of a node as returned by a shallow selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStub {
    pub typename: String,
    pub id: String,
}

impl NodeStub {
    pub fn new<T: Into<String>, I: Into<String>>(typename: T, id: I) -> Self {
        Self {
            typename: typename.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of a connection result. Nodes may be null: Relay servers return
/// null entries for deleted or inaccessible nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPage {
    pub total_count: i64,
    pub page_info: PageInfo,
    pub nodes: Vec<Option<NodeStub>>,
}

impl Mirror {
    /// Applies one page of results to a connection: refreshes its metadata,
    /// appends the page's entries after the existing ones, and registers any
    /// referenced nodes. Atomic; a failure anywhere (including a
    /// `TypeConflict` on a referenced node) leaves the store untouched.
    ///
    /// Entries are never deduplicated or reordered. Overlapping pages are
    /// stored as received; resuming from the stored `end_cursor` is the
    /// caller's responsibility.
    pub fn update_connection(
        &self,
        update_id: i64,
        object_id: &str,
        fieldname: &str,
        page: &ConnectionPage,
    ) -> Result<(), MirrorError> {
        transactionally(self.connection(), |conn| {
            let update_exists: Option<i64> = conn
                .query_row("SELECT 1 FROM updates WHERE rowid = ?1", [update_id], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| MirrorError::query(e.to_string()))?;
            if update_exists.is_none() {
                return Err(MirrorError::UnknownUpdate(update_id));
            }

            let connection_id: Option<i64> = conn
                .query_row(
                    "SELECT rowid FROM connections WHERE object_id = ?1 AND fieldname = ?2",
                    params![object_id, fieldname],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| MirrorError::query(e.to_string()))?;
            let connection_id = match connection_id {
                Some(rowid) => rowid,
                None => {
                    return Err(MirrorError::unknown_connection(format!(
                        "no connection {fieldname:?} on object {object_id:?}"
                    )));
                }
            };

            execute_one(
                conn,
                "UPDATE connections
                 SET last_update = ?1, total_count = ?2, has_next_page = ?3, end_cursor = ?4
                 WHERE rowid = ?5",
                params![
                    update_id,
                    page.total_count,
                    page.page_info.has_next_page,
                    page.page_info.end_cursor,
                    connection_id
                ],
            )?;

            let mut next_index: i64 = conn
                .query_row(
                    "SELECT COALESCE(MAX(idx), 0) + 1 FROM connection_entries WHERE connection_id = ?1",
                    [connection_id],
                    |row| row.get(0),
                )
                .map_err(|e| MirrorError::query(e.to_string()))?;

            let mut insert_entry = conn
                .prepare_cached(
                    "INSERT INTO connection_entries (connection_id, idx, child_id) VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| MirrorError::query(e.to_string()))?;
            for node in &page.nodes {
                let child_id = match node {
                    Some(stub) => {
                        self.register_object_nontransactionally(&stub.typename, &stub.id)?;
                        Some(stub.id.as_str())
                    }
                    None => None,
                };
                insert_entry
                    .execute(params![connection_id, next_index, child_id])
                    .map_err(|e| MirrorError::query(e.to_string()))?;
                next_index += 1;
            }
            debug!(
                object_id,
                fieldname,
                entries = page.nodes.len(),
                "ingested connection page"
            );
            Ok(())
        })
    }
}
