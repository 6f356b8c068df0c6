//! The mirror itself: a SQLite store tracking a subset of a remote GraphQL
//! object graph, with per-object and per-connection freshness metadata.

mod ingest;
mod planner;
mod registry;

pub use ingest::{ConnectionPage, NodeStub, PageInfo};

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;
use tracing::debug;

use crate::errors::MirrorError;
use crate::install;
use crate::plan::EndCursor;
use crate::queries::Selection;
use crate::schema::{Schema, SchemaIndex};
use crate::synth;

/// A local mirror of a remote GraphQL object graph.
///
/// The mirror exclusively owns the attached store for its lifetime;
/// concurrent external writers are undefined behavior.
#[derive(Debug)]
pub struct Mirror {
    conn: Connection,
    index: SchemaIndex,
}

impl Mirror {
    /// Opens (or creates) a mirror store at `path` for `schema`. Fails with
    /// `IncompatibleStore` if the file was installed with another schema.
    pub fn open<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Self, MirrorError> {
        let conn =
            Connection::open(path).map_err(|e| MirrorError::connection(e.to_string()))?;
        Self::from_connection(conn, schema)
    }

    pub fn open_in_memory(schema: &Schema) -> Result<Self, MirrorError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MirrorError::connection(e.to_string()))?;
        Self::from_connection(conn, schema)
    }

    fn from_connection(conn: Connection, schema: &Schema) -> Result<Self, MirrorError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| MirrorError::connection(e.to_string()))?;
        let index = SchemaIndex::build(schema)?;
        install::install_with_index(&conn, schema, &index)?;
        debug!("mirror store ready");
        Ok(Self { conn, index })
    }

    /// The decomposed schema this mirror was opened with.
    pub fn schema(&self) -> &SchemaIndex {
        &self.index
    }

    /// Records one refresh event and returns its update ID. IDs are unique
    /// and increase monotonically within a process; only uniqueness is
    /// relied on.
    pub fn create_update(&self, now: SystemTime) -> Result<i64, MirrorError> {
        self.conn
            .execute(
                "INSERT INTO updates (time_epoch_millis) VALUES (?1)",
                [epoch_millis(now)],
            )
            .map_err(|e| MirrorError::query(e.to_string()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// See [`synth::query_shallow`].
    pub fn query_shallow(&self, typename: &str) -> Result<Vec<Selection>, MirrorError> {
        synth::query_shallow(&self.index, typename)
    }

    /// See [`synth::query_connection`].
    pub fn query_connection(
        &self,
        parent_typename: &str,
        fieldname: &str,
        end_cursor: &EndCursor,
        page_size: u32,
    ) -> Result<Selection, MirrorError> {
        synth::query_connection(&self.index, parent_typename, fieldname, end_cursor, page_size)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn index(&self) -> &SchemaIndex {
        &self.index
    }
}

/// Signed milliseconds since the Unix epoch, ECMAScript-style: 86,400,000 ms
/// per day, no leap seconds, negative before 1970.
pub(crate) fn epoch_millis(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_millis() as i64,
        Err(err) => -(err.duration().as_millis() as i64),
    }
}
