//! Object registration.
//!
//! Registering an object inserts its `objects` row together with a stub row
//! in its primitives table, one `links` row per node field, and one
//! `connections` row per connection field, all with null payloads. Every
//! later write to those rows is then a single-row UPDATE, which is what
//! makes the single-update assertion possible.

use rusqlite::{params, OptionalExtension};
use tracing::trace;

use crate::errors::MirrorError;
use crate::install::primitives_table_name;
use crate::mirror::Mirror;
use crate::txn::transactionally;

impl Mirror {
    /// Registers `(typename, id)` in the mirror. Idempotent when the pair is
    /// already present; fails with `TypeConflict` if `id` is registered under
    /// a different typename, `UnknownType` if the typename is absent from the
    /// schema, and `NonObjectType` if it names a union.
    pub fn register_object(&self, typename: &str, id: &str) -> Result<(), MirrorError> {
        transactionally(self.connection(), |_| {
            self.register_object_nontransactionally(typename, id)
        })
    }

    /// Same as [`Mirror::register_object`] but without opening a transaction,
    /// so a larger operation can group many registrations into one.
    pub(crate) fn register_object_nontransactionally(
        &self,
        typename: &str,
        id: &str,
    ) -> Result<(), MirrorError> {
        let object = self.index().object(typename)?;
        let conn = self.connection();

        let existing: Option<String> = conn
            .query_row(
                "SELECT typename FROM objects WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| MirrorError::query(e.to_string()))?;
        if let Some(stored) = existing {
            if stored == typename {
                return Ok(());
            }
            return Err(MirrorError::type_conflict(format!(
                "object {id:?} is registered as {stored}, not {typename}"
            )));
        }

        conn.execute(
            "INSERT INTO objects (id, typename, last_update) VALUES (?1, ?2, NULL)",
            params![id, typename],
        )
        .map_err(|e| MirrorError::query(e.to_string()))?;
        conn.execute(
            &format!(
                "INSERT INTO \"{}\" (id) VALUES (?1)",
                primitives_table_name(typename)
            ),
            [id],
        )
        .map_err(|e| MirrorError::query(e.to_string()))?;
        for fieldname in &object.link_fields {
            conn.execute(
                "INSERT INTO links (parent_id, fieldname, child_id) VALUES (?1, ?2, NULL)",
                params![id, fieldname],
            )
            .map_err(|e| MirrorError::query(e.to_string()))?;
        }
        for fieldname in &object.connection_fields {
            conn.execute(
                "INSERT INTO connections (object_id, fieldname) VALUES (?1, ?2)",
                params![id, fieldname],
            )
            .map_err(|e| MirrorError::query(e.to_string()))?;
        }
        trace!(typename, id, "registered object");
        Ok(())
    }
}
