//! Store installation and schema identity.
//!
//! On first use the installer creates the structural tables and one
//! `primitives_<T>` table per object type. On reuse it compares the stored
//! schema fingerprint against the current one and refuses incompatible
//! stores. Everything happens in a single transaction: after a successful
//! return the store is either freshly installed or byte-for-byte compatible.

use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::errors::MirrorError;
use crate::schema::{FieldType, Schema, SchemaIndex, TypeDef, TypeIndex};
use crate::txn::transactionally;

/// Version tag baked into the meta fingerprint. Bumps whenever the relational
/// layout or its semantics change.
pub const MIRROR_VERSION: &str = "MIRROR_v1";

const STRUCTURAL_DDL: &str = r#"
CREATE TABLE updates (
    rowid INTEGER PRIMARY KEY,
    time_epoch_millis INTEGER NOT NULL
);
CREATE TABLE objects (
    id TEXT NOT NULL PRIMARY KEY,
    typename TEXT NOT NULL,
    last_update INTEGER,
    FOREIGN KEY(last_update) REFERENCES updates(rowid)
);
CREATE TABLE links (
    rowid INTEGER PRIMARY KEY,
    parent_id TEXT NOT NULL,
    fieldname TEXT NOT NULL,
    child_id TEXT,
    UNIQUE(parent_id, fieldname),
    FOREIGN KEY(parent_id) REFERENCES objects(id),
    FOREIGN KEY(child_id) REFERENCES objects(id)
);
CREATE UNIQUE INDEX idx_links__parent_id__fieldname ON links(parent_id, fieldname);
CREATE TABLE connections (
    rowid INTEGER PRIMARY KEY,
    object_id TEXT NOT NULL,
    fieldname TEXT NOT NULL,
    last_update INTEGER,
    total_count INTEGER,
    has_next_page BOOLEAN,
    end_cursor TEXT,
    CHECK ((last_update IS NULL) = (total_count IS NULL)),
    CHECK ((last_update IS NULL) = (has_next_page IS NULL)),
    CHECK ((last_update IS NULL) <= (end_cursor IS NULL)),
    UNIQUE(object_id, fieldname),
    FOREIGN KEY(object_id) REFERENCES objects(id),
    FOREIGN KEY(last_update) REFERENCES updates(rowid)
);
CREATE UNIQUE INDEX idx_connections__object_id__fieldname ON connections(object_id, fieldname);
CREATE TABLE connection_entries (
    rowid INTEGER PRIMARY KEY,
    connection_id INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    child_id TEXT,
    UNIQUE(connection_id, idx),
    FOREIGN KEY(connection_id) REFERENCES connections(rowid),
    FOREIGN KEY(child_id) REFERENCES objects(id)
);
CREATE INDEX idx_connection_entries__connection_id ON connection_entries(connection_id);
"#;

/// True iff `token` may appear unquoted in SQL built by this crate.
/// Conservative on purpose: a precondition, not a sanitizer.
pub fn is_sql_safe(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Deterministic serialization of `{version, schema}` used as the schema
/// identity. serde_json's default map is BTree-backed, so keys come out
/// sorted at every nesting level and equal schemas produce equal bytes.
pub fn schema_fingerprint(schema: &Schema) -> String {
    let mut types = Map::new();
    for (typename, def) in &schema.types {
        types.insert(typename.clone(), type_def_json(def));
    }
    let mut root = Map::new();
    root.insert("schema".to_string(), Json::Object(types));
    root.insert("version".to_string(), Json::String(MIRROR_VERSION.to_string()));
    Json::Object(root).to_string()
}

fn type_def_json(def: &TypeDef) -> Json {
    let mut out = Map::new();
    match def {
        TypeDef::Object { fields } => {
            let mut field_map = Map::new();
            for (fieldname, field) in fields {
                field_map.insert(fieldname.clone(), field_type_json(field));
            }
            out.insert("fields".to_string(), Json::Object(field_map));
            out.insert("kind".to_string(), Json::String("OBJECT".to_string()));
        }
        TypeDef::Union { clauses } => {
            let clause_list = clauses.iter().cloned().map(Json::String).collect();
            out.insert("clauses".to_string(), Json::Array(clause_list));
            out.insert("kind".to_string(), Json::String("UNION".to_string()));
        }
    }
    Json::Object(out)
}

fn field_type_json(field: &FieldType) -> Json {
    match field {
        FieldType::Id => Json::String("ID".to_string()),
        FieldType::Primitive => Json::String("PRIMITIVE".to_string()),
        FieldType::Node { element_type } => element_json("NODE", element_type),
        FieldType::Connection { element_type } => element_json("CONNECTION", element_type),
    }
}

fn element_json(kind: &str, element_type: &str) -> Json {
    let mut out = Map::new();
    out.insert(
        "elementType".to_string(),
        Json::String(element_type.to_string()),
    );
    out.insert("kind".to_string(), Json::String(kind.to_string()));
    Json::Object(out)
}

/// Installs the relational layout for `schema`, or verifies that the store
/// already carries it. Refuses stores installed with any other schema.
pub fn install_schema(conn: &Connection, schema: &Schema) -> Result<(), MirrorError> {
    let index = SchemaIndex::build(schema)?;
    install_with_index(conn, schema, &index)
}

pub(crate) fn install_with_index(
    conn: &Connection,
    schema: &Schema,
    index: &SchemaIndex,
) -> Result<(), MirrorError> {
    validate_identifiers(index)?;
    let fingerprint = schema_fingerprint(schema);
    transactionally(conn, |conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (zero INTEGER PRIMARY KEY, schema TEXT NOT NULL)",
            [],
        )
        .map_err(|e| MirrorError::query(e.to_string()))?;
        let existing: Option<String> = conn
            .query_row("SELECT schema FROM meta", [], |row| row.get(0))
            .optional()
            .map_err(|e| MirrorError::query(e.to_string()))?;
        match existing {
            Some(stored) if stored == fingerprint => {
                debug!("store already installed with a compatible schema");
                Ok(())
            }
            Some(_) => Err(MirrorError::incompatible_store(
                "stored schema fingerprint does not match the current schema",
            )),
            None => {
                conn.execute_batch(STRUCTURAL_DDL)
                    .map_err(|e| MirrorError::schema(e.to_string()))?;
                for (typename, type_index) in &index.types {
                    if let TypeIndex::Object(object) = type_index {
                        conn.execute(
                            &primitives_table_ddl(typename, &object.primitive_fields),
                            [],
                        )
                        .map_err(|e| MirrorError::schema(e.to_string()))?;
                    }
                }
                conn.execute(
                    "INSERT INTO meta (zero, schema) VALUES (0, ?1)",
                    [&fingerprint],
                )
                .map_err(|e| MirrorError::query(e.to_string()))?;
                debug!("installed fresh store");
                Ok(())
            }
        }
    })
}

/// Rejects any object typename or primitive fieldname that would be unsafe
/// to splice into DDL. Runs before any statement executes.
fn validate_identifiers(index: &SchemaIndex) -> Result<(), MirrorError> {
    for (typename, type_index) in &index.types {
        if let TypeIndex::Object(object) = type_index {
            if !is_sql_safe(typename) {
                return Err(MirrorError::unsafe_identifier(typename.as_str()));
            }
            for fieldname in &object.primitive_fields {
                if !is_sql_safe(fieldname) {
                    return Err(MirrorError::unsafe_identifier(fieldname.as_str()));
                }
            }
        }
    }
    Ok(())
}

fn primitives_table_ddl(typename: &str, primitive_fields: &[String]) -> String {
    let mut columns = vec!["id TEXT NOT NULL PRIMARY KEY".to_string()];
    for fieldname in primitive_fields {
        columns.push(format!("\"{fieldname}\""));
    }
    columns.push("FOREIGN KEY(id) REFERENCES objects(id)".to_string());
    format!(
        "CREATE TABLE \"{}\" ({})",
        primitives_table_name(typename),
        columns.join(", ")
    )
}

pub(crate) fn primitives_table_name(typename: &str) -> String {
    format!("primitives_{typename}")
}
