//! Schema model for the mirrored object graph.
//!
//! A [`Schema`] describes a closed universe of GraphQL types: object types
//! with ID, primitive, node, and connection fields, and union types whose
//! clauses are object types. [`SchemaIndex`] is the decomposed form the rest
//! of the crate works against: per object type, the field map plus the
//! disjoint primitive/link/connection field sequences; per union type, the
//! clause list. Both are pure values with no store attached.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::MirrorError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Id,
    Primitive,
    Node { element_type: String },
    Connection { element_type: String },
}

impl FieldType {
    pub fn node<T: Into<String>>(element_type: T) -> Self {
        FieldType::Node {
            element_type: element_type.into(),
        }
    }

    pub fn connection<T: Into<String>>(element_type: T) -> Self {
        FieldType::Connection {
            element_type: element_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDef {
    Object { fields: BTreeMap<String, FieldType> },
    Union { clauses: BTreeSet<String> },
}

impl TypeDef {
    pub fn object<N: Into<String>, I: IntoIterator<Item = (N, FieldType)>>(fields: I) -> Self {
        TypeDef::Object {
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
        }
    }

    pub fn union<N: Into<String>, I: IntoIterator<Item = N>>(clauses: I) -> Self {
        TypeDef::Union {
            clauses: clauses.into_iter().map(Into::into).collect(),
        }
    }
}

/// The input schema: a mapping from typename to definition. Field maps and
/// clause sets are BTree-backed, so every traversal is in lexicographic
/// order and two structurally equal schemas are indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub types: BTreeMap<String, TypeDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type<N: Into<String>>(mut self, typename: N, def: TypeDef) -> Self {
        self.types.insert(typename.into(), def);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIndex {
    pub fields: BTreeMap<String, FieldType>,
    pub primitive_fields: Vec<String>,
    pub link_fields: Vec<String>,
    pub connection_fields: Vec<String>,
}

impl ObjectIndex {
    /// Element typename of a connection field, or the reason it is not one.
    pub(crate) fn connection_element(
        &self,
        typename: &str,
        fieldname: &str,
    ) -> Result<&str, MirrorError> {
        match self.fields.get(fieldname) {
            None => Err(MirrorError::unknown_field(format!(
                "{typename} has no field {fieldname:?}"
            ))),
            Some(FieldType::Connection { element_type }) => Ok(element_type),
            Some(_) => Err(MirrorError::not_a_connection(format!(
                "{typename}.{fieldname} is not a connection"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionIndex {
    pub clauses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeIndex {
    Object(ObjectIndex),
    Union(UnionIndex),
}

/// Decomposed schema, as consumed by the installer, registry, and query
/// synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIndex {
    pub types: BTreeMap<String, TypeIndex>,
}

impl SchemaIndex {
    pub fn build(schema: &Schema) -> Result<Self, MirrorError> {
        let mut types = BTreeMap::new();
        for (typename, def) in &schema.types {
            let index = match def {
                TypeDef::Object { fields } => {
                    TypeIndex::Object(build_object_index(schema, typename, fields)?)
                }
                TypeDef::Union { clauses } => {
                    TypeIndex::Union(build_union_index(schema, typename, clauses)?)
                }
            };
            types.insert(typename.clone(), index);
        }
        Ok(SchemaIndex { types })
    }

    /// Resolves a typename that must be an object type.
    pub fn object(&self, typename: &str) -> Result<&ObjectIndex, MirrorError> {
        match self.types.get(typename) {
            None => Err(MirrorError::unknown_type(typename)),
            Some(TypeIndex::Union(_)) => Err(MirrorError::non_object_type(typename)),
            Some(TypeIndex::Object(object)) => Ok(object),
        }
    }
}

fn build_object_index(
    schema: &Schema,
    typename: &str,
    fields: &BTreeMap<String, FieldType>,
) -> Result<ObjectIndex, MirrorError> {
    let mut primitive_fields = Vec::new();
    let mut link_fields = Vec::new();
    let mut connection_fields = Vec::new();
    let mut id_fields = Vec::new();
    for (fieldname, field) in fields {
        match field {
            FieldType::Id => id_fields.push(fieldname.clone()),
            FieldType::Primitive => primitive_fields.push(fieldname.clone()),
            FieldType::Node { element_type } => {
                require_known_type(schema, typename, fieldname, element_type)?;
                link_fields.push(fieldname.clone());
            }
            FieldType::Connection { element_type } => {
                require_known_type(schema, typename, fieldname, element_type)?;
                connection_fields.push(fieldname.clone());
            }
        }
    }
    // The shallow query selects the literal field `id`, so the spelling is
    // load-bearing for every registered object.
    if id_fields.as_slice() != ["id"] {
        return Err(MirrorError::schema(format!(
            "type {typename} must have exactly one ID field, named \"id\"; got {id_fields:?}"
        )));
    }
    Ok(ObjectIndex {
        fields: fields.clone(),
        primitive_fields,
        link_fields,
        connection_fields,
    })
}

fn build_union_index(
    schema: &Schema,
    typename: &str,
    clauses: &BTreeSet<String>,
) -> Result<UnionIndex, MirrorError> {
    for clause in clauses {
        match schema.types.get(clause) {
            Some(TypeDef::Object { .. }) => {}
            Some(TypeDef::Union { .. }) => {
                return Err(MirrorError::schema(format!(
                    "union {typename} has non-object clause {clause}"
                )));
            }
            None => {
                return Err(MirrorError::schema(format!(
                    "union {typename} has unknown clause {clause}"
                )));
            }
        }
    }
    Ok(UnionIndex {
        clauses: clauses.iter().cloned().collect(),
    })
}

fn require_known_type(
    schema: &Schema,
    typename: &str,
    fieldname: &str,
    element_type: &str,
) -> Result<(), MirrorError> {
    if schema.types.contains_key(element_type) {
        Ok(())
    } else {
        Err(MirrorError::schema(format!(
            "field {typename}.{fieldname} references unknown type {element_type}"
        )))
    }
}
