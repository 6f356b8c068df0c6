//! GraphQL query synthesis.
//!
//! Pure functions from the schema index to selection sets. The shallow
//! query discovers an object's concrete type and ID; the connection query
//! fetches one page of a connection, resuming from a stored cursor. No
//! store access here, so identical inputs always produce identical output.

use crate::errors::MirrorError;
use crate::plan::EndCursor;
use crate::queries::{field, field_with, inline_fragment, Selection, Value};
use crate::schema::{SchemaIndex, TypeIndex};

/// The minimal selection needed to discover a node's concrete typename and
/// ID: `__typename` and `id` for object types, plus one `... on Clause`
/// fragment per clause for union types.
pub fn query_shallow(index: &SchemaIndex, typename: &str) -> Result<Vec<Selection>, MirrorError> {
    match index.types.get(typename) {
        None => Err(MirrorError::unknown_type(typename)),
        Some(TypeIndex::Object(_)) => Ok(vec![field("__typename"), field("id")]),
        Some(TypeIndex::Union(union)) => {
            let mut selections = vec![field("__typename")];
            for clause in &union.clauses {
                selections.push(inline_fragment(clause.clone(), vec![field("id")]));
            }
            Ok(selections)
        }
    }
}

/// One page of a connection field:
///
/// ```graphql
/// <fieldname>(first: <page_size>[, after: <cursor>]) {
///   totalCount
///   pageInfo { endCursor hasNextPage }
///   nodes { ...shallow }
/// }
/// ```
///
/// The `after:` argument is present iff the cursor has been fetched; a
/// fetched-but-null cursor is passed through as a literal `null`.
pub fn query_connection(
    index: &SchemaIndex,
    parent_typename: &str,
    fieldname: &str,
    end_cursor: &EndCursor,
    page_size: u32,
) -> Result<Selection, MirrorError> {
    let object = index.object(parent_typename)?;
    let element_type = object.connection_element(parent_typename, fieldname)?;

    let mut args = vec![("first".to_string(), Value::Int(i64::from(page_size)))];
    if let EndCursor::Fetched(cursor) = end_cursor {
        let value = match cursor {
            Some(cursor) => Value::String(cursor.clone()),
            None => Value::Null,
        };
        args.push(("after".to_string(), value));
    }

    let selections = vec![
        field("totalCount"),
        field_with(
            "pageInfo",
            Vec::new(),
            vec![field("endCursor"), field("hasNextPage")],
        ),
        field_with("nodes", Vec::new(), query_shallow(index, element_type)?),
    ];
    Ok(field_with(fieldname, args, selections))
}
