//! Output types of the staleness planner.

/// Pagination position of a connection, as recorded by the store.
///
/// `Unfetched` means the connection has never been ingested and pagination
/// must start from the beginning. `Fetched(None)` means a page was ingested
/// and the server reported no cursor (empty or exhausted connection);
/// `Fetched(Some(_))` carries the cursor to resume after. The first omits
/// the `after:` argument from synthesized queries, the latter two do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndCursor {
    Unfetched,
    Fetched(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub typename: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRef {
    pub object_id: String,
    pub fieldname: String,
    pub end_cursor: EndCursor,
}

/// What the fetch loop should refresh next: objects whose own data is stale
/// and connections that are stale or mid-pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub objects: Vec<ObjectRef>,
    pub connections: Vec<ConnectionRef>,
}

impl QueryPlan {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.connections.is_empty()
    }
}
