use thiserror::Error;

/// Error type for mirror operations.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("incompatible store: {0}")]
    IncompatibleStore(String),
    #[error("unsafe identifier: {0:?}")]
    UnsafeIdentifier(String),
    #[error("unknown type: {0:?}")]
    UnknownType(String),
    #[error("not an object type: {0:?}")]
    NonObjectType(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("not a connection field: {0}")]
    NotAConnection(String),
    #[error("type conflict: {0}")]
    TypeConflict(String),
    #[error("unknown connection: {0}")]
    UnknownConnection(String),
    #[error("unknown update: {0}")]
    UnknownUpdate(i64),
    #[error("already in transaction")]
    AlreadyInTransaction,
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl MirrorError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        MirrorError::ConnectionError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        MirrorError::QueryError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        MirrorError::SchemaError(msg.into())
    }

    pub fn incompatible_store<T: Into<String>>(msg: T) -> Self {
        MirrorError::IncompatibleStore(msg.into())
    }

    pub fn unsafe_identifier<T: Into<String>>(token: T) -> Self {
        MirrorError::UnsafeIdentifier(token.into())
    }

    pub fn unknown_type<T: Into<String>>(typename: T) -> Self {
        MirrorError::UnknownType(typename.into())
    }

    pub fn non_object_type<T: Into<String>>(typename: T) -> Self {
        MirrorError::NonObjectType(typename.into())
    }

    pub fn unknown_field<T: Into<String>>(msg: T) -> Self {
        MirrorError::UnknownField(msg.into())
    }

    pub fn not_a_connection<T: Into<String>>(msg: T) -> Self {
        MirrorError::NotAConnection(msg.into())
    }

    pub fn type_conflict<T: Into<String>>(msg: T) -> Self {
        MirrorError::TypeConflict(msg.into())
    }

    pub fn unknown_connection<T: Into<String>>(msg: T) -> Self {
        MirrorError::UnknownConnection(msg.into())
    }

    pub fn invariant<T: Into<String>>(msg: T) -> Self {
        MirrorError::InvariantViolation(msg.into())
    }
}
