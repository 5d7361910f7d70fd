use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Store,
    Website,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Store => f.write_str("store"),
            EntityKind::Website => f.write_str("website"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The registry has no store or website with the requested id or code.
    #[error("the requested {entity} was not found: {identifier}")]
    NotFound {
        entity: EntityKind,
        identifier: String,
    },

    /// A scope setter received a scope type other than store(s) or website(s).
    #[error(
        "Invalid scope type provided. Expected one of \"websites, stores\" or \"website, store\"; received \"{0}\""
    )]
    InvalidArgument(String),
}

impl ScopeError {
    pub fn store_not_found(identifier: impl fmt::Display) -> Self {
        ScopeError::NotFound {
            entity: EntityKind::Store,
            identifier: identifier.to_string(),
        }
    }

    pub fn website_not_found(identifier: impl fmt::Display) -> Self {
        ScopeError::NotFound {
            entity: EntityKind::Website,
            identifier: identifier.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ScopeError::NotFound { .. })
    }
}
