//! Error types for udr-core

/// Result type for udr-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by a route table backend
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while naming, reconciling or applying routes
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A route name component is empty or contains the field separator
    #[error("Invalid route name component {component}: {value:?}")]
    InvalidNameComponent {
        component: &'static str,
        value: String,
    },

    /// The reconcile request itself is unusable
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A requested tag is absent from the snapshot
    #[error("Unknown service tag: {tag}")]
    UnknownServiceTag { tag: String },

    /// The aggregated plan would grow the table past its route limit
    #[error("Route table capacity exceeded: plan would leave {projected} routes (limit {capacity})")]
    CapacityExceeded { projected: usize, capacity: usize },

    /// Two routes in one table share a name
    #[error("Duplicate route name: {name}")]
    DuplicateRouteName { name: String },

    /// A snapshot prefix is not a CIDR block
    #[error("Invalid address prefix {prefix:?} in service tag {tag}")]
    InvalidAddressPrefix { tag: String, prefix: String },

    /// The target route table does not exist
    #[error("Route table not found: {table}")]
    RouteTableNotFound { table: String },

    /// Staging or committing the plan failed
    #[error("Apply failed for {table}: {message}")]
    Apply { table: String, message: String },

    /// Transport or storage failure inside a backend
    #[error("Route table backend error: {0}")]
    Backend(#[source] BackendError),
}

impl Error {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn backend(source: impl Into<BackendError>) -> Self {
        Self::Backend(source.into())
    }
}
