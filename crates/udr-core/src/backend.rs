//! Route table backend abstraction
//!
//! Provides a unified interface for reading and writing one route table,
//! whatever stores it (a cloud control plane, a JSON file, memory).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::route_table::RouteTable;

/// Addresses one route table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Resource group holding the table
    pub resource_group: String,
    /// Route table name
    pub route_table: String,
}

impl TableRef {
    pub fn new(resource_group: impl Into<String>, route_table: impl Into<String>) -> Self {
        Self {
            resource_group: resource_group.into(),
            route_table: route_table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.route_table)
    }
}

/// Trait for route table storage.
///
/// A commit replaces the whole route list; it is not a per-route patch.
/// Callers must serialize runs against one table.
pub trait RouteTableBackend: Send + Sync {
    /// Read the current routes of `table`.
    ///
    /// Returns [`crate::Error::RouteTableNotFound`] when the table does not exist.
    fn fetch(&self, table: &TableRef) -> Result<RouteTable>;

    /// Replace the routes of `table` with `routes`.
    ///
    /// `routes.etag`, when set, is the token handed out by [`Self::fetch`];
    /// backends that support it refuse the write if the table changed since.
    fn commit(&self, table: &TableRef, routes: &RouteTable) -> Result<()>;
}

impl<T: RouteTableBackend + ?Sized> RouteTableBackend for Box<T> {
    fn fetch(&self, table: &TableRef) -> Result<RouteTable> {
        (**self).fetch(table)
    }

    fn commit(&self, table: &TableRef, routes: &RouteTable) -> Result<()> {
        (**self).commit(table, routes)
    }
}
