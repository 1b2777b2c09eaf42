//! Plan types produced by the reconciler

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::route_table::{Route, RouteTable};

/// What the plan does to one requested tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagAction {
    /// Current routes already represent the tag
    Unchanged,
    /// No routes existed; all are created
    Created,
    /// Existing routes are dropped and regenerated
    Replaced,
    /// Existing routes are dropped
    Removed,
    /// Removal requested but nothing is owned
    Absent,
}

/// Per-tag summary of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPlan {
    /// Tag name as published in the snapshot
    pub tag: String,
    /// The tag's current change number
    pub change_number: u64,
    pub action: TagAction,
    /// Number of owned routes marked for removal
    pub removed: usize,
    /// Number of routes staged for creation
    pub added: usize,
}

/// The full set of changes for one route table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Names of routes to delete
    pub to_remove: BTreeSet<String>,
    /// Routes to create, in tag then index order
    pub to_add: Vec<Route>,
    /// One entry per requested tag
    pub tags: Vec<TagPlan>,
}

impl ReconciliationPlan {
    /// True when applying the plan would change nothing.
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Route count once the plan is applied to a table of `current_len` routes.
    pub fn projected_len(&self, current_len: usize) -> usize {
        (current_len + self.to_add.len()).saturating_sub(self.to_remove.len())
    }

    /// The table as it would look after applying this plan.
    ///
    /// Removals that name no existing route are ignored here; the apply
    /// executor is where they become errors.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DuplicateRouteName`] if an added route collides
    /// with one that is kept.
    pub fn preview(&self, current: &RouteTable) -> Result<RouteTable> {
        let mut routes: Vec<Route> = current
            .routes()
            .iter()
            .filter(|route| !self.removes(&route.name))
            .cloned()
            .collect();
        routes.extend(self.to_add.iter().cloned());
        Ok(RouteTable::new(routes)?.with_etag(current.etag.clone()))
    }

    /// Whether `name` is marked for removal (ignoring case).
    pub fn removes(&self, name: &str) -> bool {
        self.to_remove.contains(name)
            || self
                .to_remove
                .iter()
                .any(|removed| removed.eq_ignore_ascii_case(name))
    }
}
