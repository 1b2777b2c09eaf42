//! Reconciler implementation
//!
//! Decides, tag by tag, which owned routes are stale and which routes must be
//! (re)created, then checks the aggregated plan against the table's capacity
//! once, before anything is applied.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::naming;
use crate::route_table::{Route, RouteTable};
use crate::snapshot::{AddressFamily, ServiceTagSnapshot, TagEntry};
use crate::{Error, Result};

use super::plan::{ReconciliationPlan, TagAction, TagPlan};

/// Route limit of a single cloud route table.
pub const DEFAULT_CAPACITY: usize = 400;

/// Name prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "STUDR";

/// What to do with the requested tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create missing routes and replace outdated ones
    Sync,
    /// Delete every owned route
    Remove,
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "sync" => Ok(Operation::Sync),
            "remove" | "delete" => Ok(Operation::Remove),
            _ => Err(Error::invalid_request(format!("unknown operation {s:?}"))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Sync => write!(f, "sync"),
            Operation::Remove => write!(f, "remove"),
        }
    }
}

/// Inputs of one reconciliation besides the two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// Tag names to act on; matched against the snapshot ignoring case
    pub targets: Vec<String>,
    pub operation: Operation,
    /// First field of every generated route name
    pub prefix: String,
    /// Maximum number of routes the table may hold after the plan
    pub capacity: usize,
    /// Date stamped into generated names
    pub date: NaiveDate,
    /// Which prefixes of each tag become routes
    pub family: AddressFamily,
}

impl ReconcileRequest {
    /// A request with the default prefix and capacity, dated today.
    pub fn new<I, S>(targets: I, operation: Operation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            operation,
            prefix: DEFAULT_PREFIX.to_string(),
            capacity: DEFAULT_CAPACITY,
            date: Local::now().date_naive(),
            family: AddressFamily::default(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_family(mut self, family: AddressFamily) -> Self {
        self.family = family;
        self
    }
}

/// Computes the changes that bring `current` in line with `snapshot` for the
/// requested tags.
///
/// Only routes under the stem of a requested tag are ever touched. The whole
/// request fails if any tag is unknown or if the aggregated plan would exceed
/// `request.capacity`; no partial plan is returned.
///
/// # Errors
///
/// - [`Error::InvalidRequest`] if no targets were given
/// - [`Error::InvalidNameComponent`] if the prefix, cloud or a tag cannot be
///   embedded in a route name
/// - [`Error::UnknownServiceTag`] if a target is not in the snapshot
/// - [`Error::InvalidAddressPrefix`] if a synced tag carries a malformed prefix
/// - [`Error::CapacityExceeded`] if the resulting table would be too large
pub fn reconcile(
    current: &RouteTable,
    snapshot: &ServiceTagSnapshot,
    request: &ReconcileRequest,
) -> Result<ReconciliationPlan> {
    if request.targets.is_empty() {
        return Err(Error::invalid_request("at least one service tag is required"));
    }
    naming::validate_component("prefix", &request.prefix)?;
    naming::validate_component("cloud", &snapshot.cloud)?;

    let entries = resolve_targets(snapshot, &request.targets)?;
    let mut plan = ReconciliationPlan::default();

    for entry in entries {
        let (remove, add, summary) = plan_tag(current, &snapshot.cloud, entry, request)?;
        debug!(
            tag = %summary.tag,
            change_number = summary.change_number,
            action = ?summary.action,
            removed = summary.removed,
            added = summary.added,
            "Planned service tag"
        );
        plan.to_remove.extend(remove);
        plan.to_add.extend(add);
        plan.tags.push(summary);
    }

    let projected = plan.projected_len(current.len());
    if projected > request.capacity {
        return Err(Error::CapacityExceeded {
            projected,
            capacity: request.capacity,
        });
    }

    info!(
        operation = %request.operation,
        remove = plan.to_remove.len(),
        add = plan.to_add.len(),
        projected,
        "Reconciliation plan ready"
    );
    Ok(plan)
}

/// Looks every target up, keeping the first spelling of each distinct tag.
fn resolve_targets<'s>(
    snapshot: &'s ServiceTagSnapshot,
    targets: &[String],
) -> Result<Vec<&'s TagEntry>> {
    let mut entries: Vec<&TagEntry> = Vec::with_capacity(targets.len());
    for target in targets {
        let entry = snapshot.tag(target).ok_or_else(|| Error::UnknownServiceTag {
            tag: target.clone(),
        })?;
        naming::validate_component("tag", &entry.name)?;
        if !entries.iter().any(|seen| seen.name == entry.name) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn plan_tag(
    current: &RouteTable,
    cloud: &str,
    entry: &TagEntry,
    request: &ReconcileRequest,
) -> Result<(Vec<String>, Vec<Route>, TagPlan)> {
    let stem = naming::stem(&request.prefix, cloud, &entry.name);
    let owned: Vec<&Route> = current.owned_by(&stem).collect();

    let mut stale = 0usize;
    let mut current_version: Vec<(usize, &str)> = Vec::new();
    for route in &owned {
        match naming::parse(&route.name) {
            Some(name) if name.tag_change_number == entry.change_number => {
                current_version.push((name.index, route.address_prefix.as_str()));
            }
            Some(_) => stale += 1,
            None => {
                warn!(route = %route.name, stem = %stem, "Owned route has an unreadable name; treating as stale");
                stale += 1;
            }
        }
    }

    let owned_names = || owned.iter().map(|route| route.name.clone()).collect::<Vec<_>>();
    let mut summary = TagPlan {
        tag: entry.name.clone(),
        change_number: entry.change_number,
        action: TagAction::Unchanged,
        removed: 0,
        added: 0,
    };

    if request.operation == Operation::Remove {
        summary.action = if owned.is_empty() {
            TagAction::Absent
        } else {
            TagAction::Removed
        };
        summary.removed = owned.len();
        return Ok((owned_names(), Vec::new(), summary));
    }

    let expected = entry.prefixes_for(request.family)?;
    if stale == 0 && represents(&current_version, &expected) {
        return Ok((Vec::new(), Vec::new(), summary));
    }

    let mut add = Vec::with_capacity(expected.len());
    for (index, prefix) in expected.iter().enumerate() {
        let name = naming::format(
            &request.prefix,
            cloud,
            &entry.name,
            entry.change_number,
            index,
            request.date,
        )?;
        add.push(Route::internet(name, *prefix));
    }

    summary.action = if owned.is_empty() {
        TagAction::Created
    } else {
        TagAction::Replaced
    };
    summary.removed = owned.len();
    summary.added = add.len();
    Ok((owned_names(), add, summary))
}

/// Whether the current-version routes cover exactly the expected prefixes at
/// their expected indices.
fn represents(current_version: &[(usize, &str)], expected: &[&str]) -> bool {
    if current_version.len() != expected.len() {
        return false;
    }
    let have: BTreeSet<(usize, &str)> = current_version.iter().copied().collect();
    let want: BTreeSet<(usize, &str)> = expected.iter().copied().enumerate().collect();
    have == want
}
