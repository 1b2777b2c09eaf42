//! Apply executor
//!
//! Stages a plan on the in-memory table (removals first, then additions) and
//! commits the result to the backend exactly once. There is no retry and no
//! rollback: if anything fails the staged table is dropped and the next run
//! must read the table again.

use serde::Serialize;
use tracing::{debug, info};

use crate::backend::{RouteTableBackend, TableRef};
use crate::reconcile::ReconciliationPlan;
use crate::route_table::RouteTable;
use crate::{Error, Result};

/// Options for apply operations
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// If true, stage the plan but never commit it.
    pub dry_run: bool,
}

/// Result of applying a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ApplyOutcome {
    /// The plan was empty; the backend was not called
    NoChange,
    /// The plan was staged but not committed
    DryRun { table: RouteTable },
    /// The table was committed
    Applied { removed: usize, added: usize },
}

/// Turns plans into backend commits
pub struct ApplyExecutor<'b> {
    backend: &'b dyn RouteTableBackend,
    options: ApplyOptions,
}

impl<'b> ApplyExecutor<'b> {
    pub fn new(backend: &'b dyn RouteTableBackend) -> Self {
        Self {
            backend,
            options: ApplyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    /// Applies `plan` to `current`, the table as read from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Apply`] if a removal names a missing route, an
    /// addition collides with an existing name, or the commit fails.
    pub fn apply(
        &self,
        table: &TableRef,
        current: RouteTable,
        plan: &ReconciliationPlan,
    ) -> Result<ApplyOutcome> {
        if plan.is_empty() {
            info!(%table, "Plan is empty; nothing to apply");
            return Ok(ApplyOutcome::NoChange);
        }

        let staged = stage(table, current, plan)?;

        if self.options.dry_run {
            info!(%table, routes = staged.len(), "Dry run; skipping commit");
            return Ok(ApplyOutcome::DryRun { table: staged });
        }

        self.backend
            .commit(table, &staged)
            .map_err(|e| Error::Apply {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        info!(
            %table,
            removed = plan.to_remove.len(),
            added = plan.to_add.len(),
            "Route table committed"
        );
        Ok(ApplyOutcome::Applied {
            removed: plan.to_remove.len(),
            added: plan.to_add.len(),
        })
    }
}

fn stage(table: &TableRef, mut current: RouteTable, plan: &ReconciliationPlan) -> Result<RouteTable> {
    let apply_error = |message: String| Error::Apply {
        table: table.to_string(),
        message,
    };

    for name in &plan.to_remove {
        current
            .remove_route(name)
            .ok_or_else(|| apply_error(format!("route {name} is not in the table")))?;
        debug!(route = %name, "Staged removal");
    }
    for route in &plan.to_add {
        current
            .add_route(route.clone())
            .map_err(|e| apply_error(e.to_string()))?;
        debug!(route = %route.name, prefix = %route.address_prefix, "Staged addition");
    }
    Ok(current)
}
