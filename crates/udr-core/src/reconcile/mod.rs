//! Reconciliation of a route table against a service tag snapshot
//!
//! This module provides:
//! - **engine**: the per-tag decision and the aggregate capacity check
//! - **plan**: the plan and per-tag summaries the engine produces

mod engine;
mod plan;

pub use engine::{
    DEFAULT_CAPACITY, DEFAULT_PREFIX, Operation, ReconcileRequest, reconcile,
};
pub use plan::{ReconciliationPlan, TagAction, TagPlan};
