//! Core reconciliation layer for service-tag route tables
//!
//! This crate has no I/O of its own. It implements:
//!
//! - **Cloud environments**: the four sovereign clouds and their endpoints
//! - **Naming**: the `prefix-cloud-tag-changeNumber-index-date` route name codec
//! - **Snapshot model**: typed view over a service tag document
//! - **Route table model**: typed view over one route table
//! - **Reconciler**: per-tag stale/fresh decisions and the aggregate capacity check
//! - **Apply executor**: stage a plan locally and commit it once through a backend
//!
//! # Architecture
//!
//! ```text
//!             udr-cli
//!                |
//!     +----------+----------+
//!     |          |          |
//! udr-tags   udr-core   udr-tables
//!     |                     |
//!     +------> udr-core <---+
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use udr_core::{Operation, ReconcileRequest, RouteTable, ServiceTagSnapshot, TagEntry, reconcile};
//!
//! let snapshot = ServiceTagSnapshot::new(
//!     "Public",
//!     10,
//!     vec![TagEntry::new("Foo", 3, vec!["10.0.0.0/8".into()])],
//! );
//! let request = ReconcileRequest::new(["Foo"], Operation::Sync)
//!     .with_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
//!
//! let plan = reconcile(&RouteTable::default(), &snapshot, &request).unwrap();
//! assert_eq!(plan.to_add[0].name, "STUDR-Public-Foo-3-0-20240102");
//! ```

pub mod apply;
pub mod backend;
pub mod cloud;
pub mod error;
pub mod naming;
pub mod reconcile;
pub mod route_table;
pub mod snapshot;

pub use apply::{ApplyExecutor, ApplyOptions, ApplyOutcome};
pub use backend::{RouteTableBackend, TableRef};
pub use cloud::CloudEnvironment;
pub use error::{BackendError, Error, Result};
pub use naming::ManagedRouteName;
pub use reconcile::{
    DEFAULT_CAPACITY, DEFAULT_PREFIX, Operation, ReconcileRequest, ReconciliationPlan, TagAction,
    TagPlan, reconcile,
};
pub use route_table::{NextHopType, Route, RouteTable};
pub use snapshot::{AddressFamily, ServiceTagSnapshot, TagEntry};
