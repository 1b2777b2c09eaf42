//! Command implementations for udr-cli

pub mod apply;
pub mod status;
pub mod tags;

pub use apply::run_reconcile;
pub use status::run_status;
pub use tags::run_tags;
