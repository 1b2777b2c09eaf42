//! Route table backends.
//!
//! Two implementations of [`udr_core::RouteTableBackend`]:
//!
//! - [`FileBackend`] keeps each table as a JSON document on disk, in the
//!   shape the cloud CLI prints. Useful offline and in tests.
//! - [`ArmBackend`] reads and replaces tables through the Azure Resource
//!   Manager API with optimistic concurrency on the etag.
//!
//! Both preserve the stored fields of routes they did not change.

pub mod arm;
pub mod error;
pub mod file;
mod splice;

pub use arm::{API_VERSION, ArmBackend};
pub use error::{Error, Result};
pub use file::FileBackend;
