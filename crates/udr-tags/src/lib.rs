//! Service tag snapshot download and parsing.
//!
//! The published document is reached through a per-cloud confirmation page
//! that links to the actual JSON file. This crate scrapes that link, downloads
//! the document and turns it into a [`udr_core::ServiceTagSnapshot`].

pub mod document;
pub mod error;
pub mod scrape;
pub mod source;

pub use document::{ServiceTagDocument, parse_document};
pub use error::{Error, Result};
pub use scrape::find_document_link;
pub use source::{DEFAULT_TIMEOUT, FileSnapshotSource, HttpSnapshotSource, SnapshotSource};
