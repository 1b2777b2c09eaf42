//! Shared test utilities for the udr workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not each
//! hand-roll snapshots and route tables. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`fixtures`]: snapshot and route table builders
//! - [`memory`]: [`MemoryBackend`](memory::MemoryBackend), an in-memory route table backend
//! - [`documents`]: on-disk service tag documents and file-backend tables

pub mod documents;
pub mod fixtures;
pub mod memory;
