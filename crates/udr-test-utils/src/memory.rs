//! In-memory route table backend.

use std::collections::HashMap;
use std::sync::Mutex;

use udr_core::{Error, Result, RouteTable, RouteTableBackend, TableRef};

/// Route tables held in memory, with a commit counter for assertions.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<TableRef, RouteTable>>,
    commits: Mutex<usize>,
    fail_commits: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend holding one table.
    pub fn with_table(table: TableRef, routes: RouteTable) -> Self {
        let backend = Self::new();
        backend.insert(table, routes);
        backend
    }

    /// Makes every commit fail with a backend error.
    pub fn failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    pub fn insert(&self, table: TableRef, routes: RouteTable) {
        self.tables.lock().unwrap().insert(table, routes);
    }

    /// The stored table, if any.
    pub fn get(&self, table: &TableRef) -> Option<RouteTable> {
        self.tables.lock().unwrap().get(table).cloned()
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        *self.commits.lock().unwrap()
    }
}

impl RouteTableBackend for MemoryBackend {
    fn fetch(&self, table: &TableRef) -> Result<RouteTable> {
        self.get(table).ok_or_else(|| Error::RouteTableNotFound {
            table: table.to_string(),
        })
    }

    fn commit(&self, table: &TableRef, routes: &RouteTable) -> Result<()> {
        if self.fail_commits {
            return Err(Error::backend("simulated commit failure"));
        }
        let mut tables = self.tables.lock().unwrap();
        if !tables.contains_key(table) {
            return Err(Error::RouteTableNotFound {
                table: table.to_string(),
            });
        }
        tables.insert(table.clone(), routes.clone());
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
}
