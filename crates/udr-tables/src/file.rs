//! JSON file backend
//!
//! Each table is a JSON document shaped like the cloud CLI's route table
//! output, stored at `<root>/<resource group>/<route table>.json`. Fields other
//! than `routes` are preserved on commit.
//!
//! Every commit stamps the document with a new weak etag `W/"<n>"`, so a
//! writer holding a table read before someone else's commit is rejected. A
//! document without an etag reads as `W/"0"`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::Value;
use tracing::debug;
use udr_core::{Route, RouteTable, RouteTableBackend, TableRef};

use crate::splice::splice_routes;
use crate::{Error, Result};

/// Route tables stored as JSON files under one directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the document holding `table`.
    pub fn table_path(&self, table: &TableRef) -> PathBuf {
        self.root
            .join(&table.resource_group)
            .join(format!("{}.json", table.route_table))
    }

    fn read_document(&self, table: &TableRef) -> Result<(PathBuf, Value)> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(Error::NotFound {
                table: table.to_string(),
            });
        }

        // Commits replace the file by rename, so a plain read sees one whole version
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| Error::json(path.display().to_string(), e))?;
        Ok((path, document))
    }
}

fn origin(path: &Path) -> String {
    path.display().to_string()
}

fn raw_routes<'a>(document: &'a Value, path: &Path) -> Result<&'a [Value]> {
    match document.get("routes") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(routes)) => Ok(routes),
        Some(_) => Err(Error::Malformed {
            origin: origin(path),
            message: "`routes` is not an array".to_string(),
        }),
    }
}

fn read_route(raw: &Value) -> Option<Route> {
    serde_json::from_value(raw.clone()).ok()
}

fn write_route(route: &Route) -> Result<Value> {
    serde_json::to_value(route).map_err(|e| Error::json(format!("route {}", route.name), e))
}

const INITIAL_ETAG: &str = "W/\"0\"";

fn etag(document: &Value) -> String {
    document
        .get("etag")
        .and_then(Value::as_str)
        .unwrap_or(INITIAL_ETAG)
        .to_string()
}

/// The etag following `current`; foreign etag formats restart the counter.
fn next_etag(current: &str) -> String {
    let counter = current
        .strip_prefix("W/\"")
        .and_then(|rest| rest.strip_suffix('"'))
        .and_then(|n| n.parse::<u64>().ok());
    match counter {
        Some(n) => format!("W/\"{}\"", n.saturating_add(1)),
        None => "W/\"1\"".to_string(),
    }
}

impl FileBackend {
    fn fetch_table(&self, table: &TableRef) -> Result<RouteTable> {
        let (path, document) = self.read_document(table)?;
        let routes = raw_routes(&document, &path)?
            .iter()
            .map(|raw| {
                serde_json::from_value::<Route>(raw.clone())
                    .map_err(|e| Error::json(origin(&path), e))
            })
            .collect::<Result<Vec<_>>>()?;

        let routes = RouteTable::new(routes).map_err(|e| Error::Malformed {
            origin: origin(&path),
            message: e.to_string(),
        })?;
        debug!(%table, path = %path.display(), routes = routes.len(), "Read route table file");
        Ok(routes.with_etag(Some(etag(&document))))
    }

    fn commit_table(&self, table: &TableRef, routes: &RouteTable) -> Result<()> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(Error::NotFound {
                table: table.to_string(),
            });
        }

        // The document itself is replaced by rename, so writers serialize on
        // a sidecar that stays put
        let lock_path = sidecar(&path, "lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;
        lock_file
            .lock_exclusive()
            .map_err(|_| Error::LockFailed { path: lock_path.clone() })?;

        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let mut document: Value =
            serde_json::from_str(&content).map_err(|e| Error::json(origin(&path), e))?;

        let stored = etag(&document);
        if let Some(expected) = &routes.etag
            && *expected != stored
        {
            return Err(Error::Conflict {
                table: table.to_string(),
            });
        }

        let spliced = splice_routes(
            raw_routes(&document, &path)?,
            routes.routes(),
            read_route,
            write_route,
        )?;
        let new_etag = next_etag(&stored);
        match document.as_object_mut() {
            Some(object) => {
                object.insert("routes".to_string(), Value::Array(spliced));
                object.insert("etag".to_string(), Value::String(new_etag.clone()));
            }
            None => {
                return Err(Error::Malformed {
                    origin: origin(&path),
                    message: "document is not a JSON object".to_string(),
                });
            }
        }

        let mut bytes =
            serde_json::to_vec_pretty(&document).map_err(|e| Error::json(origin(&path), e))?;
        bytes.push(b'\n');
        write_atomic(&path, &bytes)?;

        debug!(%table, path = %path.display(), routes = routes.len(), etag = %new_etag, "Wrote route table file");
        Ok(())
    }
}

/// Hidden file next to `path`, e.g. `.rt.json.lock`.
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}

/// Write-to-temp-then-rename in the target's directory.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = sidecar(path, &format!("{}.tmp", std::process::id()));

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}

impl RouteTableBackend for FileBackend {
    fn fetch(&self, table: &TableRef) -> udr_core::Result<RouteTable> {
        Ok(self.fetch_table(table)?)
    }

    fn commit(&self, table: &TableRef, routes: &RouteTable) -> udr_core::Result<()> {
        Ok(self.commit_table(table, routes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_next_etag_counts_up() {
        assert_eq!(next_etag("W/\"0\""), "W/\"1\"");
        assert_eq!(next_etag("W/\"41\""), "W/\"42\"");
    }

    #[test]
    fn test_next_etag_restarts_on_foreign_format() {
        assert_eq!(next_etag("W/\"5c1e-aa\""), "W/\"1\"");
        assert_eq!(next_etag("abc"), "W/\"1\"");
    }

    #[test]
    fn test_missing_etag_reads_as_initial() {
        assert_eq!(etag(&json!({"routes": []})), INITIAL_ETAG);
        assert_eq!(etag(&json!({"etag": "W/\"3\""})), "W/\"3\"");
    }
}
