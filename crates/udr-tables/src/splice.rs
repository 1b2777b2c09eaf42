//! Rebuilding a stored route list from a committed table.
//!
//! Stored routes carry fields the model does not (ids, provisioning state).
//! Routes that did not change keep their stored JSON untouched; only new
//! routes are rendered from the model.

use serde_json::Value;
use udr_core::Route;

use crate::Result;

pub(crate) fn splice_routes<R, W>(
    existing: &[Value],
    routes: &[Route],
    read: R,
    write: W,
) -> Result<Vec<Value>>
where
    R: Fn(&Value) -> Option<Route>,
    W: Fn(&Route) -> Result<Value>,
{
    routes
        .iter()
        .map(|route| {
            match existing
                .iter()
                .find(|raw| read(raw).as_ref() == Some(route))
            {
                Some(raw) => Ok(raw.clone()),
                None => write(route),
            }
        })
        .collect()
}
