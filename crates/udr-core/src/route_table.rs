//! In-memory model of one route table.
//!
//! The table is read once from a backend, staged locally by the apply
//! executor, and written back in a single commit.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::naming::{self, ManagedRouteName};
use crate::{Error, Result};

/// Where traffic matching a route is sent.
///
/// Unrecognised hop types are kept verbatim so that routes this tool does not
/// manage survive a read-modify-write unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NextHopType {
    Internet,
    VirtualAppliance,
    VnetLocal,
    VirtualNetworkGateway,
    None,
    Other(String),
}

impl From<String> for NextHopType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Internet" => NextHopType::Internet,
            "VirtualAppliance" => NextHopType::VirtualAppliance,
            "VnetLocal" => NextHopType::VnetLocal,
            "VirtualNetworkGateway" => NextHopType::VirtualNetworkGateway,
            "None" => NextHopType::None,
            _ => NextHopType::Other(value),
        }
    }
}

impl From<NextHopType> for String {
    fn from(value: NextHopType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for NextHopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextHopType::Internet => write!(f, "Internet"),
            NextHopType::VirtualAppliance => write!(f, "VirtualAppliance"),
            NextHopType::VnetLocal => write!(f, "VnetLocal"),
            NextHopType::VirtualNetworkGateway => write!(f, "VirtualNetworkGateway"),
            NextHopType::None => write!(f, "None"),
            NextHopType::Other(other) => write!(f, "{other}"),
        }
    }
}

/// A single route entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub name: String,
    pub address_prefix: String,
    pub next_hop_type: NextHopType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hop_ip_address: Option<String>,
}

impl Route {
    /// A route that sends `address_prefix` straight to the internet.
    pub fn internet(name: impl Into<String>, address_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address_prefix: address_prefix.into(),
            next_hop_type: NextHopType::Internet,
            next_hop_ip_address: None,
        }
    }
}

/// A managed route paired with its decoded name.
pub type ManagedRoute<'a> = (ManagedRouteName, &'a Route);

/// The routes of one table, unique by name (ignoring case).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
    /// Opaque concurrency token handed out by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl RouteTable {
    /// Builds a table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRouteName`] if two routes share a name.
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        let mut table = Self::default();
        for route in routes {
            table.add_route(route)?;
        }
        Ok(table)
    }

    pub fn with_etag(mut self, etag: Option<String>) -> Self {
        self.etag = etag;
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.routes
            .iter()
            .position(|route| route.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.position(name).map(|pos| &self.routes[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Routes whose names start with `stem`.
    pub fn owned_by<'a>(&'a self, stem: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes
            .iter()
            .filter(move |route| naming::is_owned(&route.name, stem))
    }

    /// Managed routes carrying `prefix`, grouped by `(cloud, tag)`.
    ///
    /// Each group is ordered by change number, then index.
    pub fn managed_groups(&self, prefix: &str) -> BTreeMap<(String, String), Vec<ManagedRoute<'_>>> {
        let mut groups: BTreeMap<(String, String), Vec<ManagedRoute<'_>>> = BTreeMap::new();
        for route in &self.routes {
            let Some(parsed) = naming::parse(&route.name) else {
                continue;
            };
            if !parsed.prefix.eq_ignore_ascii_case(prefix) {
                continue;
            }
            groups
                .entry((parsed.cloud.clone(), parsed.tag.clone()))
                .or_default()
                .push((parsed, route));
        }
        for routes in groups.values_mut() {
            routes.sort_by_key(|(name, _)| (name.tag_change_number, name.index));
        }
        groups
    }

    /// Removes and returns the route called `name`.
    pub fn remove_route(&mut self, name: &str) -> Option<Route> {
        let pos = self.position(name)?;
        Some(self.routes.remove(pos))
    }

    /// Appends a route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRouteName`] if the name is already taken.
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        if self.contains(&route.name) {
            return Err(Error::DuplicateRouteName { name: route.name });
        }
        self.routes.push(route);
        Ok(())
    }
}
