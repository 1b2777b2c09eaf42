//! Typed view over a downloaded service tag document.

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which address prefixes of a tag become routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4 and IPv6 prefixes
    #[default]
    Any,
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    fn admits(self, addr: &IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::Ipv4 => addr.is_ipv4(),
            AddressFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

impl FromStr for AddressFamily {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "all" => Ok(AddressFamily::Any),
            "ipv4" | "v4" => Ok(AddressFamily::Ipv4),
            "ipv6" | "v6" => Ok(AddressFamily::Ipv6),
            _ => Err(Error::invalid_request(format!(
                "unknown address family {s:?} (expected any, ipv4 or ipv6)"
            ))),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Any => write!(f, "any"),
            AddressFamily::Ipv4 => write!(f, "ipv4"),
            AddressFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// One named, versioned group of address prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    /// Tag name exactly as published
    pub name: String,
    /// Version of this tag's prefix list
    pub change_number: u64,
    address_prefixes: Vec<String>,
}

impl TagEntry {
    /// Creates an entry, dropping repeated prefixes while keeping first-seen order.
    pub fn new(name: impl Into<String>, change_number: u64, prefixes: Vec<String>) -> Self {
        let mut seen = HashSet::with_capacity(prefixes.len());
        let address_prefixes: Vec<String> = prefixes
            .into_iter()
            .filter(|prefix| seen.insert(prefix.clone()))
            .collect();
        Self {
            name: name.into(),
            change_number,
            address_prefixes,
        }
    }

    /// All prefixes in document order.
    pub fn address_prefixes(&self) -> &[String] {
        &self.address_prefixes
    }

    /// Prefixes of the requested family, in document order.
    ///
    /// The position in the returned list is the route index, so the order must
    /// stay that of the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddressPrefix`] for anything that is not `ip/len`.
    pub fn prefixes_for(&self, family: AddressFamily) -> Result<Vec<&str>> {
        let mut selected = Vec::new();
        for prefix in &self.address_prefixes {
            let addr = parse_cidr(prefix).ok_or_else(|| Error::InvalidAddressPrefix {
                tag: self.name.clone(),
                prefix: prefix.clone(),
            })?;
            if family.admits(&addr) {
                selected.push(prefix.as_str());
            }
        }
        Ok(selected)
    }
}

fn parse_cidr(prefix: &str) -> Option<IpAddr> {
    let (addr, len) = prefix.split_once('/')?;
    let addr: IpAddr = addr.parse().ok()?;
    let len: u8 = len.parse().ok()?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    (len <= max).then_some(addr)
}

/// A versioned snapshot of every service tag in one cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTagSnapshot {
    /// Cloud name as published (e.g. `Public`)
    pub cloud: String,
    /// Version of the whole document
    pub change_number: u64,
    tags: Vec<TagEntry>,
}

impl ServiceTagSnapshot {
    pub fn new(cloud: impl Into<String>, change_number: u64, tags: Vec<TagEntry>) -> Self {
        Self {
            cloud: cloud.into(),
            change_number,
            tags,
        }
    }

    /// Looks up a tag by name, ignoring case.
    pub fn tag(&self, name: &str) -> Option<&TagEntry> {
        self.tags
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// All tags in document order.
    pub fn tags(&self) -> &[TagEntry] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
