//! Managed route naming.
//!
//! Every route generated by the reconciler carries its provenance in its name:
//! ```text
//! {prefix}-{cloud}-{tag}-{tagChangeNumber}-{index}-{YYYYMMDD}
//! ```
//! `format` is the only producer of such names and `parse` the only reader,
//! so `parse(format(k)) == k` holds for every valid `k`. Routes owned by one
//! tag are recognised by the `stem` prefix `{prefix}-{cloud}-{tag}-` regardless
//! of version, index or date.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Field separator inside a managed route name.
pub const SEPARATOR: char = '-';

/// `chrono` format of the trailing date field.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Six fields, canonical decimal integers, eight-digit date.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^-]+)-([^-]+)-([^-]+)-(0|[1-9][0-9]*)-(0|[1-9][0-9]*)-([0-9]{8})$")
        .expect("Invalid managed route name regex")
});

/// The decoded form of a managed route name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedRouteName {
    /// Operator-chosen prefix, `STUDR` by default
    pub prefix: String,
    /// Cloud name as published in the snapshot (e.g. `Public`)
    pub cloud: String,
    /// Service tag name as published in the snapshot
    pub tag: String,
    /// The tag's change number when the route was generated
    pub tag_change_number: u64,
    /// Ordinal of the prefix within the tag's prefix list
    pub index: usize,
    /// Day the route was generated
    pub date: NaiveDate,
}

impl ManagedRouteName {
    /// Render this name, validating every text component.
    pub fn format(&self) -> Result<String> {
        format(
            &self.prefix,
            &self.cloud,
            &self.tag,
            self.tag_change_number,
            self.index,
            self.date,
        )
    }

    /// The ownership stem shared by every route of this name's tag.
    pub fn stem(&self) -> String {
        stem(&self.prefix, &self.cloud, &self.tag)
    }
}

impl fmt::Display for ManagedRouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.stem(),
            self.tag_change_number,
            SEPARATOR,
            self.index,
            SEPARATOR
        )?;
        write!(f, "{}", self.date.format(DATE_FORMAT))
    }
}

/// Checks that a text component can be embedded in a route name.
pub fn validate_component(component: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains(SEPARATOR) {
        return Err(Error::InvalidNameComponent {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Builds a managed route name.
///
/// # Errors
///
/// Returns [`Error::InvalidNameComponent`] when `prefix`, `cloud` or `tag` is
/// empty or contains [`SEPARATOR`], or when the date's year does not fit the
/// four-digit field.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use udr_core::naming::format;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let name = format("STUDR", "Public", "Storage", 42, 0, date).unwrap();
/// assert_eq!(name, "STUDR-Public-Storage-42-0-20240301");
/// ```
pub fn format(
    prefix: &str,
    cloud: &str,
    tag: &str,
    tag_change_number: u64,
    index: usize,
    date: NaiveDate,
) -> Result<String> {
    validate_component("prefix", prefix)?;
    validate_component("cloud", cloud)?;
    validate_component("tag", tag)?;
    if !(0..=9999).contains(&date.year()) {
        return Err(Error::InvalidNameComponent {
            component: "date",
            value: date.to_string(),
        });
    }

    Ok(format!(
        "{prefix}{SEPARATOR}{cloud}{SEPARATOR}{tag}{SEPARATOR}{tag_change_number}{SEPARATOR}{index}{SEPARATOR}{}",
        date.format(DATE_FORMAT)
    ))
}

/// The name prefix shared by all routes generated for one tag.
pub fn stem(prefix: &str, cloud: &str, tag: &str) -> String {
    format!("{prefix}{SEPARATOR}{cloud}{SEPARATOR}{tag}{SEPARATOR}")
}

/// Whether `name` belongs to the tag identified by `stem`.
///
/// Route names are case-insensitive on the cloud side, so the comparison is too.
pub fn is_owned(name: &str, stem: &str) -> bool {
    name.len() >= stem.len()
        && name.is_char_boundary(stem.len())
        && name[..stem.len()].eq_ignore_ascii_case(stem)
}

/// Decodes a route name.
///
/// Returns `None` for any name this scheme did not produce; route tables
/// routinely hold hand-made routes, so that is not an error.
pub fn parse(name: &str) -> Option<ManagedRouteName> {
    let caps = NAME_REGEX.captures(name)?;

    let tag_change_number = caps[4].parse::<u64>().ok()?;
    let index = caps[5].parse::<usize>().ok()?;
    let date = NaiveDate::parse_from_str(&caps[6], DATE_FORMAT).ok()?;

    Some(ManagedRouteName {
        prefix: caps[1].to_string(),
        cloud: caps[2].to_string(),
        tag: caps[3].to_string(),
        tag_change_number,
        index,
        date,
    })
}
