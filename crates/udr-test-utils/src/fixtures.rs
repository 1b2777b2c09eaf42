//! Snapshot and route table builders.

use chrono::NaiveDate;
use udr_core::naming;
use udr_core::{NextHopType, Route, RouteTable, ServiceTagSnapshot, TagEntry};

/// Fixed date used by fixtures so generated names are predictable.
pub fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date)
        .unwrap_or_else(|| panic!("day: invalid date {year}-{month}-{date}"))
}

/// Builds a snapshot from `(tag, change_number, prefixes)` triples.
pub fn snapshot(cloud: &str, change_number: u64, tags: &[(&str, u64, &[&str])]) -> ServiceTagSnapshot {
    let entries = tags
        .iter()
        .map(|(name, change, prefixes)| {
            TagEntry::new(*name, *change, prefixes.iter().map(|p| p.to_string()).collect())
        })
        .collect();
    ServiceTagSnapshot::new(cloud, change_number, entries)
}

/// `count` hand-made routes that no service tag owns.
pub fn unrelated_routes(count: usize) -> Vec<Route> {
    (0..count)
        .map(|i| Route {
            name: format!("manual-{i}"),
            address_prefix: format!("172.{}.{}.0/24", 16 + i / 256, i % 256),
            next_hop_type: NextHopType::VirtualAppliance,
            next_hop_ip_address: Some("10.255.0.4".to_string()),
        })
        .collect()
}

/// The routes the reconciler would generate for `prefixes` of one tag version.
pub fn managed_routes(
    prefix: &str,
    cloud: &str,
    tag: &str,
    change_number: u64,
    prefixes: &[&str],
    date: NaiveDate,
) -> Vec<Route> {
    prefixes
        .iter()
        .enumerate()
        .map(|(index, address_prefix)| {
            let name = naming::format(prefix, cloud, tag, change_number, index, date)
                .unwrap_or_else(|e| panic!("managed_routes: {e}"));
            Route::internet(name, *address_prefix)
        })
        .collect()
}

/// A route table holding `routes`.
///
/// # Panics
/// Panics if two routes share a name.
pub fn table(routes: Vec<Route>) -> RouteTable {
    RouteTable::new(routes).unwrap_or_else(|e| panic!("table: {e}"))
}
