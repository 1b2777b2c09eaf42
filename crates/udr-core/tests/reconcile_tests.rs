//! Tests for the reconciler

use pretty_assertions::assert_eq;
use rstest::rstest;
use udr_core::naming;
use udr_core::{
    AddressFamily, Error, Operation, ReconcileRequest, ReconciliationPlan, Route, RouteTable,
    TagAction, reconcile,
};
use udr_test_utils::fixtures::{day, managed_routes, snapshot, table, unrelated_routes};

const FOO: &[&str] = &["10.0.0.0/8", "10.1.0.0/16"];

fn request(targets: &[&str], operation: Operation) -> ReconcileRequest {
    ReconcileRequest::new(targets.iter().copied(), operation).with_date(day(2024, 5, 17))
}

fn names(routes: &[Route]) -> Vec<(&str, &str)> {
    routes
        .iter()
        .map(|r| (r.name.as_str(), r.address_prefix.as_str()))
        .collect()
}

/// Applies a plan the way a backend commit would, without the executor.
fn apply(current: &RouteTable, plan: &ReconciliationPlan) -> RouteTable {
    plan.preview(current).unwrap()
}

#[test]
fn test_scenario_empty_table_gets_every_prefix() {
    let snap = snapshot("Public", 10, &[("Foo", 3, FOO)]);
    let plan = reconcile(&RouteTable::default(), &snap, &request(&["Foo"], Operation::Sync)).unwrap();

    assert!(plan.to_remove.is_empty());
    assert_eq!(
        names(&plan.to_add),
        vec![
            ("STUDR-Public-Foo-3-0-20240517", "10.0.0.0/8"),
            ("STUDR-Public-Foo-3-1-20240517", "10.1.0.0/16"),
        ]
    );
    assert!(plan.to_add.iter().all(|r| r.next_hop_type == udr_core::NextHopType::Internet));
    assert_eq!(plan.tags[0].action, TagAction::Created);
}

#[test]
fn test_sync_is_idempotent() {
    let snap = snapshot("Public", 10, &[("Foo", 3, FOO)]);
    let current = table(unrelated_routes(3));
    let req = request(&["Foo"], Operation::Sync);

    let first = reconcile(&current, &snap, &req).unwrap();
    assert!(!first.is_empty());

    let after = apply(&current, &first);
    let second = reconcile(&after, &snap, &req).unwrap();
    assert!(second.is_empty(), "second plan should be empty: {second:?}");
    assert_eq!(second.tags[0].action, TagAction::Unchanged);
}

#[test]
fn test_sync_is_idempotent_across_days() {
    let snap = snapshot("Public", 10, &[("Foo", 3, FOO)]);
    let current = table(managed_routes("STUDR", "Public", "Foo", 3, FOO, day(2024, 1, 1)));

    let plan = reconcile(&current, &snap, &request(&["Foo"], Operation::Sync)).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn test_any_stale_route_invalidates_whole_owned_set() {
    let snap = snapshot("Public", 10, &[("Foo", 4, FOO)]);
    let mut routes = managed_routes("STUDR", "Public", "Foo", 4, FOO, day(2024, 1, 1));
    routes.extend(managed_routes("STUDR", "Public", "Foo", 3, &["10.9.0.0/16"], day(2023, 12, 1)));
    let current = table(routes);

    let plan = reconcile(&current, &snap, &request(&["Foo"], Operation::Sync)).unwrap();

    assert_eq!(plan.to_remove.len(), 3, "every owned route must go");
    assert!(plan.to_remove.contains("STUDR-Public-Foo-4-0-20240101"));
    assert!(plan.to_remove.contains("STUDR-Public-Foo-3-0-20231201"));
    assert_eq!(
        names(&plan.to_add),
        vec![
            ("STUDR-Public-Foo-4-0-20240517", "10.0.0.0/8"),
            ("STUDR-Public-Foo-4-1-20240517", "10.1.0.0/16"),
        ]
    );
    assert_eq!(plan.tags[0].action, TagAction::Replaced);
}

#[test]
fn test_never_touches_routes_outside_requested_stems() {
    let snap = snapshot(
        "Public",
        10,
        &[("Foo", 4, FOO), ("Bar", 2, &["20.0.0.0/8"]), ("FooBar", 1, &["30.0.0.0/8"])],
    );
    let mut routes = unrelated_routes(5);
    routes.extend(managed_routes("STUDR", "Public", "Foo", 3, FOO, day(2024, 1, 1)));
    routes.extend(managed_routes("STUDR", "Public", "Bar", 1, &["20.0.0.0/8"], day(2024, 1, 1)));
    routes.extend(managed_routes("STUDR", "Public", "FooBar", 0, &["30.0.0.0/8"], day(2024, 1, 1)));
    routes.extend(managed_routes("OTHER", "Public", "Foo", 3, FOO, day(2024, 1, 1)));
    routes.extend(managed_routes("STUDR", "AzureGovernment", "Foo", 3, FOO, day(2024, 1, 1)));
    let current = table(routes);

    for operation in [Operation::Sync, Operation::Remove] {
        let plan = reconcile(&current, &snap, &request(&["Foo"], operation)).unwrap();
        let stem = naming::stem("STUDR", "Public", "Foo");
        for name in &plan.to_remove {
            assert!(naming::is_owned(name, &stem), "{operation}: {name} is not owned by Foo");
        }
        assert_eq!(plan.to_remove.len(), 2, "{operation}");
    }
}

#[test]
fn test_capacity_is_checked_over_the_whole_plan() {
    let snap = snapshot(
        "Public",
        10,
        &[("Foo", 3, &["1.0.0.0/8", "2.0.0.0/8", "3.0.0.0/8", "4.0.0.0/8", "5.0.0.0/8"])],
    );
    let current = table(unrelated_routes(398));

    let err = reconcile(&current, &snap, &request(&["Foo"], Operation::Sync)).unwrap_err();
    match err {
        Error::CapacityExceeded { projected, capacity } => {
            assert_eq!(projected, 403);
            assert_eq!(capacity, 400);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
    assert_eq!(current.len(), 398);
}

#[test]
fn test_capacity_counts_interactions_between_tags() {
    // Alone each tag fits; together they do not.
    let snap = snapshot(
        "Public",
        10,
        &[("Foo", 3, &["1.0.0.0/8", "2.0.0.0/8"]), ("Bar", 1, &["3.0.0.0/8", "4.0.0.0/8"])],
    );
    let current = table(unrelated_routes(7));

    let req = |targets: &[&str]| request(targets, Operation::Sync).with_capacity(10);
    assert!(reconcile(&current, &snap, &req(&["Foo"])).is_ok());
    assert!(reconcile(&current, &snap, &req(&["Bar"])).is_ok());
    assert!(matches!(
        reconcile(&current, &snap, &req(&["Foo", "Bar"])),
        Err(Error::CapacityExceeded { projected: 11, capacity: 10 })
    ));
}

#[test]
fn test_capacity_accounts_for_removals() {
    let snap = snapshot("Public", 10, &[("Foo", 4, FOO)]);
    let mut routes = unrelated_routes(398);
    routes.extend(managed_routes("STUDR", "Public", "Foo", 3, FOO, day(2024, 1, 1)));
    let current = table(routes);

    let plan = reconcile(&current, &snap, &request(&["Foo"], Operation::Sync)).unwrap();
    assert_eq!(plan.projected_len(current.len()), 400);
}

#[test]
fn test_remove_only_drops_owned_routes() {
    let snap = snapshot("Public", 10, &[("Foo", 9, FOO)]);
    let current = table(managed_routes(
        "STUDR",
        "Public",
        "Foo",
        3,
        &["10.0.0.0/8", "10.1.0.0/16", "10.2.0.0/16"],
        day(2024, 1, 1),
    ));

    let plan = reconcile(&current, &snap, &request(&["Foo"], Operation::Remove)).unwrap();

    assert_eq!(
        plan.to_remove.iter().map(String::as_str).collect::<Vec<_>>(),
        vec![
            "STUDR-Public-Foo-3-0-20240101",
            "STUDR-Public-Foo-3-1-20240101",
            "STUDR-Public-Foo-3-2-20240101",
        ]
    );
    assert!(plan.to_add.is_empty());
    assert_eq!(plan.tags[0].action, TagAction::Removed);
}

#[test]
fn test_remove_of_absent_tag_is_empty_plan() {
    let snap = snapshot("Public", 10, &[("Foo", 9, FOO)]);
    let plan = reconcile(&table(unrelated_routes(2)), &snap, &request(&["Foo"], Operation::Remove)).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.tags[0].action, TagAction::Absent);
}

#[rstest]
#[case::sync(Operation::Sync)]
#[case::remove(Operation::Remove)]
fn test_unknown_tag_fails_whole_request(#[case] operation: Operation) {
    let snap = snapshot("Public", 10, &[("Foo", 3, FOO)]);
    let err = reconcile(&RouteTable::default(), &snap, &request(&["Foo", "Nope"], operation)).unwrap_err();
    assert!(matches!(err, Error::UnknownServiceTag { ref tag } if tag == "Nope"), "got {err:?}");
}

#[test]
fn test_tag_lookup_uses_published_spelling() {
    let snap = snapshot("Public", 10, &[("AzureCloud.westeurope", 12, &["40.0.0.0/8"])]);
    let plan = reconcile(
        &RouteTable::default(),
        &snap,
        &request(&["azurecloud.WESTEUROPE"], Operation::Sync),
    )
    .unwrap();
    assert_eq!(plan.to_add[0].name, "STUDR-Public-AzureCloud.westeurope-12-0-20240517");
}

#[test]
fn test_custom_prefix_and_family_filter() {
    let snap = snapshot("Public", 10, &[("Foo", 3, &["2603:1000::/40", "10.0.0.0/8", "11.0.0.0/8"])]);
    let req = request(&["Foo"], Operation::Sync)
        .with_prefix("EGRESS")
        .with_family(AddressFamily::Ipv4);

    let plan = reconcile(&RouteTable::default(), &snap, &req).unwrap();
    assert_eq!(
        names(&plan.to_add),
        vec![
            ("EGRESS-Public-Foo-3-0-20240517", "10.0.0.0/8"),
            ("EGRESS-Public-Foo-3-1-20240517", "11.0.0.0/8"),
        ]
    );
}

#[test]
fn test_multi_tag_plan_keeps_request_order() {
    let snap = snapshot("Public", 10, &[("Foo", 3, FOO), ("Bar", 1, &["20.0.0.0/8"])]);
    let plan = reconcile(&RouteTable::default(), &snap, &request(&["Bar", "Foo"], Operation::Sync)).unwrap();

    let tags: Vec<&str> = plan.tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, vec!["Bar", "Foo"]);
    assert_eq!(plan.to_add[0].name, "STUDR-Public-Bar-1-0-20240517");
    assert_eq!(plan.to_add.len(), 3);
}
