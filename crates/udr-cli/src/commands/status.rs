//! Status command implementation

use colored::Colorize;
use serde::Serialize;

use udr_core::{RouteTable, TableRef};

use crate::cli::TableArgs;
use crate::context::Context;
use crate::error::Result;

/// One `(cloud, tag)` group of managed routes
#[derive(Debug, Serialize)]
struct TagStatus {
    cloud: String,
    tag: String,
    /// Distinct change numbers found, ascending
    change_numbers: Vec<u64>,
    routes: Vec<RouteStatus>,
}

#[derive(Debug, Serialize)]
struct RouteStatus {
    name: String,
    address_prefix: String,
    change_number: u64,
    index: usize,
    date: String,
}

fn collect(table: &RouteTable, prefix: &str) -> Vec<TagStatus> {
    table
        .managed_groups(prefix)
        .into_iter()
        .map(|((cloud, tag), routes)| {
            let mut change_numbers: Vec<u64> =
                routes.iter().map(|(name, _)| name.tag_change_number).collect();
            change_numbers.dedup();
            TagStatus {
                cloud,
                tag,
                change_numbers,
                routes: routes
                    .into_iter()
                    .map(|(name, route)| RouteStatus {
                        name: route.name.clone(),
                        address_prefix: route.address_prefix.clone(),
                        change_number: name.tag_change_number,
                        index: name.index,
                        date: name.date.to_string(),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Run the status command
pub fn run_status(
    ctx: &Context,
    table_args: &TableArgs,
    cloud: Option<&str>,
    prefix: Option<&str>,
    json: bool,
) -> Result<()> {
    let cloud = ctx.cloud(cloud)?;
    let prefix = ctx.prefix(prefix);
    let table_ref = TableRef::new(&table_args.resource_group, &table_args.route_table);

    let backend = ctx.backend(cloud)?;
    let table = backend.fetch(&table_ref)?;
    let groups = collect(&table, &prefix);
    let managed: usize = groups.iter().map(|g| g.routes.len()).sum();

    if json {
        let output = serde_json::json!({
            "table": table_ref,
            "prefix": prefix,
            "routes": table.len(),
            "managed_routes": managed,
            "capacity": ctx.capacity(None),
            "tags": groups,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Route Table Status".bold());
    println!();
    println!("{}:    {}", "Table".dimmed(), table_ref.to_string().cyan());
    println!("{}:   {}", "Prefix".dimmed(), prefix);
    println!(
        "{}:   {} ({} managed, capacity {})",
        "Routes".dimmed(),
        table.len(),
        managed,
        ctx.capacity(None)
    );
    println!();

    println!("{}:", "Service Tags".bold());
    if groups.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "udr add".cyan());
        return Ok(());
    }
    for group in &groups {
        let versions: Vec<String> = group
            .change_numbers
            .iter()
            .map(|n| format!("v{n}"))
            .collect();
        let marker = if group.change_numbers.len() > 1 {
            "!".yellow()
        } else {
            "+".green()
        };
        println!(
            "  {} {}/{} {} ({} routes)",
            marker,
            group.cloud.dimmed(),
            group.tag.cyan(),
            versions.join(", "),
            group.routes.len()
        );
        for route in &group.routes {
            println!(
                "      {} {}",
                route.name,
                route.address_prefix.dimmed()
            );
        }
    }

    Ok(())
}
