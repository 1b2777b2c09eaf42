//! Add and remove command implementations
//!
//! Both run the same pipeline: fetch the snapshot, read the table, plan,
//! then apply the plan (or stage it for a dry run).

use colored::Colorize;
use serde_json::json;

use udr_core::{
    ApplyExecutor, ApplyOptions, ApplyOutcome, Operation, ReconcileRequest, ReconciliationPlan,
    TableRef, TagAction, reconcile,
};

use crate::cli::ReconcileArgs;
use crate::context::Context;
use crate::error::Result;

/// Run the add (`Operation::Sync`) or remove command
pub fn run_reconcile(ctx: &Context, args: &ReconcileArgs, operation: Operation) -> Result<()> {
    let cloud = ctx.cloud(args.cloud.as_deref())?;
    let request = ReconcileRequest::new(args.tags.iter().cloned(), operation)
        .with_prefix(ctx.prefix(args.prefix.as_deref()))
        .with_capacity(ctx.capacity(args.capacity))
        .with_family(ctx.family(args.family.as_deref())?);
    let table = TableRef::new(&args.table.resource_group, &args.table.route_table);

    if !args.json {
        let verb = match operation {
            Operation::Sync => "Synchronizing",
            Operation::Remove => "Removing",
        };
        println!(
            "{} {} {} on {} ({})...",
            "=>".blue().bold(),
            verb,
            request.targets.join(", ").cyan(),
            table.to_string().cyan(),
            cloud
        );
    }

    let snapshot = ctx.snapshot_source()?.fetch(cloud)?;
    let backend = ctx.backend(cloud)?;
    let current = backend.fetch(&table)?;
    let current_len = current.len();

    let plan = reconcile(&current, &snapshot, &request)?;
    let outcome = ApplyExecutor::new(&*backend)
        .with_options(ApplyOptions {
            dry_run: args.dry_run,
        })
        .apply(&table, current, &plan)?;

    if args.json {
        let output = json!({
            "table": table,
            "operation": operation.to_string(),
            "cloud": snapshot.cloud,
            "snapshot_change_number": snapshot.change_number,
            "routes_before": current_len,
            "routes_after": plan.projected_len(current_len),
            "capacity": request.capacity,
            "plan": plan,
            "result": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_tags(&plan);
    print_outcome(&plan, &outcome, current_len, request.capacity);
    Ok(())
}

fn print_tags(plan: &ReconciliationPlan) {
    for tag in &plan.tags {
        let version = format!("v{}", tag.change_number).dimmed();
        match tag.action {
            TagAction::Unchanged => {
                println!("   {} {} ({}) up to date", "=".dimmed(), tag.tag.cyan(), version);
            }
            TagAction::Created => {
                println!(
                    "   {} {} ({}): {} routes",
                    "+".green(),
                    tag.tag.cyan(),
                    version,
                    tag.added
                );
            }
            TagAction::Replaced => {
                println!(
                    "   {} {} ({}): replacing {} routes with {}",
                    "~".yellow(),
                    tag.tag.cyan(),
                    version,
                    tag.removed,
                    tag.added
                );
            }
            TagAction::Removed => {
                println!(
                    "   {} {}: removing {} routes",
                    "-".red(),
                    tag.tag.cyan(),
                    tag.removed
                );
            }
            TagAction::Absent => {
                println!("   {} {}: no managed routes", "=".dimmed(), tag.tag.cyan());
            }
        }
    }
}

fn print_outcome(plan: &ReconciliationPlan, outcome: &ApplyOutcome, current_len: usize, capacity: usize) {
    match outcome {
        ApplyOutcome::NoChange => {
            println!("{} No change.", "OK".green().bold());
        }
        ApplyOutcome::DryRun { table } => {
            println!(
                "{} Would remove {} and add {} routes ({} -> {} of {}):",
                "DRY RUN".yellow().bold(),
                plan.to_remove.len(),
                plan.to_add.len(),
                current_len,
                table.len(),
                capacity
            );
            for name in &plan.to_remove {
                println!("   {} {}", "-".red(), name);
            }
            for route in &plan.to_add {
                println!(
                    "   {} {} {}",
                    "+".green(),
                    route.name,
                    route.address_prefix.dimmed()
                );
            }
        }
        ApplyOutcome::Applied { removed, added } => {
            println!(
                "{} Removed {} and added {} routes ({} of {} in use).",
                "OK".green().bold(),
                removed,
                added,
                plan.projected_len(current_len),
                capacity
            );
        }
    }
}
