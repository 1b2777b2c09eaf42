//! Tags command implementation

use colored::Colorize;
use serde_json::json;

use udr_core::{ServiceTagSnapshot, TagEntry};

use crate::context::Context;
use crate::error::Result;

fn matching<'a>(snapshot: &'a ServiceTagSnapshot, filter: Option<&str>) -> Vec<&'a TagEntry> {
    let needle = filter.map(str::to_ascii_lowercase);
    snapshot
        .tags()
        .iter()
        .filter(|tag| match &needle {
            Some(needle) => tag.name.to_ascii_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

/// Run the tags command
pub fn run_tags(ctx: &Context, cloud: Option<&str>, filter: Option<&str>, json: bool) -> Result<()> {
    let cloud = ctx.cloud(cloud)?;
    let snapshot = ctx.snapshot_source()?.fetch(cloud)?;
    let tags = matching(&snapshot, filter);

    if json {
        let output = json!({
            "cloud": snapshot.cloud,
            "change_number": snapshot.change_number,
            "tags": tags
                .iter()
                .map(|tag| json!({
                    "name": tag.name,
                    "change_number": tag.change_number,
                    "prefixes": tag.address_prefixes().len(),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} (change {}), {} of {} tags",
        "Service Tags".bold(),
        snapshot.cloud.cyan(),
        snapshot.change_number,
        tags.len(),
        snapshot.len()
    );
    println!();
    let width = tags.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tag in &tags {
        println!(
            "  {:<width$}  {}  {} prefixes",
            tag.name,
            format!("v{}", tag.change_number).dimmed(),
            tag.address_prefixes().len(),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ServiceTagSnapshot {
        ServiceTagSnapshot::new(
            "Public",
            1,
            vec![
                TagEntry::new("Storage", 1, vec!["1.0.0.0/8".to_string()]),
                TagEntry::new("Storage.WestEurope", 1, vec![]),
                TagEntry::new("AzureMonitor", 2, vec![]),
            ],
        )
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let snapshot = snapshot();
        let names: Vec<&str> = matching(&snapshot, Some("storage"))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Storage", "Storage.WestEurope"]);
    }

    #[test]
    fn test_no_filter_lists_everything() {
        assert_eq!(matching(&snapshot(), None).len(), 3);
    }
}
