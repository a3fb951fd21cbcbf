//! Instance listing with root volume ages

use crate::aws::instances::find_instances_by_tags;
use crate::aws::volumes::find_root_volume;
use crate::error::Result;
use crate::utils::{format_age, is_older_than};
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};
use console::{style, Style};
use serde::Serialize;
use std::collections::BTreeMap;

/// Options for the list view
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub tags: BTreeMap<String, String>,
    /// "compact" or "table"
    pub format: String,
    pub threshold_hours: i64,
}

#[derive(Debug, Serialize)]
struct ListEntry {
    instance_id: String,
    state: String,
    launch_time: Option<DateTime<Utc>>,
    root_volume_id: Option<String>,
    root_volume_created: Option<DateTime<Utc>>,
    over_threshold: bool,
    tags: Vec<(String, String)>,
}

/// List instances matching the tag filter, with root volume ages
pub async fn list_instances(
    client: &Ec2Client,
    options: &ListOptions,
    output_format: &str,
) -> Result<()> {
    let now = Utc::now();
    let instances = find_instances_by_tags(client, &options.tags).await?;

    let mut entries = Vec::with_capacity(instances.len());
    for instance in &instances {
        let root_volume = find_root_volume(
            client,
            &instance.instance_id,
            instance.root_device_name.as_deref(),
        )
        .await?;

        let created = root_volume.as_ref().map(|v| v.create_time);
        entries.push(ListEntry {
            instance_id: instance.instance_id.clone(),
            state: instance.state.clone(),
            launch_time: instance.launch_time,
            root_volume_id: root_volume.map(|v| v.volume_id),
            root_volume_created: created,
            // No volume counts as over threshold, same as the sweep
            over_threshold: created.is_none()
                || is_older_than(created, now, options.threshold_hours),
            tags: instance.tags.clone(),
        });
    }

    if output_format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No instances matched the tag filter");
        return Ok(());
    }

    if options.format == "table" {
        display_table_format(&entries, options.threshold_hours, now);
    } else {
        display_compact_format(&entries, options.threshold_hours, now);
    }

    Ok(())
}

fn display_compact_format(entries: &[ListEntry], threshold_hours: i64, now: DateTime<Utc>) {
    println!("TAGGED INSTANCES:");
    println!("{}", "-".repeat(80));

    let mut over_count = 0;
    for entry in entries {
        let state_style = match entry.state.as_str() {
            "running" => Style::new().green(),
            "stopped" => Style::new().yellow(),
            "terminated" => Style::new().red(),
            _ => Style::new(),
        };

        let volume_str = match (&entry.root_volume_id, entry.root_volume_created) {
            (Some(id), Some(created)) => {
                format!("{} ({} old)", id, format_age(created, now))
            }
            _ => "no attached volumes".to_string(),
        };

        let over_marker = if entry.over_threshold {
            over_count += 1;
            format!(" >{}h", threshold_hours)
        } else {
            String::new()
        };

        println!(
            "  {}  {}  {}  {}",
            entry.instance_id,
            state_style.apply_to(&entry.state),
            volume_str,
            style(over_marker).red().bold()
        );

        if !entry.tags.is_empty() {
            let tag_str: String = entry
                .tags
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            println!("      {}", style(tag_str).cyan());
        }
    }

    println!("{}", "-".repeat(80));
    println!("Total: {} instance(s)", entries.len());
    if over_count > 0 {
        println!(
            "  {} {} instance(s) past the root volume age threshold",
            style("!").red().bold(),
            over_count
        );
    }
}

fn display_table_format(entries: &[ListEntry], threshold_hours: i64, now: DateTime<Utc>) {
    let mut table = Table::new();
    table.set_header(vec![
        "Instance ID",
        "State",
        "Root Volume",
        "Volume Age",
        "Expired",
    ]);

    for entry in entries {
        let state_cell = match entry.state.as_str() {
            "running" => Cell::new(&entry.state).fg(comfy_table::Color::Green),
            "stopped" => Cell::new(&entry.state).fg(comfy_table::Color::Yellow),
            "terminated" => Cell::new(&entry.state).fg(comfy_table::Color::Red),
            _ => Cell::new(&entry.state),
        };

        let volume = entry.root_volume_id.as_deref().unwrap_or("-");
        let age = entry
            .root_volume_created
            .map(|c| format_age(c, now))
            .unwrap_or_else(|| "-".to_string());
        let expired_cell = if entry.over_threshold {
            Cell::new(format!(">{}h", threshold_hours)).fg(comfy_table::Color::Red)
        } else {
            Cell::new("")
        };

        table.add_row(vec![
            Cell::new(&entry.instance_id),
            state_cell,
            Cell::new(volume),
            Cell::new(age),
            expired_cell,
        ]);
    }

    println!("{}", table);
}
