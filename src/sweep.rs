//! The lifecycle sweep
//!
//! A sweep is a single pass: look up instances by tag, inspect each
//! instance's root volume age serially, partition into compliant and
//! expired, then stop the expired ones. No state is persisted between
//! runs.

use crate::aws::instances::{find_instances_by_tags, stop_instance};
use crate::aws::volumes::{created_within, find_root_volume, RootVolume};
use crate::error::Result;
use crate::utils::format_age;
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{DateTime, Duration, Utc};
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::{info, warn};

/// Options for a single sweep pass
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Tag filter selecting candidate instances
    pub tags: BTreeMap<String, String>,
    /// Instances whose root volume is at least this old are stopped
    pub threshold_hours: i64,
    /// Report without stopping
    pub dry_run: bool,
    /// Skip the interactive confirmation (always set for the Lambda surface)
    pub assume_yes: bool,
}

/// One instance with its root volume, as inspected during a sweep
#[derive(Debug, Clone)]
pub struct InstanceAudit {
    pub instance_id: String,
    /// `None` when the instance has no attached volumes
    pub root_volume: Option<RootVolume>,
}

/// Partition of audited instances into keep and stop sets
#[derive(Debug)]
pub struct SweepPlan {
    pub to_stop: Vec<InstanceAudit>,
    pub compliant: Vec<InstanceAudit>,
}

/// Outcome of a sweep pass
#[derive(Debug, Serialize)]
pub struct SweepReport {
    pub matched: usize,
    pub compliant: Vec<String>,
    pub to_stop: Vec<String>,
    pub stopped: Vec<String>,
    pub failed: Vec<String>,
    pub dry_run: bool,
}

/// Partition audited instances against the age threshold
///
/// An instance is compliant iff its root volume was created strictly less
/// than `threshold` ago. Instances with no attached volumes are not
/// compliant and land in the stop set.
pub fn plan_sweep(
    audits: Vec<InstanceAudit>,
    threshold: Duration,
    now: DateTime<Utc>,
) -> SweepPlan {
    let (compliant, to_stop): (Vec<_>, Vec<_>) =
        audits.into_iter().partition(|audit| match &audit.root_volume {
            Some(volume) => created_within(volume.create_time, now, threshold),
            None => false,
        });

    SweepPlan { to_stop, compliant }
}

/// Run one sweep pass
pub async fn run_sweep(
    client: &Ec2Client,
    options: &SweepOptions,
    output_format: &str,
) -> Result<SweepReport> {
    let threshold = Duration::hours(options.threshold_hours);
    let now = Utc::now();

    let instances = find_instances_by_tags(client, &options.tags).await?;

    if instances.is_empty() {
        if output_format != "json" {
            println!("No instances matched the tag filter");
        }
        return finish_report(
            SweepReport {
                matched: 0,
                compliant: vec![],
                to_stop: vec![],
                stopped: vec![],
                failed: vec![],
                dry_run: options.dry_run,
            },
            output_format,
        );
    }

    // Serial inspection, one DescribeVolumes call per instance
    let mut audits = Vec::with_capacity(instances.len());
    for instance in &instances {
        let root_volume = find_root_volume(
            client,
            &instance.instance_id,
            instance.root_device_name.as_deref(),
        )
        .await?;
        audits.push(InstanceAudit {
            instance_id: instance.instance_id.clone(),
            root_volume,
        });
    }

    let plan = plan_sweep(audits, threshold, now);

    if output_format != "json" {
        print_plan(&plan, options.threshold_hours, now);
    }

    let mut report = SweepReport {
        matched: instances.len(),
        compliant: plan
            .compliant
            .iter()
            .map(|a| a.instance_id.clone())
            .collect(),
        to_stop: plan.to_stop.iter().map(|a| a.instance_id.clone()).collect(),
        stopped: vec![],
        failed: vec![],
        dry_run: options.dry_run,
    };

    if plan.to_stop.is_empty() {
        if output_format != "json" {
            println!("\nAll matched instances are within the age threshold");
        }
        return finish_report(report, output_format);
    }

    if options.dry_run {
        if output_format != "json" {
            println!(
                "\n[DRY RUN] Would stop {} instance(s)",
                plan.to_stop.len()
            );
        }
        return finish_report(report, output_format);
    }

    if !options.assume_yes {
        print!("\nStop {} instance(s)? (y/N): ", plan.to_stop.len());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Cancelled");
            return finish_report(report, output_format);
        }
    }

    // Stop one at a time so a single API failure doesn't abort the pass
    for audit in &plan.to_stop {
        match stop_instance(client, &audit.instance_id).await {
            Ok(()) => {
                if output_format != "json" {
                    println!("  Stop requested: {}", audit.instance_id);
                }
                report.stopped.push(audit.instance_id.clone());
            }
            Err(e) => {
                warn!("Failed to stop {}: {}", audit.instance_id, e);
                if output_format != "json" {
                    eprintln!("  ERROR: Failed to stop {}: {}", audit.instance_id, e);
                }
                report.failed.push(audit.instance_id.clone());
            }
        }
    }

    info!(
        "Sweep complete: {} stopped, {} failed, {} compliant",
        report.stopped.len(),
        report.failed.len(),
        report.compliant.len()
    );

    if output_format != "json" {
        println!();
        println!(
            "Stopped {} of {} expired instance(s)",
            report.stopped.len(),
            report.to_stop.len()
        );
        if !report.failed.is_empty() {
            println!(
                "{} {} instance(s) failed to stop",
                style("!").red().bold(),
                report.failed.len()
            );
        }
    }

    finish_report(report, output_format)
}

fn print_plan(plan: &SweepPlan, threshold_hours: i64, now: DateTime<Utc>) {
    println!("{}", "=".repeat(80));
    println!(
        "Root volume age sweep (threshold: {}h)",
        threshold_hours
    );
    println!("{}", "=".repeat(80));

    for audit in &plan.compliant {
        // Compliant set never contains volume-less instances
        if let Some(volume) = &audit.root_volume {
            println!(
                "  {}  {}  root volume {} created {} ago",
                audit.instance_id,
                style("keep").green(),
                volume.volume_id,
                format_age(volume.create_time, now)
            );
        }
    }

    for audit in &plan.to_stop {
        match &audit.root_volume {
            Some(volume) => println!(
                "  {}  {}  root volume {} created {} ago",
                audit.instance_id,
                style("stop").red(),
                volume.volume_id,
                format_age(volume.create_time, now)
            ),
            None => println!(
                "  {}  {}  no attached volumes",
                audit.instance_id,
                style("stop").red()
            ),
        }
    }
}

fn finish_report(report: SweepReport, output_format: &str) -> Result<SweepReport> {
    if output_format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(report)
}
