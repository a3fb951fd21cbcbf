//! Lambda entry point for scheduled sweeps
//!
//! The handler runs the same sweep as the CLI, triggered by a CloudWatch
//! scheduled event. The event payload and context are not consulted; the
//! schedule decides when, the environment decides what.
//!
//! Configuration comes from environment variables:
//! - `LIFECYCLE_TAG_FILTER`: comma-separated "key=value" pairs
//! - `LIFECYCLE_MAX_AGE_HOURS`: root volume age threshold in hours
//! - `LIFECYCLE_DRY_RUN`: "true" to report without stopping
//!
//! Unset variables fall back to the tool defaults (env=dev,
//! lifecycle=temporary, 24 hours).

use crate::aws::client::verify_caller_identity;
use crate::config::Config;
use crate::sweep::{run_sweep, SweepOptions, SweepReport};
use crate::utils::parse_tag_spec;
use crate::validation::validate_threshold_hours;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_lambda_events::event::cloudwatch_events::CloudWatchEvent;
use aws_sdk_ec2::Client as Ec2Client;
use lambda_runtime::{Error, LambdaEvent};
use std::collections::BTreeMap;
use std::env;
use tracing::info;

const TAG_FILTER: &str = "LIFECYCLE_TAG_FILTER";
const MAX_AGE_HOURS: &str = "LIFECYCLE_MAX_AGE_HOURS";
const DRY_RUN: &str = "LIFECYCLE_DRY_RUN";

/// Build sweep options from the Lambda environment
fn options_from_env() -> Result<SweepOptions, Error> {
    let defaults = Config::default();

    let tags: BTreeMap<String, String> = match env::var(TAG_FILTER) {
        Ok(spec) => {
            let mut tags = BTreeMap::new();
            for part in spec.split(',') {
                let (key, value) = parse_tag_spec(part.trim())?;
                tags.insert(key, value);
            }
            tags
        }
        Err(_) => defaults.sweep.tags,
    };

    let threshold_hours = match env::var(MAX_AGE_HOURS) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|e| Error::from(format!("Invalid {}: {}", MAX_AGE_HOURS, e)))?,
        Err(_) => defaults.sweep.max_root_volume_age_hours,
    };
    validate_threshold_hours(threshold_hours)?;

    let dry_run = env::var(DRY_RUN)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(defaults.sweep.dry_run);

    Ok(SweepOptions {
        tags,
        threshold_hours,
        dry_run,
        // Lambda runs are non-interactive
        assume_yes: true,
    })
}

/// Handler for the scheduled sweep
pub async fn function_handler(_event: LambdaEvent<CloudWatchEvent>) -> Result<SweepReport, Error> {
    let options = options_from_env()?;
    info!(
        "Starting scheduled sweep: {} tag filter(s), threshold {}h, dry_run={}",
        options.tags.len(),
        options.threshold_hours,
        options.dry_run
    );

    // Lambda execution roles provide credentials; no profile or shared
    // credentials file is involved here.
    let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;

    verify_caller_identity(&sdk_config).await?;

    let client = Ec2Client::new(&sdk_config);
    let report = run_sweep(&client, &options, "text").await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: env vars are process-global and the test harness runs
    // tests on parallel threads.
    #[test]
    fn test_options_from_env() {
        env::remove_var(TAG_FILTER);
        env::remove_var(MAX_AGE_HOURS);
        env::remove_var(DRY_RUN);

        let options = options_from_env().unwrap();
        assert_eq!(options.threshold_hours, 24);
        assert_eq!(options.tags.get("env").map(String::as_str), Some("dev"));
        assert!(options.assume_yes);
        assert!(!options.dry_run);

        env::set_var(TAG_FILTER, "team=ml, stage=scratch");
        env::set_var(MAX_AGE_HOURS, "48");
        env::set_var(DRY_RUN, "true");

        let options = options_from_env().unwrap();
        assert_eq!(options.threshold_hours, 48);
        assert_eq!(options.tags.get("team").map(String::as_str), Some("ml"));
        assert_eq!(options.tags.get("stage").map(String::as_str), Some("scratch"));
        assert!(options.dry_run);

        env::set_var(MAX_AGE_HOURS, "0");
        assert!(options_from_env().is_err());

        env::remove_var(TAG_FILTER);
        env::remove_var(MAX_AGE_HOURS);
        env::remove_var(DRY_RUN);
    }
}
