//! Root volume lookup and age inspection
//!
//! EC2 returns attached volumes in no documented order, so "first volume"
//! is not a reliable stand-in for "root volume". The lookup cross-checks
//! the instance's root device name against attachment device names and only
//! falls back to the first returned volume when nothing matches (which
//! preserves behavior for single-volume instances).

use crate::error::{LifecyclectlError, Result};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use aws_sdk_ec2::types::{Filter, Volume};
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Root volume of an instance
#[derive(Debug, Clone)]
pub struct RootVolume {
    pub volume_id: String,
    pub device: Option<String>,
    pub create_time: DateTime<Utc>,
}

/// Pick the root volume out of an instance's attached volumes
///
/// Prefers the volume whose attachment device matches the instance's root
/// device name, then falls back to the first returned volume.
pub fn select_root_volume<'a>(
    volumes: &'a [Volume],
    root_device_name: Option<&str>,
) -> Option<&'a Volume> {
    if let Some(root_device) = root_device_name {
        if let Some(volume) = volumes.iter().find(|v| {
            v.attachments()
                .iter()
                .any(|a| a.device().map(|d| d == root_device).unwrap_or(false))
        }) {
            return Some(volume);
        }
        warn!(
            "No attached volume matches root device {}, falling back to first volume",
            root_device
        );
    }
    volumes.first()
}

/// Whether a creation time falls inside the age threshold
///
/// The boundary is exclusive: a volume exactly `threshold` old is outside
/// the window and its instance is stopped.
pub fn created_within(create_time: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    now.signed_duration_since(create_time) < threshold
}

/// Find the root volume of an instance
///
/// Returns `Ok(None)` when the instance has no attached volumes; the
/// caller treats that as non-compliant rather than as an error.
pub async fn find_root_volume(
    client: &Ec2Client,
    instance_id: &str,
    root_device_name: Option<&str>,
) -> Result<Option<RootVolume>> {
    let response = ExponentialBackoffPolicy::for_cloud_api()
        .execute_with_retry(|| async {
            client
                .describe_volumes()
                .filters(
                    Filter::builder()
                        .name("attachment.instance-id")
                        .values(instance_id)
                        .build(),
                )
                .send()
                .await
                .map_err(|e| {
                    LifecyclectlError::Aws(format!(
                        "Failed to describe volumes for {}: {}",
                        instance_id, e
                    ))
                })
        })
        .await?;

    let volumes = response.volumes();
    debug!("Instance {} has {} attached volume(s)", instance_id, volumes.len());

    let Some(volume) = select_root_volume(volumes, root_device_name) else {
        return Ok(None);
    };

    let volume_id = volume
        .volume_id()
        .ok_or_else(|| LifecyclectlError::Aws("Volume returned without an ID".to_string()))?
        .to_string();

    let create_time = volume
        .create_time()
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
        .ok_or_else(|| {
            LifecyclectlError::Aws(format!("Volume {} has no creation timestamp", volume_id))
        })?;

    let device = volume
        .attachments()
        .iter()
        .find(|a| a.instance_id().map(|id| id == instance_id).unwrap_or(false))
        .and_then(|a| a.device())
        .map(|d| d.to_string());

    Ok(Some(RootVolume {
        volume_id,
        device,
        create_time,
    }))
}
