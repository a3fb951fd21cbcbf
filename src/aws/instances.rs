//! Tag-filtered instance lookup and lifecycle calls

use crate::error::{LifecyclectlError, Result};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use aws_sdk_ec2::types::{AttributeBooleanValue, Filter, Instance};
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Summary of an instance returned by a tag-filtered lookup
#[derive(Debug, Clone)]
pub struct DiscoveredInstance {
    pub instance_id: String,
    pub state: String,
    pub launch_time: Option<DateTime<Utc>>,
    /// Device name of the root volume, e.g. "/dev/xvda"
    pub root_device_name: Option<String>,
    pub tags: Vec<(String, String)>,
}

/// Build EC2 filters from a tag map
///
/// Each map entry maps to exactly one `tag:<key>` filter clause carrying
/// exactly one value.
pub fn build_tag_filters(tags: &BTreeMap<String, String>) -> Vec<Filter> {
    tags.iter()
        .map(|(key, value)| {
            Filter::builder()
                .name(format!("tag:{}", key))
                .values(value)
                .build()
        })
        .collect()
}

/// Convert an EC2 instance to its lookup summary
///
/// Returns `None` for instances the API reports without an ID.
pub fn instance_summary(instance: &Instance) -> Option<DiscoveredInstance> {
    let instance_id = instance.instance_id()?.to_string();

    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let launch_time = instance
        .launch_time()
        .and_then(|t| DateTime::from_timestamp(t.secs(), 0));

    let tags: Vec<(String, String)> = instance
        .tags()
        .iter()
        .filter_map(|tag| {
            tag.key()
                .zip(tag.value())
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect();

    Some(DiscoveredInstance {
        instance_id,
        state,
        launch_time,
        root_device_name: instance.root_device_name().map(|s| s.to_string()),
        tags,
    })
}

/// Find instances matching every entry of the tag filter
pub async fn find_instances_by_tags(
    client: &Ec2Client,
    tags: &BTreeMap<String, String>,
) -> Result<Vec<DiscoveredInstance>> {
    let filters = build_tag_filters(tags);
    debug!("Looking up instances with {} tag filter(s)", filters.len());

    let response = ExponentialBackoffPolicy::for_cloud_api()
        .execute_with_retry(|| async {
            client
                .describe_instances()
                .set_filters(Some(filters.clone()))
                .send()
                .await
                .map_err(|e| LifecyclectlError::Aws(format!("Failed to describe instances: {}", e)))
        })
        .await?;

    let instances: Vec<DiscoveredInstance> = response
        .reservations()
        .iter()
        .flat_map(|r| r.instances())
        .filter_map(instance_summary)
        .collect();

    info!("Tag filter matched {} instance(s)", instances.len());
    Ok(instances)
}

/// Fetch a single instance by ID
pub async fn get_instance(client: &Ec2Client, instance_id: &str) -> Result<DiscoveredInstance> {
    let response = client
        .describe_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .map_err(|e| LifecyclectlError::Aws(format!("Failed to describe instance: {}", e)))?;

    response
        .reservations()
        .iter()
        .flat_map(|r| r.instances())
        .find(|i| i.instance_id().map(|id| id == instance_id).unwrap_or(false))
        .and_then(instance_summary)
        .ok_or_else(|| LifecyclectlError::ResourceNotFound {
            resource_type: "instance".to_string(),
            resource_id: instance_id.to_string(),
        })
}

/// Request a stop for one instance
pub async fn stop_instance(client: &Ec2Client, instance_id: &str) -> Result<()> {
    client
        .stop_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .map_err(|e| LifecyclectlError::Aws(format!("Failed to stop {}: {}", instance_id, e)))?;

    info!("Stop requested for instance {}", instance_id);
    Ok(())
}

/// Terminate one instance, disabling API termination protection first
pub async fn terminate_instance(client: &Ec2Client, instance_id: &str) -> Result<()> {
    client
        .modify_instance_attribute()
        .instance_id(instance_id)
        .disable_api_termination(AttributeBooleanValue::builder().value(false).build())
        .send()
        .await
        .map_err(|e| {
            LifecyclectlError::Aws(format!(
                "Failed to disable termination protection for {}: {}",
                instance_id, e
            ))
        })?;

    client
        .terminate_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .map_err(|e| {
            LifecyclectlError::Aws(format!("Failed to terminate {}: {}", instance_id, e))
        })?;

    info!("Termination requested for instance {}", instance_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::{InstanceState, InstanceStateName, Tag};

    #[test]
    fn test_build_tag_filters_one_clause_per_entry() {
        let mut tags = BTreeMap::new();
        tags.insert("env".to_string(), "dev".to_string());
        tags.insert("lifecycle".to_string(), "temporary".to_string());

        let filters = build_tag_filters(&tags);
        assert_eq!(filters.len(), 2);

        // BTreeMap iteration is ordered by key
        assert_eq!(filters[0].name(), Some("tag:env"));
        assert_eq!(filters[0].values(), &["dev".to_string()]);
        assert_eq!(filters[1].name(), Some("tag:lifecycle"));
        assert_eq!(filters[1].values(), &["temporary".to_string()]);
    }

    #[test]
    fn test_build_tag_filters_empty() {
        let filters = build_tag_filters(&BTreeMap::new());
        assert!(filters.is_empty());
    }

    #[test]
    fn test_instance_summary() {
        let instance = Instance::builder()
            .instance_id("i-1234567890abcdef0")
            .root_device_name("/dev/xvda")
            .state(
                InstanceState::builder()
                    .name(InstanceStateName::Running)
                    .build(),
            )
            .tags(Tag::builder().key("env").value("dev").build())
            .build();

        let summary = instance_summary(&instance).unwrap();
        assert_eq!(summary.instance_id, "i-1234567890abcdef0");
        assert_eq!(summary.state, "running");
        assert_eq!(summary.root_device_name.as_deref(), Some("/dev/xvda"));
        assert_eq!(summary.tags, vec![("env".to_string(), "dev".to_string())]);
    }

    #[test]
    fn test_instance_summary_requires_id() {
        let instance = Instance::builder().build();
        assert!(instance_summary(&instance).is_none());
    }
}
