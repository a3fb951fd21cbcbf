//! Tests for sweep planning and EC2 type handling
//!
//! The sweep's decision logic is pure; these tests exercise it against
//! hand-built SDK types without touching the network.

use aws_sdk_ec2::primitives::DateTime as AwsDateTime;
use aws_sdk_ec2::types::{Volume, VolumeAttachment};
use chrono::{Duration, Utc};
use lifecyclectl::aws::instances::build_tag_filters;
use lifecyclectl::aws::volumes::{created_within, select_root_volume, RootVolume};
use lifecyclectl::sweep::{plan_sweep, InstanceAudit};
use std::collections::BTreeMap;

fn audit_with_age(instance_id: &str, age: Duration, now: chrono::DateTime<Utc>) -> InstanceAudit {
    InstanceAudit {
        instance_id: instance_id.to_string(),
        root_volume: Some(RootVolume {
            volume_id: "vol-1234567890abcdef0".to_string(),
            device: Some("/dev/xvda".to_string()),
            create_time: now - age,
        }),
    }
}

#[test]
fn test_expired_instance_lands_in_stop_list() {
    let now = Utc::now();
    let audits = vec![
        audit_with_age("i-expired000000001", Duration::hours(30), now),
        audit_with_age("i-fresh00000000001", Duration::hours(2), now),
    ];

    let plan = plan_sweep(audits, Duration::hours(24), now);

    assert_eq!(plan.to_stop.len(), 1);
    assert_eq!(plan.to_stop[0].instance_id, "i-expired000000001");
    assert_eq!(plan.compliant.len(), 1);
    assert_eq!(plan.compliant[0].instance_id, "i-fresh00000000001");
}

#[test]
fn test_instance_without_volumes_lands_in_stop_list() {
    let now = Utc::now();
    let audits = vec![InstanceAudit {
        instance_id: "i-novolumes0000001".to_string(),
        root_volume: None,
    }];

    let plan = plan_sweep(audits, Duration::hours(24), now);

    assert!(plan.compliant.is_empty());
    assert_eq!(plan.to_stop.len(), 1);
}

#[test]
fn test_plan_preserves_input_order_within_partitions() {
    let now = Utc::now();
    let audits = vec![
        audit_with_age("i-stale00000000001", Duration::hours(48), now),
        audit_with_age("i-stale00000000002", Duration::hours(36), now),
        audit_with_age("i-stale00000000003", Duration::hours(25), now),
    ];

    let plan = plan_sweep(audits, Duration::hours(24), now);

    let ids: Vec<_> = plan.to_stop.iter().map(|a| a.instance_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "i-stale00000000001",
            "i-stale00000000002",
            "i-stale00000000003"
        ]
    );
}

#[test]
fn test_tag_filter_maps_each_entry_to_one_clause() {
    let mut tags = BTreeMap::new();
    tags.insert("env".to_string(), "dev".to_string());
    tags.insert("lifecycle".to_string(), "temporary".to_string());
    tags.insert("team".to_string(), "ml".to_string());

    let filters = build_tag_filters(&tags);

    assert_eq!(filters.len(), tags.len());
    for filter in &filters {
        let name = filter.name().unwrap();
        assert!(name.starts_with("tag:"));
        assert_eq!(filter.values().len(), 1);

        let key = name.strip_prefix("tag:").unwrap();
        assert_eq!(tags.get(key), Some(&filter.values()[0]));
    }
}

#[test]
fn test_root_volume_selection_against_sdk_types() {
    let data = Volume::builder()
        .volume_id("vol-data0000000000001")
        .create_time(AwsDateTime::from_secs(1_700_000_000))
        .attachments(
            VolumeAttachment::builder()
                .instance_id("i-1234567890abcdef0")
                .device("/dev/sdf")
                .build(),
        )
        .build();
    let root = Volume::builder()
        .volume_id("vol-root0000000000001")
        .create_time(AwsDateTime::from_secs(1_600_000_000))
        .attachments(
            VolumeAttachment::builder()
                .instance_id("i-1234567890abcdef0")
                .device("/dev/xvda")
                .build(),
        )
        .build();

    // DescribeVolumes order is not guaranteed; the data volume coming
    // first must not win when the root device is known
    let volumes = vec![data, root];
    let selected = select_root_volume(&volumes, Some("/dev/xvda")).unwrap();
    assert_eq!(selected.volume_id(), Some("vol-root0000000000001"));
}

#[test]
fn test_created_within_window_boundaries() {
    let now = Utc::now();
    let threshold = Duration::hours(24);

    assert!(created_within(now, now, threshold));
    assert!(created_within(now - Duration::hours(23), now, threshold));
    assert!(!created_within(now - Duration::hours(24), now, threshold));
    assert!(!created_within(now - Duration::days(30), now, threshold));
}
