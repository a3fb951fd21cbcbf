//! Property-based tests for lifecyclectl
//!
//! These tests use proptest to generate random inputs and verify that
//! properties hold across a wide range of scenarios.

use chrono::{Duration, TimeZone, Utc};
use lifecyclectl::aws::instances::build_tag_filters;
use lifecyclectl::aws::volumes::created_within;
use lifecyclectl::sweep::{plan_sweep, InstanceAudit};
use lifecyclectl::utils::format_duration;
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn test_format_duration_never_empty(seconds in 0u64..1_000_000u64) {
        let result = format_duration(seconds);
        assert!(!result.is_empty());
        assert!(result.contains('s') || result.contains('m') || result.contains('h'));
    }

    #[test]
    fn test_tag_filters_one_clause_per_entry(
        entries in proptest::collection::btree_map("[a-z]{1,16}", "[a-z0-9]{1,16}", 0..8)
    ) {
        let tags: BTreeMap<String, String> = entries;
        let filters = build_tag_filters(&tags);

        // Exactly one clause per map entry
        prop_assert_eq!(filters.len(), tags.len());

        for filter in &filters {
            let name = filter.name().unwrap();
            prop_assert!(name.starts_with("tag:"));
            // Exactly one value per clause
            prop_assert_eq!(filter.values().len(), 1);
            let key = name.strip_prefix("tag:").unwrap();
            prop_assert_eq!(tags.get(key), Some(&filter.values()[0]));
        }
    }

    #[test]
    fn test_created_within_consistent_with_age(age_hours in 0i64..1000i64, threshold_hours in 1i64..1000i64) {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let create_time = now - Duration::hours(age_hours);

        let within = created_within(create_time, now, Duration::hours(threshold_hours));
        prop_assert_eq!(within, age_hours < threshold_hours);
    }

    #[test]
    fn test_plan_sweep_partition_is_total(ages in proptest::collection::vec(proptest::option::of(0i64..200i64), 0..32)) {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let audits: Vec<InstanceAudit> = ages
            .iter()
            .enumerate()
            .map(|(i, age)| InstanceAudit {
                instance_id: format!("i-{:017x}", i),
                root_volume: age.map(|hours| lifecyclectl::aws::volumes::RootVolume {
                    volume_id: format!("vol-{:016x}", i),
                    device: None,
                    create_time: now - Duration::hours(hours),
                }),
            })
            .collect();

        let total = audits.len();
        let plan = plan_sweep(audits, Duration::hours(24), now);

        // Every instance lands in exactly one partition
        prop_assert_eq!(plan.to_stop.len() + plan.compliant.len(), total);

        // Compliant instances always have a root volume inside the window
        for audit in &plan.compliant {
            let volume = audit.root_volume.as_ref().unwrap();
            prop_assert!(created_within(volume.create_time, now, Duration::hours(24)));
        }

        // Stopped instances are either volume-less or outside the window
        for audit in &plan.to_stop {
            match &audit.root_volume {
                None => {}
                Some(volume) => {
                    prop_assert!(!created_within(volume.create_time, now, Duration::hours(24)));
                }
            }
        }
    }
}
