//! AWS EC2 operations module
//!
//! This module provides the EC2 surface of the sweeper.
//!
//! ## Module Organization
//!
//! - `client`: SDK config construction (credentials file, profile, region)
//!   and STS caller-identity verification
//! - `instances`: tag-filtered instance lookup, stop, terminate
//! - `volumes`: root volume lookup and creation-time inspection
//!
//! ## Design Philosophy
//!
//! This module uses direct AWS SDK calls rather than a provider trait
//! abstraction. The tool targets exactly one provider, and direct calls
//! keep AWS-specific behavior (tag filters, termination protection) easy
//! to follow and debug.

pub mod client;
pub mod instances;
pub mod volumes;

pub use client::{load_sdk_config, verify_caller_identity};
pub use instances::{
    build_tag_filters, find_instances_by_tags, get_instance, stop_instance, terminate_instance,
    DiscoveredInstance,
};
pub use volumes::{find_root_volume, RootVolume};
