//! SDK configuration and identity verification
//!
//! Credentials settings are applied before any AWS client is constructed:
//! the shared-credentials file path is exported to the process environment
//! and the named profile is passed to the config loader.

use crate::config::AwsSettings;
use crate::error::{LifecyclectlError, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::Client as StsClient;
use tracing::{debug, info};

/// Build the shared SDK config from tool settings
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    if let Some(path) = &settings.shared_credentials_file {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        debug!("Using shared credentials file {}", expanded);
        std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", expanded);
    }

    let region_provider = RegionProviderChain::first_try(Region::new(settings.region.clone()))
        .or_default_provider()
        .or_else(Region::new("us-east-1"));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    if let Some(profile) = &settings.profile {
        debug!("Using credential profile {}", profile);
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// Verify credentials by resolving the caller identity
///
/// Returns the AWS account ID. Failing here surfaces credential problems
/// before any EC2 call is attempted.
pub async fn verify_caller_identity(sdk_config: &SdkConfig) -> Result<String> {
    let client = StsClient::new(sdk_config);
    let identity = client.get_caller_identity().send().await.map_err(|e| {
        LifecyclectlError::CloudProvider {
            provider: "aws".to_string(),
            message: format!("Failed to verify caller identity: {}", e),
            source: None,
        }
    })?;

    let account = identity.account().unwrap_or("unknown").to_string();
    info!("Authenticated to AWS account {}", account);
    Ok(account)
}
