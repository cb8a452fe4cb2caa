//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating service clients from the same config.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

use crate::config::AwsConfig;

/// Shared AWS configuration context for creating service clients.
///
/// Built once at process start and passed by reference to every component
/// that talks to AWS.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::load(&AwsConfig::default()).await;
/// let iam = IamClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: Option<String>,
}

impl AwsContext {
    /// Load AWS configuration.
    ///
    /// Credentials and region come from the default provider chain
    /// (environment, shared config files, SSO, instance metadata). An explicit
    /// region or profile overrides the chain. Retries use the SDK's standard
    /// mode with `max_attempts` total attempts per request.
    pub async fn load(aws: &AwsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(aws.max_attempts));

        if let Some(region) = &aws.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &aws.profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;
        let region = config.region().map(|r| r.to_string());

        Self {
            config: Arc::new(config),
            region,
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Resolved region, if any. IAM is global so this is informational.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Create an IAM client from this context.
    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Types that can be built from a loaded [`AwsContext`].
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}
