//! AWS client modules
//!
//! This module provides wrappers around the AWS SDK for:
//! - context: shared SDK configuration and client construction
//! - iam: users, access keys and login profiles
//! - error: typed classification of IAM service errors

pub mod context;
pub mod error;
pub mod iam;
pub mod types;

pub use context::{AwsContext, FromAwsContext};
pub use error::{IamError, classify_iam_error};
pub use iam::{IamClient, IamOperations};
pub use types::{AccessKeyMetadata, KeyLastUsed, LoginProfile, NewAccessKey, PrincipalPage};
