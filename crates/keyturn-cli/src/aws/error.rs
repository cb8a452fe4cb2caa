//! IAM error classification
//!
//! Provides typed errors for IAM operations using the `.code()` method
//! instead of string matching on Debug format.

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// IAM error categories the inventory and rotation logic branch on
#[derive(Debug, Error)]
pub enum IamError {
    /// Entity does not exist (missing user, or a user without a login profile)
    #[error("Entity not found: {message}")]
    NotFound { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    Throttled,

    /// A per-principal quota was hit (e.g. already two access keys)
    #[error("Limit exceeded: {message}")]
    LimitExceeded { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl IamError {
    /// Build a not-found error for a named entity.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        IamError::NotFound {
            message: what.to_string(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, IamError::NotFound { .. })
    }

    /// Error code reported by AWS, if known
    pub fn code(&self) -> Option<&str> {
        match self {
            IamError::NotFound { .. } => Some("NoSuchEntity"),
            IamError::Throttled => Some("Throttling"),
            IamError::LimitExceeded { .. } => Some("LimitExceeded"),
            IamError::Sdk { code, .. } => code.as_deref(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        self.code().and_then(suggestion_for_code)
    }
}

/// Known IAM error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &["NoSuchEntity", "NoSuchEntityException"];

/// Known error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Known error codes for quota violations
const LIMIT_CODES: &[&str] = &["LimitExceeded", "LimitExceededException"];

/// Classify an IAM error using the error code.
pub fn classify_iam_error(code: Option<&str>, message: Option<&str>) -> IamError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => IamError::NotFound { message },
        Some(c) if THROTTLING_CODES.contains(&c) => IamError::Throttled,
        Some(c) if LIMIT_CODES.contains(&c) => IamError::LimitExceeded { message },
        _ => IamError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Convert an SDK operation error into an [`IamError`].
///
/// Service errors carry a code and message; transport failures (DNS,
/// credentials, timeouts) have neither, so the full error context is kept
/// as the message.
pub fn from_sdk<E>(err: SdkError<E>) -> IamError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let meta = ProvideErrorMetadata::meta(&err);
    let code = meta.code().map(str::to_string);
    let message = meta
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    classify_iam_error(code.as_deref(), Some(&message))
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AccessDenied",
        "The caller lacks IAM permissions. keyturn needs iam:ListUsers, iam:GetUser, \
         iam:ListAccessKeys, iam:GetAccessKeyLastUsed and iam:GetLoginProfile to list, \
         plus the matching Create/Update/Delete actions to rotate.",
    ),
    (
        "InvalidClientTokenId",
        "The AWS credentials are invalid. Check AWS_PROFILE or re-run `aws configure`.",
    ),
    (
        "ExpiredToken",
        "The AWS session has expired. Refresh your credentials (e.g. `aws sso login`).",
    ),
    (
        "LimitExceeded",
        "The principal already holds the maximum number of access keys. Delete one first.",
    ),
    (
        "PasswordPolicyViolation",
        "The generated password violates the account password policy. \
         Try a larger --password-length.",
    ),
    (
        "Throttling",
        "IAM API rate limit hit. Lower --concurrency or raise --max-attempts.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
}
