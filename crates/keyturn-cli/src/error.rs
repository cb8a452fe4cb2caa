//! Configuration errors, raised before any AWS call

use keyturn_common::InvalidTimeZone;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidTimeZone(#[from] InvalidTimeZone),

    #[error("--age must be at least 1 day")]
    ZeroAge,

    #[error("--quantity must be at least 1 (omit it to list every principal)")]
    ZeroQuantity,

    #[error("--quantity must be at most {max}, got {quantity}")]
    QuantityTooLarge { quantity: u32, max: u32 },

    #[error("--concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("--password-length must be at least {min}, got {length}")]
    PasswordTooShort { length: usize, min: usize },
}
