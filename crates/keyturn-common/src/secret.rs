//! Console password generation
//!
//! Passwords are drawn from ASCII letters and digits using the thread-local
//! CSPRNG (`rand::rng()`, ChaCha seeded from the operating system). At least
//! one digit is always present, and its position is randomized by shuffling
//! the whole buffer after construction.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use thiserror::Error;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    /// A zero-length secret cannot contain the required digit
    #[error("secret length must be at least 1")]
    ZeroLength,
}

/// Generate an alphanumeric secret of exactly `length` characters containing at least one digit.
pub fn generate_secret(length: usize) -> Result<String, SecretError> {
    generate_secret_with(&mut rand::rng(), length)
}

/// Generate a secret from the supplied RNG.
pub fn generate_secret_with<R: Rng>(rng: &mut R, length: usize) -> Result<String, SecretError> {
    if length == 0 {
        return Err(SecretError::ZeroLength);
    }

    let mut buf: Vec<u8> = Vec::with_capacity(length);
    // Non-empty constant slices, choose() cannot return None
    buf.push(DIGITS[rng.random_range(0..DIGITS.len())]);
    buf.extend((1..length).filter_map(|_| ALPHANUMERIC.choose(&mut *rng).copied()));
    buf.shuffle(&mut *rng);

    Ok(buf.into_iter().map(char::from).collect())
}

/// True if `secret` satisfies the shape contract of [`generate_secret`].
pub fn is_valid_secret(secret: &str, length: usize) -> bool {
    secret.len() == length
        && secret.bytes().all(|b| LETTERS.contains(&b) || DIGITS.contains(&b))
        && secret.bytes().any(|b| DIGITS.contains(&b))
}
