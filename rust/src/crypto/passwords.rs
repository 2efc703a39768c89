//! Password-style hashing built around bcrypt.
//! The adaptive core comes from the `bcrypt` crate; this module owns cost
//! validation, salt generation, the long-input policy and constant-time
//! verification so that every caller gets the same guarantees.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, warn};

use crate::crypto::encoded::{EncodedHash, Salt, Version, SALT_LEN};

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;
/// Matches the work factor most bcrypt libraries pick when none is given.
pub const DEFAULT_COST: u32 = 12;
/// bcrypt keys its cipher with at most 72 bytes of input.
pub const MAX_INPUT_LEN: usize = 72;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid cost {0}; expected a value in 4..=31")]
    InvalidCost(u32),
    #[error("malformed hash: {0}")]
    MalformedHash(String),
    #[error("input is {len} bytes; bcrypt accepts at most {max}")]
    InputTooLong { len: usize, max: usize },
    #[error("secure random source failed: {0}")]
    Entropy(String),
    #[error("bcrypt failed: {0}")]
    Backend(String),
}

/// What to do with input past bcrypt's 72-byte window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongInputPolicy {
    /// Hash only the leading 72 bytes and log a warning, as every other
    /// bcrypt verifier would.
    #[default]
    Truncate,
    /// Refuse the input with [`HashError::InputTooLong`].
    Reject,
}

/// Stateless bcrypt hasher. Holds only its parameters, so it is `Copy` and
/// can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
    version: Version,
    long_input: LongInputPolicy,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
            version: Version::default(),
            long_input: LongInputPolicy::default(),
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, HashError> {
        validate_cost(cost)?;
        Ok(Self {
            cost,
            ..Self::default()
        })
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_long_input(mut self, policy: LongInputPolicy) -> Self {
        self.long_input = policy;
        self
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn long_input(&self) -> LongInputPolicy {
        self.long_input
    }

    /// Hashes `input` under a freshly generated salt.
    pub fn hash(&self, input: &[u8]) -> Result<EncodedHash, HashError> {
        let salt = generate_salt()?;
        self.hash_with_salt(input, salt)
    }

    /// Deterministic form of [`hash`](Self::hash). Never reuse a salt outside tests.
    pub fn hash_with_salt(&self, input: &[u8], salt: Salt) -> Result<EncodedHash, HashError> {
        let input = self.bounded_input(input)?;
        debug!(cost = self.cost, version = %self.version, len = input.len(), "hashing input");
        derive(input, self.cost, salt, self.version)
    }

    /// Checks `input` against an encoded hash string. Cost, salt and version
    /// come from `encoded`; only the long-input policy comes from `self`.
    pub fn verify(&self, input: &[u8], encoded: &str) -> Result<bool, HashError> {
        let expected = EncodedHash::parse(encoded)?;
        self.verify_encoded(input, &expected)
    }

    pub fn verify_encoded(&self, input: &[u8], expected: &EncodedHash) -> Result<bool, HashError> {
        let input = self.bounded_input(input)?;
        debug!(cost = expected.cost(), version = %expected.version(), "verifying input");
        let actual = derive(input, expected.cost(), *expected.salt(), expected.version())?;
        Ok(actual.digest()[..].ct_eq(&expected.digest()[..]).into())
    }

    fn bounded_input<'a>(&self, input: &'a [u8]) -> Result<&'a [u8], HashError> {
        if input.len() <= MAX_INPUT_LEN {
            return Ok(input);
        }
        match self.long_input {
            LongInputPolicy::Reject => Err(HashError::InputTooLong {
                len: input.len(),
                max: MAX_INPUT_LEN,
            }),
            LongInputPolicy::Truncate => {
                warn!(
                    len = input.len(),
                    max = MAX_INPUT_LEN,
                    "input exceeds the bcrypt limit; only the leading bytes are hashed"
                );
                Ok(&input[..MAX_INPUT_LEN])
            }
        }
    }
}

/// Draws a new salt from the operating system's CSPRNG.
pub fn generate_salt() -> Result<Salt, HashError> {
    let mut bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| HashError::Entropy(format!("{e}")))?;
    Ok(Salt::from_bytes(bytes))
}

pub fn validate_cost(cost: u32) -> Result<(), HashError> {
    if (MIN_COST..=MAX_COST).contains(&cost) {
        Ok(())
    } else {
        Err(HashError::InvalidCost(cost))
    }
}

/// Hashes `input` at `cost` with default settings and returns the encoded hash.
pub fn hash_password(input: &[u8], cost: u32) -> Result<EncodedHash, HashError> {
    PasswordHasher::new(cost)?.hash(input)
}

/// Verifies `input` against `encoded` with default settings.
pub fn verify_password(input: &[u8], encoded: &str) -> Result<bool, HashError> {
    PasswordHasher::default().verify(input, encoded)
}

fn derive(input: &[u8], cost: u32, salt: Salt, version: Version) -> Result<EncodedHash, HashError> {
    let parts = bcrypt::hash_with_salt(input, cost, *salt.as_bytes())
        .map_err(|e| HashError::Backend(format!("{e}")))?;
    EncodedHash::parse(&parts.format_for_version(version.into()))
}
