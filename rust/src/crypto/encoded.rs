//! The bcrypt modular-crypt layout: `$<version>$<cost>$<salt><digest>`.
//! Parsing is strict so that anything accepted here can be handed to the
//! hashing backend without further checks.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Deserialize;

use crate::crypto::passwords::{HashError, MAX_COST, MIN_COST};

pub const SALT_LEN: usize = 16;
pub const DIGEST_LEN: usize = 23;
pub const ENCODED_SALT_LEN: usize = 22;
pub const ENCODED_DIGEST_LEN: usize = 31;
/// Total length of an encoded hash, e.g. `$2b$10$` followed by 53 characters.
pub const ENCODED_LEN: usize = 7 + ENCODED_SALT_LEN + ENCODED_DIGEST_LEN;

// bcrypt's radix-64 uses `./A-Za-z0-9` with no padding. Some older
// implementations leave junk in the unused low bits of the last character.
const RADIX64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Version tag that prefixes every encoded hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Version {
    #[serde(rename = "2a")]
    TwoA,
    #[default]
    #[serde(rename = "2b")]
    TwoB,
    #[serde(rename = "2x")]
    TwoX,
    #[serde(rename = "2y")]
    TwoY,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::TwoA => "2a",
            Version::TwoB => "2b",
            Version::TwoX => "2x",
            Version::TwoY => "2y",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2a" => Ok(Version::TwoA),
            "2b" => Ok(Version::TwoB),
            "2x" => Ok(Version::TwoX),
            "2y" => Ok(Version::TwoY),
            other => Err(HashError::MalformedHash(format!(
                "unknown version tag {other:?}"
            ))),
        }
    }
}

impl From<Version> for bcrypt::Version {
    fn from(value: Version) -> Self {
        match value {
            Version::TwoA => bcrypt::Version::TwoA,
            Version::TwoB => bcrypt::Version::TwoB,
            Version::TwoX => bcrypt::Version::TwoX,
            Version::TwoY => bcrypt::Version::TwoY,
        }
    }
}

/// 16 bytes of salt mixed into a single hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// Decodes the 22-character radix-64 form.
    pub fn decode(encoded: &str) -> Result<Self, HashError> {
        if encoded.len() != ENCODED_SALT_LEN {
            return Err(HashError::MalformedHash(format!(
                "salt must be {ENCODED_SALT_LEN} characters, got {}",
                encoded.len()
            )));
        }
        let bytes = decode_radix64::<SALT_LEN>(encoded, "salt")?;
        Ok(Self(bytes))
    }

    pub fn encode(&self) -> String {
        RADIX64.encode(self.0)
    }
}

/// A parsed, self-contained bcrypt hash. Everything needed to verify an input
/// is carried here; `Display` yields the canonical 60-character string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHash {
    version: Version,
    cost: u32,
    salt: Salt,
    digest: [u8; DIGEST_LEN],
}

impl EncodedHash {
    pub fn parse(encoded: &str) -> Result<Self, HashError> {
        if !encoded.is_ascii() || encoded.len() != ENCODED_LEN {
            return Err(HashError::MalformedHash(format!(
                "expected {ENCODED_LEN} ASCII characters, got {}",
                encoded.chars().count()
            )));
        }

        let mut fields = encoded.split('$');
        let (Some(""), Some(tag), Some(cost), Some(tail), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(HashError::MalformedHash(
                "expected layout $<version>$<cost>$<salt+digest>".to_string(),
            ));
        };

        let version: Version = tag.parse()?;
        let cost = parse_cost(cost)?;
        if tail.len() != ENCODED_SALT_LEN + ENCODED_DIGEST_LEN {
            return Err(HashError::MalformedHash(format!(
                "salt and digest must be {} characters, got {}",
                ENCODED_SALT_LEN + ENCODED_DIGEST_LEN,
                tail.len()
            )));
        }
        let (salt, digest) = tail.split_at(ENCODED_SALT_LEN);

        Ok(Self {
            version,
            cost,
            salt: Salt::decode(salt)?,
            digest: decode_radix64::<DIGEST_LEN>(digest, "digest")?,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}{}",
            self.version,
            self.cost,
            self.salt.encode(),
            RADIX64.encode(self.digest)
        )
    }
}

impl FromStr for EncodedHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_cost(field: &str) -> Result<u32, HashError> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HashError::MalformedHash(format!(
            "cost must be two decimal digits, got {field:?}"
        )));
    }
    let cost: u32 = field
        .parse()
        .map_err(|e| HashError::MalformedHash(format!("cost unreadable: {e}")))?;
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(HashError::MalformedHash(format!(
            "cost {cost} outside {MIN_COST}..={MAX_COST}"
        )));
    }
    Ok(cost)
}

fn decode_radix64<const N: usize>(encoded: &str, what: &str) -> Result<[u8; N], HashError> {
    let decoded = RADIX64
        .decode(encoded)
        .map_err(|e| HashError::MalformedHash(format!("{what} is not radix-64: {e}")))?;
    let len = decoded.len();
    decoded
        .try_into()
        .map_err(|_| HashError::MalformedHash(format!("{what} decodes to {len} bytes, expected {N}")))
}
