//! Hash algorithm value object
//!
//! The digests used for content-addressed output names (hex) and for
//! Subresource Integrity attributes (base64).

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// A supported content hash algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgo {
    Md5,
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgo {
    /// Every supported algorithm, in the order their name tokens are installed
    pub const ALL: [HashAlgo; 6] = [
        HashAlgo::Md5,
        HashAlgo::Sha1,
        HashAlgo::Sha224,
        HashAlgo::Sha256,
        HashAlgo::Sha384,
        HashAlgo::Sha512,
    ];

    /// Name used in templates (`[sha256]`) and SRI tokens (`sha256-…`)
    pub fn token(&self) -> &'static str {
        match self {
            HashAlgo::Md5 => "md5",
            HashAlgo::Sha1 => "sha1",
            HashAlgo::Sha224 => "sha224",
            HashAlgo::Sha256 => "sha256",
            HashAlgo::Sha384 => "sha384",
            HashAlgo::Sha512 => "sha512",
        }
    }

    /// Raw digest bytes
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgo::Md5 => md5::compute(data).0.to_vec(),
            HashAlgo::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgo::Sha224 => Sha224::digest(data).to_vec(),
            HashAlgo::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgo::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgo::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Lower-case hex rendering of the digest
    pub fn hex(&self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }

    /// Standard (padded) base64 rendering of the digest
    pub fn base64(&self, data: &[u8]) -> String {
        STANDARD.encode(self.digest(data))
    }

    /// SRI token: `sha384-<base64>`
    pub fn integrity(&self, data: &[u8]) -> String {
        format!("{}-{}", self.token(), self.base64(data))
    }
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Error for unknown algorithm names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported hash algorithm: {0}")]
pub struct UnknownHashAlgo(pub String);

impl FromStr for HashAlgo {
    type Err = UnknownHashAlgo;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashAlgo::ALL
            .into_iter()
            .find(|a| a.token() == s)
            .ok_or_else(|| UnknownHashAlgo(s.to_string()))
    }
}

impl Serialize for HashAlgo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for HashAlgo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
