use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Errors that can occur while selecting a hash function
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Unknown hash algorithm: {0} (expected sha512 or sha256)")]
    UnknownHashAlgorithm(String),
}

/// Represents a block digest as a lower-case hexadecimal string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub String);

impl BlockHash {
    /// The predecessor digest recorded by the genesis block
    pub fn sentinel() -> Self {
        BlockHash("0".to_string())
    }

    /// Encodes raw digest bytes as hex
    pub fn from_bytes(bytes: &[u8]) -> Self {
        BlockHash(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == "0"
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pure mapping from a byte sequence to a fixed-length digest.
///
/// Implementations must be deterministic and total: every input, including
/// the empty slice, produces a digest of the same length.
pub trait HashFunction {
    /// Digests the given bytes
    fn digest(&self, bytes: &[u8]) -> BlockHash;

    /// Short algorithm name used in logs
    fn name(&self) -> &'static str;
}

/// SHA-512, the production default
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Hasher;

impl HashFunction for Sha512Hasher {
    fn digest(&self, bytes: &[u8]) -> BlockHash {
        BlockHash::from_bytes(&Sha512::digest(bytes))
    }

    fn name(&self) -> &'static str {
        "sha512"
    }
}

/// SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashFunction for Sha256Hasher {
    fn digest(&self, bytes: &[u8]) -> BlockHash {
        BlockHash::from_bytes(&Sha256::digest(bytes))
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

/// The cryptographic digests a ledger can be configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha512,
    Sha256,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha512 => write!(f, "sha512"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha512" => Ok(HashAlgorithm::Sha512),
            "sha256" => Ok(HashAlgorithm::Sha256),
            _ => Err(CryptoError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// Deterministic, non-cryptographic hashing for tests only
#[cfg(test)]
pub(crate) mod testing {
    use super::{BlockHash, HashFunction};

    /// FNV-1a folded to 64 bits. Not collision resistant.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PlaceholderHasher;

    impl HashFunction for PlaceholderHasher {
        fn digest(&self, bytes: &[u8]) -> BlockHash {
            let mut state: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in bytes {
                state ^= u64::from(*byte);
                state = state.wrapping_mul(0x0000_0100_0000_01b3);
            }
            BlockHash::from_bytes(&state.to_be_bytes())
        }

        fn name(&self) -> &'static str {
            "placeholder"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::PlaceholderHasher;
    use super::*;

    #[test]
    fn test_digest_lengths() {
        assert_eq!(Sha512Hasher.digest(b"ledger").as_str().len(), 128);
        assert_eq!(Sha256Hasher.digest(b"ledger").as_str().len(), 64);
        assert_eq!(PlaceholderHasher.digest(b"ledger").as_str().len(), 16);
    }

    #[test]
    fn test_empty_input_is_hashed() {
        // Well-known SHA-256 of the empty string
        assert_eq!(
            Sha256Hasher.digest(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(Sha512Hasher.digest(b"").as_str().len(), 128);
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(Sha512Hasher.digest(b"abc"), Sha512Hasher.digest(b"abc"));
        assert_ne!(Sha512Hasher.digest(b"abc"), Sha512Hasher.digest(b"abd"));
        assert_eq!(PlaceholderHasher.digest(b"abc"), PlaceholderHasher.digest(b"abc"));
    }

    #[test]
    fn test_hash_algorithm_parsing() {
        assert_eq!("sha512".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha512));
        assert_eq!("SHA-256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert_eq!(
            "md5".parse::<HashAlgorithm>(),
            Err(CryptoError::UnknownHashAlgorithm("md5".to_string()))
        );
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha512);
    }

    #[test]
    fn test_sentinel() {
        assert!(BlockHash::sentinel().is_sentinel());
        assert!(!Sha512Hasher.digest(b"0").is_sentinel());
    }
}
