//! Identifier hashing
//!
//! Identifiers are base64-encoded and then digested, giving a fixed-alphabet
//! (lower-case hex) name that is safe to use as a directory name.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::{xxh3_128, xxh3_64};

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha1,
    Md5,
    Xxh3,
    Xxh3_128,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Xxh3 => "xxh3",
            HashAlgorithm::Xxh3_128 => "xxh3-128",
        }
    }

    /// Resolve an algorithm name, falling back to the default for unknown or
    /// empty names. The second element is a warning when a fallback happened.
    pub fn resolve(name: &str) -> (Self, Option<String>) {
        match name.parse() {
            Ok(algorithm) => (algorithm, None),
            Err(reason) => {
                let fallback = HashAlgorithm::default();
                let warning = format!("{}; using {}", reason, fallback.name());
                tracing::warn!(algorithm = name, fallback = fallback.name(), "{}", warning);
                (fallback, Some(warning))
            }
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "md5" => Ok(HashAlgorithm::Md5),
            "xxh3" | "xxh3-64" => Ok(HashAlgorithm::Xxh3),
            "xxh3-128" | "xxh128" => Ok(HashAlgorithm::Xxh3_128),
            "" => Err("hash algorithm is empty".to_string()),
            other => Err(format!("unknown hash algorithm: {}", other)),
        }
    }
}

/// Compute hash of bytes
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Xxh3 => format!("{:016x}", xxh3_64(data)),
        HashAlgorithm::Xxh3_128 => format!("{:032x}", xxh3_128(data)),
        HashAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(data);
            format!("{:x}", hasher.finalize())
        }
        HashAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            hasher.update(data);
            format!("{:x}", hasher.finalize())
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(data);
            format!("{:x}", hasher.finalize())
        }
    }
}

/// Derive the directory name for an identifier
pub fn hash_identifier(identifier: &str, algorithm: HashAlgorithm) -> String {
    let encoded = STANDARD.encode(identifier.as_bytes());
    hash_bytes(encoded.as_bytes(), algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_identifier_deterministic() {
        for algorithm in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha1,
            HashAlgorithm::Md5,
            HashAlgorithm::Xxh3,
            HashAlgorithm::Xxh3_128,
        ] {
            let a = hash_identifier("https://example.com/feed", algorithm);
            let b = hash_identifier("https://example.com/feed", algorithm);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_hash_lengths() {
        assert_eq!(hash_identifier("id", HashAlgorithm::Sha256).len(), 64);
        assert_eq!(hash_identifier("id", HashAlgorithm::Sha1).len(), 40);
        assert_eq!(hash_identifier("id", HashAlgorithm::Md5).len(), 32);
        assert_eq!(hash_identifier("id", HashAlgorithm::Xxh3).len(), 16);
        assert_eq!(hash_identifier("id", HashAlgorithm::Xxh3_128).len(), 32);
    }

    #[test]
    fn test_hash_is_filesystem_safe() {
        let hash = hash_identifier("../../etc/passwd", HashAlgorithm::Sha1);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_identifier_is_base64_encoded_before_hashing() {
        // base64("abc") == "YWJj"
        assert_eq!(
            hash_identifier("abc", HashAlgorithm::Sha1),
            hash_bytes(b"YWJj", HashAlgorithm::Sha1)
        );
    }

    #[test]
    fn test_md5_matches_legacy_layout() {
        // md5("YWJj")
        assert_eq!(
            hash_identifier("abc", HashAlgorithm::Md5),
            "f4c0128178a6a21b7a3dd76729725d91"
        );
        assert_eq!("MD5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
    }

    #[test]
    fn test_distinct_identifiers_differ() {
        let a = hash_identifier("alpha", HashAlgorithm::Sha256);
        let b = hash_identifier("beta", HashAlgorithm::Sha256);
        assert_ne!(a, b);
    }

    #[test]
    fn test_resolve_falls_back_with_warning() {
        let (algorithm, warning) = HashAlgorithm::resolve("md4");
        assert_eq!(algorithm, HashAlgorithm::Sha256);
        assert!(warning.unwrap().contains("md4"));

        let (algorithm, warning) = HashAlgorithm::resolve("");
        assert_eq!(algorithm, HashAlgorithm::Sha256);
        assert!(warning.is_some());
    }

    #[test]
    fn test_resolve_known_name() {
        let (algorithm, warning) = HashAlgorithm::resolve("XXH3");
        assert_eq!(algorithm, HashAlgorithm::Xxh3);
        assert!(warning.is_none());
    }
}
