//! Content digests for written asset files.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Digest recorded for each emitted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        };
        f.write_str(s)
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(format!("unknown hash algorithm '{}'", other)),
        }
    }
}

/// Computes the MD5 digest of the given data and returns it as a hex string.
pub fn md5_digest(data: &[u8]) -> String {
    hex::encode(md5::compute(data).0)
}

/// Computes the SHA-256 digest of the given data and returns it as a hex string.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Computes the BLAKE3 digest of the given data and returns it as a hex string.
pub fn blake3_digest(data: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    hasher.finalize().to_hex().to_string()
}

/// Digest `data` with the selected algorithm.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => md5_digest(data),
        HashAlgorithm::Sha256 => sha256_digest(data),
        HashAlgorithm::Blake3 => blake3_digest(data),
    }
}

/// Digest the current contents of a file on disk.
pub fn file_digest(algorithm: HashAlgorithm, path: &Path) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(digest(algorithm, &data))
}
