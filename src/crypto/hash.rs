use std::str::FromStr;

use digest::DynDigest;
use md5::Md5;
use num_enum::{FromPrimitive, IntoPrimitive};
use ripemd::Ripemd160;
use sha1::Sha1;

use crate::errors::{Error, Result};

/// Available hash algorithms.
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-9.4>
#[derive(
    Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive, Hash, derive_more::Display,
)]
#[repr(u8)]
pub enum HashAlgorithm {
    #[display("NONE")]
    None = 0,
    #[display("MD5")]
    Md5 = 1,
    #[display("SHA1")]
    Sha1 = 2,
    #[display("RIPEMD160")]
    Ripemd160 = 3,

    #[display("SHA256")]
    Sha256 = 8,
    #[display("SHA384")]
    Sha384 = 9,
    #[display("SHA512")]
    Sha512 = 10,
    #[display("SHA224")]
    Sha224 = 11,

    #[num_enum(catch_all)]
    #[display("Other({_0})")]
    Other(u8),
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "ripemd160" => Ok(Self::Ripemd160),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "sha224" => Ok(Self::Sha224),
            _ => bail!("unknown hash"),
        }
    }
}

impl zeroize::DefaultIsZeroes for HashAlgorithm {}

impl HashAlgorithm {
    /// Create a new hasher.
    pub fn new_hasher(self) -> Result<Box<dyn DynDigest>> {
        match self {
            HashAlgorithm::Md5 => Ok(Box::<Md5>::default()),
            HashAlgorithm::Sha1 => Ok(Box::<Sha1>::default()),
            HashAlgorithm::Ripemd160 => Ok(Box::<Ripemd160>::default()),
            HashAlgorithm::Sha256 => Ok(Box::<sha2::Sha256>::default()),
            HashAlgorithm::Sha384 => Ok(Box::<sha2::Sha384>::default()),
            HashAlgorithm::Sha512 => Ok(Box::<sha2::Sha512>::default()),
            HashAlgorithm::Sha224 => Ok(Box::<sha2::Sha224>::default()),
            _ => unimplemented_err!("hasher {:?}", self),
        }
    }

    /// Calculate the digest of the given input data.
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut hasher = self.new_hasher()?;
        hasher.update(data);
        Ok(hasher.finalize().to_vec())
    }

    /// Returns the expected digest size for the given algorithm.
    pub fn digest_size(self) -> Option<usize> {
        let size = match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Ripemd160 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Sha224 => 28,
            _ => return None,
        };
        Some(size)
    }
}
