//! Settings that callers pick once and pass into operations.

use derive_builder::Builder;
use rand::{CryptoRng, Rng};

use crate::armor::Headers;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::Error;
use crate::types::StringToKey;

/// Coded iteration count, 16777216 octets hashed.
const DEFAULT_S2K_COUNT: u8 = 224;

/// Algorithm preferences and armor output options.
///
/// ```rust
/// use pgp_envelope::config::ConfigBuilder;
/// use pgp_envelope::crypto::hash::HashAlgorithm;
///
/// let config = ConfigBuilder::default()
///     .prefer_hash_algorithm(HashAlgorithm::Sha512)
///     .show_version(false)
///     .build()
///     .unwrap();
/// assert!(config.armor_headers().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct Config {
    /// Hash algorithm to use for signatures made with a key.
    #[builder(default)]
    pub prefer_hash_algorithm: HashAlgorithm,
    /// Cipher used when protecting secret key material.
    #[builder(default)]
    pub encryption_cipher: SymmetricKeyAlgorithm,
    #[builder(default = "HashAlgorithm::Sha256")]
    pub s2k_hash: HashAlgorithm,
    #[builder(default = "DEFAULT_S2K_COUNT")]
    pub s2k_count: u8,

    #[builder(default = "true")]
    pub armor_checksum: bool,
    #[builder(default = "true")]
    pub show_version: bool,
    #[builder(default)]
    pub show_comment: bool,
    #[builder(default, setter(into, strip_option))]
    pub comment: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prefer_hash_algorithm: HashAlgorithm::default(),
            encryption_cipher: SymmetricKeyAlgorithm::default(),
            s2k_hash: HashAlgorithm::Sha256,
            s2k_count: DEFAULT_S2K_COUNT,
            armor_checksum: true,
            show_version: true,
            show_comment: false,
            comment: None,
        }
    }
}

impl Config {
    /// The headers written into armored output.
    pub fn armor_headers(&self) -> Headers {
        let mut headers = Headers::new();
        if self.show_version {
            headers.insert(
                "Version".to_string(),
                vec![format!(
                    "{} {}",
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION")
                )],
            );
        }
        if self.show_comment {
            if let Some(comment) = &self.comment {
                headers.insert("Comment".to_string(), vec![comment.clone()]);
            }
        }
        headers
    }

    /// A fresh iterated and salted string-to-key specifier.
    pub fn string_to_key<R: CryptoRng + Rng>(&self, rng: R) -> StringToKey {
        StringToKey::new_iterated(rng, self.s2k_hash, self.s2k_count)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let built = ConfigBuilder::default().build().unwrap();
        assert_eq!(built, Config::default());
        assert_eq!(built.prefer_hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(built.encryption_cipher, SymmetricKeyAlgorithm::AES256);
    }

    #[test]
    fn armor_headers() {
        let config = Config::default();
        let headers = config.armor_headers();
        assert_eq!(headers.len(), 1);
        assert!(headers["Version"][0].starts_with("pgp-envelope "));

        let config = ConfigBuilder::default()
            .show_version(false)
            .show_comment(true)
            .comment("hi")
            .build()
            .unwrap();
        let headers = config.armor_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["Comment"], vec!["hi".to_string()]);
    }

    #[test]
    fn string_to_key_uses_config() {
        let config = ConfigBuilder::default()
            .s2k_hash(HashAlgorithm::Sha1)
            .s2k_count(96)
            .build()
            .unwrap();
        let s2k = config.string_to_key(ChaCha8Rng::seed_from_u64(0));
        assert_eq!(s2k.hash_alg(), HashAlgorithm::Sha1);
        assert_eq!(s2k.count(), Some(65536));
    }
}
