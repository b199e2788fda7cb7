//! # pgp-envelope
//!
//! OpenPGP (RFC 4880) keys and symmetrically encrypted data.
//!
//! - [`composed::Key`] holds a transferable key as one packet sequence, selects signing and
//!   encryption keys, converts to the public form and unlocks passphrase protected secrets.
//! - [`packet::SymEncryptedData`] wraps an inner packet stream under a symmetric cipher
//!   in OpenPGP CFB mode.
//!
//! ```rust
//! use pgp_envelope::crypto::sym::SymmetricKeyAlgorithm;
//!
//! let mut rng = rand::thread_rng();
//! let alg = SymmetricKeyAlgorithm::AES128;
//! let key = alg.new_session_key(&mut rng);
//!
//! let ciphertext = alg.encrypt(&mut rng, &key, b"hello").unwrap();
//! assert_eq!(alg.decrypt(&key, &ciphertext).unwrap(), b"hello");
//! ```

#![forbid(unsafe_code)]

// public so that the macros can be used in other crates
#[macro_use]
pub mod errors;
#[macro_use]
mod util;

pub mod armor;
pub mod composed;
pub mod config;
pub mod crypto;
pub mod packet;
pub mod parsing;
pub mod ser;
pub mod types;

pub use self::composed::{Deserializable, Key};
pub use self::config::{Config, ConfigBuilder};
pub use self::packet::{Packet, PacketList, SymEncryptedData};
