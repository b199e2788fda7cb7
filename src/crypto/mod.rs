//! Hashing, checksums, algorithm tables and the OpenPGP CFB cipher envelope.

pub mod checksum;
pub mod hash;
pub mod public_key;
pub mod sym;
