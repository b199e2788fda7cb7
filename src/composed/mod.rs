//! # Composed module
//!
//! Higher level objects built from several packets.

pub mod key;
mod shared;

pub use self::key::Key;
pub use self::shared::Deserializable;
