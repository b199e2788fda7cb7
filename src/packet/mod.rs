//! # Packet module
//!
//! Handles everything in relationship to packets.
//!
//! Key packets, user ids, literal data and symmetrically encrypted data are
//! interpreted. All other packet kinds are kept as raw bodies and written back as read.
//!
//! ```rust
//! use pgp_envelope::packet::{PacketList, UserId};
//! use pgp_envelope::ser::Serialize;
//! use pgp_envelope::types::{PacketHeaderVersion, Tag};
//!
//! let mut list = PacketList::new();
//! list.push(UserId::from_str(PacketHeaderVersion::New, "Alice <alice@example.org>").unwrap());
//!
//! let raw = list.to_bytes().unwrap();
//! let parsed = PacketList::from_bytes(raw).unwrap();
//! assert_eq!(parsed.filter_by_tag(&[Tag::UserId]).len(), 1);
//! ```

mod header;
mod key;
mod literal_data;
mod many;
mod opaque;
mod packet_sum;
mod sym_encrypted_data;
mod user_id;

pub use self::header::PacketHeader;
pub use self::key::{PublicKey, PublicKeyBody, PublicSubkey, SecretKey, SecretSubkey};
pub use self::literal_data::{DataMode, LiteralData};
pub use self::many::{PacketList, PacketParser};
pub use self::opaque::{
    CompressedData, Marker, ModDetectionCode, OnePassSignature, PublicKeyEncryptedSessionKey,
    Signature, SymEncryptedProtectedData, SymKeyEncryptedSessionKey, Trust, UserAttribute,
};
pub use self::packet_sum::{Packet, PacketTrait};
pub use self::sym_encrypted_data::{State as SymEncryptedDataState, SymEncryptedData};
pub use self::user_id::UserId;
