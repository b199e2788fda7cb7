//! Packets that are carried through untouched.
//!
//! Their bodies are kept as raw octets and written back exactly as read.

use std::io;

use bytes::Bytes;

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::ser::Serialize;
use crate::types::Tag;

macro_rules! opaque_packet {
    ($(#[$doc:meta])* $name:ident, $tag:expr) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, derive_more::Debug)]
        pub struct $name {
            packet_header: PacketHeader,
            #[debug("{}", hex::encode(data))]
            data: Bytes,
        }

        impl $name {
            /// Wraps a packet body read from the wire.
            pub fn from_slice(packet_header: PacketHeader, data: Bytes) -> Result<Self> {
                ensure_eq!(packet_header.tag(), $tag, "invalid packet tag");
                Ok(Self {
                    packet_header,
                    data,
                })
            }

            /// The raw packet body.
            pub fn data(&self) -> &[u8] {
                &self.data
            }
        }

        impl Serialize for $name {
            fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
                writer.write_all(&self.data)?;
                Ok(())
            }

            fn write_len(&self) -> usize {
                self.data.len()
            }
        }

        impl PacketTrait for $name {
            fn packet_header(&self) -> &PacketHeader {
                &self.packet_header
            }
        }
    };
}

opaque_packet!(
    /// Signature Packet
    /// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.2>
    Signature,
    Tag::Signature
);
opaque_packet!(
    /// User Attribute Packet
    UserAttribute,
    Tag::UserAttribute
);
opaque_packet!(
    /// Compressed Data Packet
    CompressedData,
    Tag::CompressedData
);
opaque_packet!(
    /// Sym. Encrypted and Integrity Protected Data Packet
    SymEncryptedProtectedData,
    Tag::SymEncryptedProtectedData
);
opaque_packet!(
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey,
    Tag::PublicKeyEncryptedSessionKey
);
opaque_packet!(
    /// Symmetric-Key Encrypted Session Key Packet
    SymKeyEncryptedSessionKey,
    Tag::SymKeyEncryptedSessionKey
);
opaque_packet!(
    /// One-Pass Signature Packet
    OnePassSignature,
    Tag::OnePassSignature
);
opaque_packet!(
    /// Marker Packet, always "PGP"
    Marker,
    Tag::Marker
);
opaque_packet!(
    /// Trust Packet
    Trust,
    Tag::Trust
);
opaque_packet!(
    /// Modification Detection Code Packet
    ModDetectionCode,
    Tag::ModDetectionCode
);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::PacketHeaderVersion;

    #[test]
    fn body_is_kept() {
        let header = PacketHeader::new_fixed(PacketHeaderVersion::New, Tag::Marker, 3);
        let marker = Marker::from_slice(header, Bytes::from_static(b"PGP")).unwrap();
        assert_eq!(marker.data(), b"PGP");
        assert_eq!(marker.to_bytes().unwrap(), b"PGP".to_vec());

        let mut out = Vec::new();
        marker.to_writer_with_header(&mut out).unwrap();
        assert_eq!(out, b"\xca\x03PGP".to_vec());
    }

    #[test]
    fn tag_must_match() {
        let header = PacketHeader::new_fixed(PacketHeaderVersion::New, Tag::Trust, 1);
        assert!(Signature::from_slice(header, Bytes::from_static(b"x")).is_err());
    }
}
