use std::io;

use bytes::Bytes;
use log::{debug, warn};

use crate::{
    errors::Result,
    packet::{
        CompressedData, LiteralData, Marker, ModDetectionCode, OnePassSignature, PacketHeader,
        PublicKey, PublicKeyEncryptedSessionKey, PublicSubkey, SecretKey, SecretSubkey,
        Signature, SymEncryptedData, SymEncryptedProtectedData, SymKeyEncryptedSessionKey, Trust,
        UserAttribute, UserId,
    },
    ser::Serialize,
    types::{KeyDetails, PacketHeaderVersion, Tag},
};

/// Represents a Packet. A packet is the record structure used to encode a chunk of data in OpenPGP.
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-4>
#[derive(Debug, PartialEq, Eq, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Packet {
    CompressedData(CompressedData),
    PublicKey(PublicKey),
    PublicSubkey(PublicSubkey),
    SecretKey(SecretKey),
    SecretSubkey(SecretSubkey),
    LiteralData(LiteralData),
    Marker(Marker),
    ModDetectionCode(ModDetectionCode),
    OnePassSignature(OnePassSignature),
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    Signature(Signature),
    SymEncryptedData(SymEncryptedData),
    SymEncryptedProtectedData(SymEncryptedProtectedData),
    SymKeyEncryptedSessionKey(SymKeyEncryptedSessionKey),
    Trust(Trust),
    UserAttribute(UserAttribute),
    UserId(UserId),
}

impl_try_from_into!(
    Packet,
    CompressedData => CompressedData,
    PublicKey => PublicKey,
    PublicSubkey => PublicSubkey,
    SecretKey => SecretKey,
    SecretSubkey => SecretSubkey,
    LiteralData => LiteralData,
    Marker => Marker,
    ModDetectionCode => ModDetectionCode,
    OnePassSignature => OnePassSignature,
    PublicKeyEncryptedSessionKey => PublicKeyEncryptedSessionKey,
    Signature => Signature,
    SymEncryptedData => SymEncryptedData,
    SymEncryptedProtectedData => SymEncryptedProtectedData,
    SymKeyEncryptedSessionKey => SymKeyEncryptedSessionKey,
    Trust => Trust,
    UserAttribute => UserAttribute,
    UserId => UserId
);

impl Packet {
    /// Builds the packet for `packet_header` from its complete body.
    pub fn from_bytes(packet_header: PacketHeader, body: Bytes) -> Result<Self> {
        debug!("parsing {:?} ({} bytes)", packet_header.tag(), body.len());

        let packet = match packet_header.tag() {
            Tag::PublicKeyEncryptedSessionKey => {
                PublicKeyEncryptedSessionKey::from_slice(packet_header, body)?.into()
            }
            Tag::Signature => Signature::from_slice(packet_header, body)?.into(),
            Tag::SymKeyEncryptedSessionKey => {
                SymKeyEncryptedSessionKey::from_slice(packet_header, body)?.into()
            }
            Tag::OnePassSignature => OnePassSignature::from_slice(packet_header, body)?.into(),
            Tag::SecretKey => SecretKey::from_slice(packet_header, body)?.into(),
            Tag::PublicKey => PublicKey::from_slice(packet_header, body)?.into(),
            Tag::SecretSubkey => SecretSubkey::from_slice(packet_header, body)?.into(),
            Tag::CompressedData => CompressedData::from_slice(packet_header, body)?.into(),
            Tag::SymEncryptedData => SymEncryptedData::from_slice(packet_header, body)?.into(),
            Tag::Marker => Marker::from_slice(packet_header, body)?.into(),
            Tag::LiteralData => LiteralData::from_slice(packet_header, body)?.into(),
            Tag::Trust => Trust::from_slice(packet_header, body)?.into(),
            Tag::UserId => UserId::from_slice(packet_header, body)?.into(),
            Tag::PublicSubkey => PublicSubkey::from_slice(packet_header, body)?.into(),
            Tag::UserAttribute => UserAttribute::from_slice(packet_header, body)?.into(),
            Tag::SymEncryptedProtectedData => {
                SymEncryptedProtectedData::from_slice(packet_header, body)?.into()
            }
            Tag::ModDetectionCode => ModDetectionCode::from_slice(packet_header, body)?.into(),
            Tag::Other(t) => unsupported_err!("unknown packet tag {}", t),
        };

        Ok(packet)
    }

    pub fn packet_header(&self) -> &PacketHeader {
        match self {
            Self::CompressedData(p) => p.packet_header(),
            Self::PublicKey(p) => p.packet_header(),
            Self::PublicSubkey(p) => p.packet_header(),
            Self::SecretKey(p) => p.packet_header(),
            Self::SecretSubkey(p) => p.packet_header(),
            Self::LiteralData(p) => p.packet_header(),
            Self::Marker(p) => p.packet_header(),
            Self::ModDetectionCode(p) => p.packet_header(),
            Self::OnePassSignature(p) => p.packet_header(),
            Self::PublicKeyEncryptedSessionKey(p) => p.packet_header(),
            Self::Signature(p) => p.packet_header(),
            Self::SymEncryptedData(p) => p.packet_header(),
            Self::SymEncryptedProtectedData(p) => p.packet_header(),
            Self::SymKeyEncryptedSessionKey(p) => p.packet_header(),
            Self::Trust(p) => p.packet_header(),
            Self::UserAttribute(p) => p.packet_header(),
            Self::UserId(p) => p.packet_header(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.packet_header().tag()
    }

    /// The key fields, for the four key packet kinds.
    pub fn key_details(&self) -> Option<&dyn KeyDetails> {
        match self {
            Self::PublicKey(p) => Some(p),
            Self::PublicSubkey(p) => Some(p),
            Self::SecretKey(p) => Some(p),
            Self::SecretSubkey(p) => Some(p),
            _ => None,
        }
    }

    /// Replaces secret key packets by their public counterpart, leaves everything else as is.
    pub fn into_public(self) -> Self {
        match self {
            Self::SecretKey(p) => Self::PublicKey(p.public_key()),
            Self::SecretSubkey(p) => Self::PublicSubkey(p.public_key()),
            other => other,
        }
    }
}

impl Serialize for Packet {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::CompressedData(p) => p.to_writer_with_header(writer),
            Self::PublicKey(p) => p.to_writer_with_header(writer),
            Self::PublicSubkey(p) => p.to_writer_with_header(writer),
            Self::SecretKey(p) => p.to_writer_with_header(writer),
            Self::SecretSubkey(p) => p.to_writer_with_header(writer),
            Self::LiteralData(p) => p.to_writer_with_header(writer),
            Self::Marker(p) => p.to_writer_with_header(writer),
            Self::ModDetectionCode(p) => p.to_writer_with_header(writer),
            Self::OnePassSignature(p) => p.to_writer_with_header(writer),
            Self::PublicKeyEncryptedSessionKey(p) => p.to_writer_with_header(writer),
            Self::Signature(p) => p.to_writer_with_header(writer),
            Self::SymEncryptedData(p) => p.to_writer_with_header(writer),
            Self::SymEncryptedProtectedData(p) => p.to_writer_with_header(writer),
            Self::SymKeyEncryptedSessionKey(p) => p.to_writer_with_header(writer),
            Self::Trust(p) => p.to_writer_with_header(writer),
            Self::UserAttribute(p) => p.to_writer_with_header(writer),
            Self::UserId(p) => p.to_writer_with_header(writer),
        }
    }

    fn write_len(&self) -> usize {
        match self {
            Self::CompressedData(p) => p.write_len_with_header(),
            Self::PublicKey(p) => p.write_len_with_header(),
            Self::PublicSubkey(p) => p.write_len_with_header(),
            Self::SecretKey(p) => p.write_len_with_header(),
            Self::SecretSubkey(p) => p.write_len_with_header(),
            Self::LiteralData(p) => p.write_len_with_header(),
            Self::Marker(p) => p.write_len_with_header(),
            Self::ModDetectionCode(p) => p.write_len_with_header(),
            Self::OnePassSignature(p) => p.write_len_with_header(),
            Self::PublicKeyEncryptedSessionKey(p) => p.write_len_with_header(),
            Self::Signature(p) => p.write_len_with_header(),
            Self::SymEncryptedData(p) => p.write_len_with_header(),
            Self::SymEncryptedProtectedData(p) => p.write_len_with_header(),
            Self::SymKeyEncryptedSessionKey(p) => p.write_len_with_header(),
            Self::Trust(p) => p.write_len_with_header(),
            Self::UserAttribute(p) => p.write_len_with_header(),
            Self::UserId(p) => p.write_len_with_header(),
        }
    }
}

pub trait PacketTrait: Serialize {
    fn packet_header(&self) -> &PacketHeader;
    fn packet_header_version(&self) -> PacketHeaderVersion {
        self.packet_header().version()
    }
    fn tag(&self) -> Tag {
        self.packet_header().tag()
    }

    /// Write this packet including the packet header.
    ///
    /// The header is always written with a fixed length matching the body.
    fn to_writer_with_header<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let original_header = self.packet_header();
        let write_len = self.write_len().try_into()?;
        let header =
            PacketHeader::new_fixed(original_header.version(), original_header.tag(), write_len);

        if original_header.packet_length().maybe_len() != Some(write_len) {
            warn!(
                "packet header mismatch between reading and writing: original: {:?}, generated: {:?}",
                original_header, header
            );
        }
        header.to_writer(writer)?;

        // the actual packet body
        self.to_writer(writer)?;

        Ok(())
    }

    /// Length in bytes used when calling `to_writer_with_header`.
    fn write_len_with_header(&self) -> usize {
        let body_len = self.write_len();
        let header = PacketHeader::new_fixed(
            self.packet_header_version(),
            self.tag(),
            body_len as u32,
        );
        header.write_len() + body_len
    }
}

impl<'a, T: 'a + PacketTrait> PacketTrait for &'a T {
    fn packet_header(&self) -> &PacketHeader {
        (*self).packet_header()
    }
}
