use std::io;

use bytes::Bytes;
use log::{debug, warn};
use rand::{CryptoRng, Rng};

use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::packet::{PacketHeader, PacketList, PacketTrait};
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};

/// Symmetrically Encrypted Data Packet
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.7>
///
/// The packet carries no integrity protection. Processing one emits a warning.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymEncryptedData {
    packet_header: PacketHeader,
    state: State,
}

/// Either the encrypted body or the packets it holds, never both.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub enum State {
    Opaque(#[debug("{}", hex::encode(_0))] Bytes),
    Decoded(PacketList),
}

impl SymEncryptedData {
    /// Wraps an encrypted body read from the wire.
    pub fn from_slice(packet_header: PacketHeader, data: Bytes) -> Result<Self> {
        ensure_eq!(packet_header.tag(), Tag::SymEncryptedData, "invalid packet tag");
        Ok(SymEncryptedData {
            packet_header,
            state: State::Opaque(data),
        })
    }

    /// Creates a packet holding `packets`, ready to be encrypted.
    pub fn from_packets(version: PacketHeaderVersion, packets: PacketList) -> Self {
        // the length is fixed once the body is encrypted
        let packet_header = PacketHeader::new_fixed(version, Tag::SymEncryptedData, 0);
        SymEncryptedData {
            packet_header,
            state: State::Decoded(packets),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self.state, State::Decoded(_))
    }

    /// The encrypted body, if not decoded.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.state {
            State::Opaque(data) => Some(data.as_ref()),
            State::Decoded(_) => None,
        }
    }

    /// The inner packets, once decoded.
    pub fn packets(&self) -> Option<&PacketList> {
        match &self.state {
            State::Opaque(_) => None,
            State::Decoded(packets) => Some(packets),
        }
    }

    /// Decrypts the body and parses it into packets.
    ///
    /// On failure the packet stays opaque.
    pub fn decrypt(&mut self, alg: SymmetricKeyAlgorithm, key: &[u8]) -> Result<()> {
        let State::Opaque(data) = &self.state else {
            bail!("packet is already decrypted");
        };
        warn!("processing symmetrically encrypted data without integrity protection");

        let plaintext = alg.decrypt(key, data)?;
        let packets = PacketList::from_bytes(plaintext).map_err(|err| {
            debug!("decrypted body is not a packet stream: {:?}", err);
            Error::MalformedPacketStream {
                source: Box::new(err),
            }
        })?;
        debug!("decrypted {} packets", packets.len());

        self.state = State::Decoded(packets);
        Ok(())
    }

    /// Serializes and encrypts the inner packets.
    pub fn encrypt<R: CryptoRng + Rng>(
        &mut self,
        rng: R,
        alg: SymmetricKeyAlgorithm,
        key: &[u8],
    ) -> Result<()> {
        let State::Decoded(packets) = &self.state else {
            bail!("packet is already encrypted");
        };

        let plaintext = packets.to_bytes()?;
        let data = Bytes::from(alg.encrypt(rng, key, &plaintext)?);

        self.packet_header = PacketHeader::new_fixed(
            self.packet_header.version(),
            Tag::SymEncryptedData,
            data.len().try_into()?,
        );
        self.state = State::Opaque(data);
        Ok(())
    }
}

impl Serialize for SymEncryptedData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match &self.state {
            State::Opaque(data) => {
                writer.write_all(data)?;
                Ok(())
            }
            State::Decoded(_) => bail!("decoded packets must be encrypted before writing"),
        }
    }

    /// Zero while decoded. Nothing is written in that state, check [`SymEncryptedData::is_decoded`]
    /// before sizing output.
    fn write_len(&self) -> usize {
        match &self.state {
            State::Opaque(data) => data.len(),
            State::Decoded(_) => 0,
        }
    }
}

impl PacketTrait for SymEncryptedData {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }

    fn to_writer_with_header<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let State::Opaque(data) = &self.state else {
            bail!("decoded packets must be encrypted before writing");
        };

        PacketHeader::new_fixed(
            self.packet_header.version(),
            Tag::SymEncryptedData,
            data.len().try_into()?,
        )
        .to_writer(writer)?;
        writer.write_all(data)?;

        Ok(())
    }
}
