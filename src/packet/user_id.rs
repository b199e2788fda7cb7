use std::{fmt, io};

use bytes::Bytes;

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};

/// User ID Packet
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.11>
#[derive(Clone, PartialEq, Eq)]
pub struct UserId {
    packet_header: PacketHeader,
    id: Bytes,
}

impl UserId {
    /// Parses a `UserId` packet from the given slice.
    pub fn from_slice(packet_header: PacketHeader, input: Bytes) -> Result<Self> {
        ensure_eq!(packet_header.tag(), Tag::UserId, "invalid packet tag");
        Ok(UserId {
            packet_header,
            id: input,
        })
    }

    /// Create a new user id packet from a string.
    pub fn from_str(version: PacketHeaderVersion, input: &str) -> Result<Self> {
        let id = Bytes::copy_from_slice(input.as_bytes());
        let len = id.len().try_into()?;
        let packet_header = PacketHeader::new_fixed(version, Tag::UserId, len);

        Ok(UserId { packet_header, id })
    }

    /// The raw id, usually but not necessarily UTF-8.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    pub fn as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.id)?)
    }
}

impl Serialize for UserId {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.id)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.id.len()
    }
}

impl PacketTrait for UserId {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User ID: \"{}\"", String::from_utf8_lossy(&self.id))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserId")
            .field("packet_header", &self.packet_header)
            .field("id", &String::from_utf8_lossy(&self.id))
            .finish()
    }
}
