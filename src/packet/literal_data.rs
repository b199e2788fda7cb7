use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};

/// Literal Data Packet
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.9>
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct LiteralData {
    packet_header: PacketHeader,
    mode: DataMode,
    #[debug("{}", String::from_utf8_lossy(file_name))]
    file_name: Bytes,
    created: DateTime<Utc>,
    #[debug("{} bytes", data.len())]
    data: Bytes,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DataMode {
    Binary = b'b',
    Text = b't',
    Utf8 = b'u',
    Mime = b'm',

    #[num_enum(catch_all)]
    Other(u8),
}

impl LiteralData {
    /// Creates a literal data packet, the timestamp is truncated to whole seconds.
    pub fn new(
        version: PacketHeaderVersion,
        mode: DataMode,
        file_name: &[u8],
        created: DateTime<Utc>,
        data: Bytes,
    ) -> Result<Self> {
        ensure!(file_name.len() <= 255, "file name too long");
        let len = (6 + file_name.len() + data.len()).try_into()?;

        Ok(LiteralData {
            packet_header: PacketHeader::new_fixed(version, Tag::LiteralData, len),
            mode,
            file_name: Bytes::copy_from_slice(file_name),
            created: created.trunc_subsecs(0),
            data,
        })
    }

    /// Binary data without a file name, stamped with the current time.
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        Self::new(
            PacketHeaderVersion::New,
            DataMode::Binary,
            &[],
            Utc::now(),
            data,
        )
    }

    /// Parses a `LiteralData` packet from the given buffer.
    pub fn from_slice(packet_header: PacketHeader, mut data: Bytes) -> Result<Self> {
        ensure_eq!(packet_header.tag(), Tag::LiteralData, "invalid packet tag");

        let mode = data.read_u8().map(DataMode::from)?;
        let name_len = data.read_u8()?;
        let file_name = data.read_take(name_len.into())?;
        let created = data.read_be_u32()?;
        let created = Utc
            .timestamp_opt(created.into(), 0)
            .single()
            .ok_or_else(|| format_err!("invalid timestamp {}", created))?;

        Ok(LiteralData {
            packet_header,
            mode,
            file_name,
            created,
            data: data.rest(),
        })
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn file_name(&self) -> &[u8] {
        &self.file_name
    }

    pub fn created(&self) -> &DateTime<Utc> {
        &self.created
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for LiteralData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.mode.into())?;
        writer.write_u8(self.file_name.len().try_into()?)?;
        writer.write_all(&self.file_name)?;
        writer.write_u32::<BigEndian>(self.created.timestamp().try_into()?)?;
        writer.write_all(&self.data)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 1 + self.file_name.len() + 4 + self.data.len()
    }
}

impl PacketTrait for LiteralData {
    fn packet_header(&self) -> &PacketHeader {
        &self.packet_header
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;

    #[test]
    fn hello() {
        let literal = LiteralData::new(
            PacketHeaderVersion::New,
            DataMode::Binary,
            b"",
            Utc.timestamp_opt(0, 0).unwrap(),
            Bytes::from_static(b"hello"),
        )
        .unwrap();

        let mut out = Vec::new();
        literal.to_writer_with_header(&mut out).unwrap();
        assert_eq!(out, hex!("cb0b62000000000068656c6c6f").to_vec());
    }

    #[test]
    fn parse() {
        let body = Bytes::from_static(&hex!("74 05 612e747874 5f5e1000 6869"));
        let header = PacketHeader::new_fixed(PacketHeaderVersion::New, Tag::LiteralData, 13);
        let literal = LiteralData::from_slice(header, body).unwrap();
        assert_eq!(literal.mode(), DataMode::Text);
        assert_eq!(literal.file_name(), b"a.txt");
        assert_eq!(literal.created().timestamp(), 1_600_000_000);
        assert_eq!(literal.data(), b"hi");
        assert_eq!(literal.write_len(), 13);
    }

    #[test]
    fn truncated() {
        let header = PacketHeader::new_fixed(PacketHeaderVersion::New, Tag::LiteralData, 3);
        assert!(LiteralData::from_slice(header, Bytes::from_static(&hex!("62 05 61"))).is_err());
    }
}
