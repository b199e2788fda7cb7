use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;

use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, PacketLength, Tag};

/// Represents a packet header.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-4.2>
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    version: PacketHeaderVersion,
    tag: Tag,
    length: PacketLength,
}

impl PacketHeader {
    /// Parse a single packet header from the given buffer.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let header = i.read_u8()?;

        match header & 0b1100_0000 {
            0b1100_0000 => {
                // new starts with 0b11
                let tag = Tag::from(header & 0b0011_1111);
                let length = read_new_length(&mut i)?;
                Ok(PacketHeader {
                    version: PacketHeaderVersion::New,
                    tag,
                    length,
                })
            }
            0b1000_0000 => {
                // old starts with 0b10
                let tag = Tag::from((header >> 2) & 0b1111);
                let length = match header & 0b11 {
                    // One-Octet Lengths
                    0 => PacketLength::Fixed(i.read_u8()?.into()),
                    // Two-Octet Lengths
                    1 => PacketLength::Fixed(i.read_be_u16()?.into()),
                    // Four-Octet Lengths
                    2 => PacketLength::Fixed(i.read_be_u32()?),
                    _ => PacketLength::Indeterminate,
                };
                Ok(PacketHeader {
                    version: PacketHeaderVersion::Old,
                    tag,
                    length,
                })
            }
            _ => {
                bail!("invalid packet header {:08b}", header);
            }
        }
    }

    /// A header with a fixed length, in the requested format.
    ///
    /// Tags above 15 cannot be expressed in the old format and get a new format header.
    pub fn new_fixed(version: PacketHeaderVersion, tag: Tag, length: u32) -> Self {
        let version = match version {
            PacketHeaderVersion::Old if u8::from(tag) > 15 => PacketHeaderVersion::New,
            v => v,
        };

        PacketHeader {
            version,
            tag,
            length: PacketLength::Fixed(length),
        }
    }

    pub fn version(&self) -> PacketHeaderVersion {
        self.version
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn packet_length(&self) -> PacketLength {
        self.length
    }
}

/// Reads a new format body length, as used by headers and partial body chunks.
pub(crate) fn read_new_length<B: Buf>(i: &mut B) -> Result<PacketLength> {
    let olen = i.read_u8()?;
    let length = match olen {
        // One-Octet Lengths
        0..=191 => PacketLength::Fixed(olen.into()),
        // Two-Octet Lengths
        192..=223 => {
            let a = i.read_u8()?;
            let l = ((u32::from(olen) - 192) << 8) + 192 + u32::from(a);
            PacketLength::Fixed(l)
        }
        // Partial Body Lengths
        224..=254 => PacketLength::Partial(1 << (olen & 0x1F)),
        // Five-Octet Lengths
        255 => PacketLength::Fixed(i.read_be_u32()?),
    };

    Ok(length)
}

impl Serialize for PacketHeader {
    fn to_writer<W: std::io::Write>(&self, writer: &mut W) -> Result<()> {
        let tag = u8::from(self.tag);

        match (self.version, self.length) {
            (PacketHeaderVersion::New, PacketLength::Fixed(len)) => {
                writer.write_u8(0b1100_0000 | tag)?;
                if len < 192 {
                    writer.write_u8(len as u8)?;
                } else if len < 8384 {
                    writer.write_u8((((len - 192) >> 8) + 192) as u8)?;
                    writer.write_u8(((len - 192) & 0xFF) as u8)?;
                } else {
                    writer.write_u8(255)?;
                    writer.write_u32::<BigEndian>(len)?;
                }
            }
            (PacketHeaderVersion::Old, PacketLength::Fixed(len)) => {
                ensure!(tag <= 15, "tag {} does not fit an old format header", tag);
                let base = 0b1000_0000 | (tag << 2);
                if len < 256 {
                    writer.write_u8(base)?;
                    writer.write_u8(len as u8)?;
                } else if len < 65536 {
                    writer.write_u8(base | 1)?;
                    writer.write_u16::<BigEndian>(len as u16)?;
                } else {
                    writer.write_u8(base | 2)?;
                    writer.write_u32::<BigEndian>(len)?;
                }
            }
            (_, length) => {
                bail!("only fixed length headers are written, got {:?}", length);
            }
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        match (self.version, self.length) {
            (PacketHeaderVersion::New, PacketLength::Fixed(len)) => {
                1 + PacketLength::fixed_encoding_len(len)
            }
            (PacketHeaderVersion::Old, PacketLength::Fixed(len)) => {
                if len < 256 {
                    2
                } else if len < 65536 {
                    3
                } else {
                    5
                }
            }
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;

    #[test]
    fn new_five_octet_length() {
        let raw = hex!("d1ff0000136d");
        let header = PacketHeader::from_buf(&raw[..]).unwrap();

        assert_eq!(header.version(), PacketHeaderVersion::New);
        assert_eq!(header.tag(), Tag::UserAttribute);
        assert_eq!(header.packet_length(), PacketLength::Fixed(4973));

        // rewritten in the shortest form
        assert_eq!(header.to_bytes().unwrap(), hex!("d1d2ad").to_vec());
    }

    #[test]
    fn new_two_octet_length() {
        let header = PacketHeader::from_buf(&hex!("cbc0 00")[..]).unwrap();
        assert_eq!(header.tag(), Tag::LiteralData);
        assert_eq!(header.packet_length(), PacketLength::Fixed(192));
        assert_eq!(header.to_bytes().unwrap(), hex!("cbc000").to_vec());
    }

    #[test]
    fn partial_length() {
        let header = PacketHeader::from_buf(&hex!("c9e9")[..]).unwrap();
        assert_eq!(header.tag(), Tag::SymEncryptedData);
        assert_eq!(header.packet_length(), PacketLength::Partial(512));
        assert!(header.to_bytes().is_err());
    }

    #[test]
    fn old_lengths() {
        // secret key, two octet length
        let header = PacketHeader::from_buf(&hex!("9501d8")[..]).unwrap();
        assert_eq!(header.version(), PacketHeaderVersion::Old);
        assert_eq!(header.tag(), Tag::SecretKey);
        assert_eq!(header.packet_length(), PacketLength::Fixed(472));
        assert_eq!(header.to_bytes().unwrap(), hex!("9501d8").to_vec());
        assert_eq!(header.write_len(), 3);

        // indeterminate
        let header = PacketHeader::from_buf(&hex!("a7")[..]).unwrap();
        assert_eq!(header.tag(), Tag::SymEncryptedData);
        assert_eq!(header.packet_length(), PacketLength::Indeterminate);
    }

    #[test]
    fn old_header_shrinks_length_type() {
        // one octet length announced with four octets
        let header = PacketHeader::from_buf(&hex!("b60000000a")[..]).unwrap();
        assert_eq!(header.tag(), Tag::UserId);
        assert_eq!(header.to_bytes().unwrap(), hex!("b40a").to_vec());
    }

    #[test]
    fn old_format_falls_back_for_large_tags() {
        let header = PacketHeader::new_fixed(PacketHeaderVersion::Old, Tag::UserAttribute, 3);
        assert_eq!(header.version(), PacketHeaderVersion::New);
        assert_eq!(header.to_bytes().unwrap(), hex!("d103").to_vec());
    }

    #[test]
    fn not_a_header() {
        assert!(PacketHeader::from_buf(&hex!("0102")[..]).is_err());
        assert!(PacketHeader::from_buf(&hex!("c2")[..]).is_err());
    }
}
