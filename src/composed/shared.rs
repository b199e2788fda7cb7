use bytes::Bytes;
use log::debug;

use crate::armor::{self, BlockType};
use crate::errors::{Error, Result};
use crate::packet::PacketList;

/// Compositions that are parsed from a packet stream, binary or armored.
pub trait Deserializable: Sized {
    /// Builds the composition from already parsed packets.
    fn from_packets(packets: PacketList) -> Result<Self>;

    /// Is `typ` an armor block type this composition is stored in.
    fn matches_block_type(typ: BlockType) -> bool;

    /// Parse a single byte encoded composition.
    fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let packets = PacketList::from_bytes(bytes)?;
        debug!("parsed {} packets", packets.len());
        Self::from_packets(packets)
    }

    /// Parse a single armor encoded composition.
    fn from_armor_single(input: impl AsRef<[u8]>) -> Result<(Self, armor::Headers)> {
        let (typ, headers, data) = armor::decode(input)?;
        if !Self::matches_block_type(typ) {
            debug!("unexpected armor block type {}", typ);
            return Err(Error::InvalidArmorWrappers);
        }

        Ok((Self::from_bytes(data)?, headers))
    }
}
