use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::{debug, warn};

use crate::errors::Result;
use crate::packet::header::read_new_length;
use crate::packet::{Packet, PacketHeader};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{PacketLength, Tag};

/// Parses packets one by one from a buffer.
///
/// Packets with unknown tags are skipped. After the first error the parser is exhausted.
#[derive(Debug)]
pub struct PacketParser<B> {
    inner: B,
    done: bool,
}

impl<B: Buf> PacketParser<B> {
    pub fn new(inner: B) -> Self {
        PacketParser { inner, done: false }
    }

    fn next_packet(&mut self) -> Result<Option<Packet>> {
        while self.inner.has_remaining() {
            let header = PacketHeader::from_buf(&mut self.inner)?;
            let body = read_body(&mut self.inner, header.packet_length())?;

            if let Tag::Other(tag) = header.tag() {
                warn!("skipping unknown packet tag {} ({} bytes)", tag, body.len());
                continue;
            }

            return Packet::from_bytes(header, body).map(Some);
        }

        Ok(None)
    }
}

/// Collects the body that follows a header, joining partial body chunks.
fn read_body<B: Buf>(i: &mut B, length: PacketLength) -> Result<Bytes> {
    match length {
        PacketLength::Fixed(len) => Ok(i.read_take(len.try_into()?)?),
        PacketLength::Indeterminate => Ok(i.rest()),
        PacketLength::Partial(len) => {
            let mut body = BytesMut::new();
            let mut chunk_len = len;
            loop {
                body.put(i.read_take(chunk_len.try_into()?)?);
                match read_new_length(i)? {
                    PacketLength::Partial(len) => chunk_len = len,
                    PacketLength::Fixed(len) => {
                        body.put(i.read_take(len.try_into()?)?);
                        break;
                    }
                    PacketLength::Indeterminate => {
                        bail!("indeterminate length inside a partial body")
                    }
                }
            }
            debug!("joined partial body of {} bytes", body.len());
            Ok(body.freeze())
        }
    }
}

impl<B: Buf> Iterator for PacketParser<B> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// An ordered, owned sequence of packets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PacketList {
    packets: Vec<Packet>,
}

impl PacketList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every packet in `input`.
    pub fn from_buf<B: Buf>(input: B) -> Result<Self> {
        PacketParser::new(input).collect()
    }

    pub fn from_bytes(input: impl Into<Bytes>) -> Result<Self> {
        Self::from_buf(input.into())
    }

    pub fn push(&mut self, packet: impl Into<Packet>) {
        self.packets.push(packet.into());
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Packet> {
        self.packets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Packet> {
        self.packets.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Packet> {
        self.packets.iter_mut()
    }

    /// The packets with one of the given tags, in stream order.
    pub fn filter_by_tag(&self, tags: &[Tag]) -> Vec<&Packet> {
        self.packets
            .iter()
            .filter(|p| tags.contains(&p.tag()))
            .collect()
    }

    pub fn into_inner(self) -> Vec<Packet> {
        self.packets
    }
}

impl From<Vec<Packet>> for PacketList {
    fn from(packets: Vec<Packet>) -> Self {
        PacketList { packets }
    }
}

impl FromIterator<Packet> for PacketList {
    fn from_iter<I: IntoIterator<Item = Packet>>(iter: I) -> Self {
        PacketList {
            packets: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PacketList {
    type Item = Packet;
    type IntoIter = std::vec::IntoIter<Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.into_iter()
    }
}

impl<'a> IntoIterator for &'a PacketList {
    type Item = &'a Packet;
    type IntoIter = std::slice::Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

impl Serialize for PacketList {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        self.packets.to_writer(writer)
    }

    fn write_len(&self) -> usize {
        self.packets.write_len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;
    use crate::errors::Error;

    #[test]
    fn parse_in_order() {
        // user id "bob", marker "PGP", user id "al"
        let raw = hex!("cd03 626f62 ca03 504750 b402 616c");
        let list = PacketList::from_bytes(raw.to_vec()).unwrap();

        let tags: Vec<_> = list.iter().map(|p| p.tag()).collect();
        assert_eq!(tags, vec![Tag::UserId, Tag::Marker, Tag::UserId]);
        assert_eq!(list.filter_by_tag(&[Tag::UserId]).len(), 2);
        assert_eq!(list.filter_by_tag(&[Tag::Trust]).len(), 0);

        // old format headers survive, the new ones too
        assert_eq!(list.to_bytes().unwrap(), raw.to_vec());
    }

    #[test]
    fn skips_unknown_tags() {
        // tag 60, then a user id
        let raw = hex!("fc02 0102 cd01 61");
        let list = PacketList::from_bytes(raw.to_vec()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().tag(), Tag::UserId);
    }

    #[test]
    fn partial_bodies_are_joined() {
        // literal data in a 2 byte partial chunk, then a final 9 byte chunk
        let raw = hex!("cb e1 6200 09 0000000068656c6c6f");
        let list = PacketList::from_bytes(raw.to_vec()).unwrap();

        let Packet::LiteralData(lit) = list.get(0).unwrap() else {
            panic!("expected literal data");
        };
        assert_eq!(lit.data(), b"hello");
        assert_eq!(lit.file_name(), b"");
    }

    #[test]
    fn truncated_stream_errors_once() {
        let raw = hex!("cd05 626f62");
        let mut parser = PacketParser::new(&raw[..]);
        assert!(matches!(
            parser.next(),
            Some(Err(Error::PacketParsing { .. }))
        ));
        assert!(parser.next().is_none());
    }
}
