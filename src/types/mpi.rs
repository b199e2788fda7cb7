use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};

use crate::errors::{Error, Result};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Number of bits we accept when reading or writing MPIs.
/// The value is the same as gnupgs.
const MAX_EXTERN_MPI_BITS: u16 = 16384;

/// Represents an owned MPI value.
/// The inner value is ready to be serialized, without the need to strip leading zeros.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-3.2>
#[derive(Default, Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Mpi(#[debug("{}", hex::encode(_0))] Bytes);

impl Mpi {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parses the given buffer as an MPI.
    ///
    /// The buffer is expected to be length-prefixed.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let len_bits = i.read_be_u16()?;

        if len_bits > MAX_EXTERN_MPI_BITS {
            return Err(Error::InvalidInput);
        }

        let len_bytes = (len_bits + 7) >> 3;

        let n = i.read_take(usize::from(len_bytes))?;
        let n_stripped = strip_leading_zeros(&n);
        let n_stripped = n.slice_ref(n_stripped);

        Ok(Mpi(n_stripped))
    }

    /// Represent the data in `raw` as an Mpi.
    /// Note that `raw` is not expected to be length-prefixed!
    ///
    /// Strips leading zeros.
    pub fn from_slice(raw: &[u8]) -> Self {
        Self(strip_leading_zeros(raw).to_vec().into())
    }
}

/// Returns the bit length of a given slice.
#[inline]
fn bit_size(val: &[u8]) -> usize {
    if val.is_empty() {
        0
    } else {
        (val.len() * 8) - val[0].leading_zeros() as usize
    }
}

#[inline]
fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .position(|b| b != &0)
        .map_or(&[], |offset| &bytes[offset..])
}

impl AsRef<[u8]> for Mpi {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Serialize for Mpi {
    fn to_writer<W: io::Write>(&self, w: &mut W) -> Result<()> {
        let bytes = &self.0;
        let size = bit_size(bytes);
        w.write_u16::<BigEndian>(size as u16)?;
        w.write_all(bytes)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        2 + self.0.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn mpi_parse_and_write() {
        // 9 bits, value 0x01ff
        let raw = Bytes::from_static(&[0x00, 0x09, 0x01, 0xff]);
        let mpi = Mpi::from_buf(raw.clone()).unwrap();
        assert_eq!(mpi.as_bytes(), &[0x01, 0xff]);
        assert_eq!(mpi.to_bytes().unwrap(), raw.to_vec());
    }

    #[test]
    fn mpi_strips_leading_zeros() {
        let mpi = Mpi::from_slice(&[0, 0, 0x80]);
        assert_eq!(mpi.to_bytes().unwrap(), vec![0x00, 0x08, 0x80]);
    }

    #[test]
    fn mpi_too_short() {
        let raw = Bytes::from_static(&[0x00, 0x10, 0x01]);
        assert!(Mpi::from_buf(raw).is_err());
    }

    #[test]
    fn mpi_too_large() {
        let raw = Bytes::from_static(&[0xff, 0xff]);
        assert!(matches!(Mpi::from_buf(raw), Err(Error::InvalidInput)));
    }
}
