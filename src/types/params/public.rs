use std::io;

use bytes::{Buf, Bytes};

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Mpi;

/// Represent the public parameters for the different algorithms.
///
/// Curves are kept as their raw OID, no curve arithmetic happens in this crate.
#[derive(PartialEq, Eq, Clone, derive_more::Debug)]
pub enum PublicParams {
    RSA {
        n: Mpi,
        e: Mpi,
    },
    DSA {
        p: Mpi,
        q: Mpi,
        g: Mpi,
        y: Mpi,
    },
    Elgamal {
        p: Mpi,
        g: Mpi,
        y: Mpi,
    },
    ECDSA {
        #[debug("{}", hex::encode(curve))]
        curve: Bytes,
        p: Mpi,
    },
    EdDSALegacy {
        #[debug("{}", hex::encode(curve))]
        curve: Bytes,
        q: Mpi,
    },
    ECDH {
        #[debug("{}", hex::encode(curve))]
        curve: Bytes,
        p: Mpi,
        #[debug("{}", hex::encode(kdf))]
        kdf: Bytes,
    },
    Unknown {
        #[debug("{}", hex::encode(data))]
        data: Bytes,
    },
}

/// Reads a one octet length prefixed field, as used for curve OIDs and KDF parameters.
fn read_short_field<B: Buf>(i: &mut B) -> Result<Bytes> {
    let len = i.read_u8()?;
    ensure!(len != 0 && len != 0xFF, "reserved field length {}", len);
    let field = i.read_take(usize::from(len))?;
    Ok(field)
}

fn write_short_field<W: io::Write>(writer: &mut W, field: &[u8]) -> Result<()> {
    let len: u8 = field.len().try_into()?;
    writer.write_all(&[len])?;
    writer.write_all(field)?;
    Ok(())
}

impl PublicParams {
    /// Parses the public parameters of a key.
    ///
    /// For algorithms we do not know the rest of the input is kept as is.
    pub fn try_from_buf<B: Buf>(alg: PublicKeyAlgorithm, mut i: B) -> Result<Self> {
        let params = match alg {
            PublicKeyAlgorithm::RSA
            | PublicKeyAlgorithm::RSAEncrypt
            | PublicKeyAlgorithm::RSASign => {
                let n = Mpi::from_buf(&mut i)?;
                let e = Mpi::from_buf(&mut i)?;
                PublicParams::RSA { n, e }
            }
            PublicKeyAlgorithm::DSA => {
                let p = Mpi::from_buf(&mut i)?;
                let q = Mpi::from_buf(&mut i)?;
                let g = Mpi::from_buf(&mut i)?;
                let y = Mpi::from_buf(&mut i)?;
                PublicParams::DSA { p, q, g, y }
            }
            PublicKeyAlgorithm::Elgamal | PublicKeyAlgorithm::ElgamalSign => {
                let p = Mpi::from_buf(&mut i)?;
                let g = Mpi::from_buf(&mut i)?;
                let y = Mpi::from_buf(&mut i)?;
                PublicParams::Elgamal { p, g, y }
            }
            PublicKeyAlgorithm::ECDSA => {
                let curve = read_short_field(&mut i)?;
                let p = Mpi::from_buf(&mut i)?;
                PublicParams::ECDSA { curve, p }
            }
            PublicKeyAlgorithm::EdDSALegacy => {
                let curve = read_short_field(&mut i)?;
                let q = Mpi::from_buf(&mut i)?;
                PublicParams::EdDSALegacy { curve, q }
            }
            PublicKeyAlgorithm::ECDH => {
                let curve = read_short_field(&mut i)?;
                let p = Mpi::from_buf(&mut i)?;
                let kdf = read_short_field(&mut i)?;
                PublicParams::ECDH { curve, p, kdf }
            }
            PublicKeyAlgorithm::DiffieHellman | PublicKeyAlgorithm::Unknown(_) => {
                PublicParams::Unknown { data: i.rest() }
            }
        };

        Ok(params)
    }

    /// Is this a set of parameters we know the layout of.
    pub fn is_known(&self) -> bool {
        !matches!(self, PublicParams::Unknown { .. })
    }
}

impl Serialize for PublicParams {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            PublicParams::RSA { n, e } => {
                n.to_writer(writer)?;
                e.to_writer(writer)?;
            }
            PublicParams::DSA { p, q, g, y } => {
                p.to_writer(writer)?;
                q.to_writer(writer)?;
                g.to_writer(writer)?;
                y.to_writer(writer)?;
            }
            PublicParams::Elgamal { p, g, y } => {
                p.to_writer(writer)?;
                g.to_writer(writer)?;
                y.to_writer(writer)?;
            }
            PublicParams::ECDSA { curve, p } => {
                write_short_field(writer, curve)?;
                p.to_writer(writer)?;
            }
            PublicParams::EdDSALegacy { curve, q } => {
                write_short_field(writer, curve)?;
                q.to_writer(writer)?;
            }
            PublicParams::ECDH { curve, p, kdf } => {
                write_short_field(writer, curve)?;
                p.to_writer(writer)?;
                write_short_field(writer, kdf)?;
            }
            PublicParams::Unknown { data } => {
                writer.write_all(data)?;
            }
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            PublicParams::RSA { n, e } => n.write_len() + e.write_len(),
            PublicParams::DSA { p, q, g, y } => {
                p.write_len() + q.write_len() + g.write_len() + y.write_len()
            }
            PublicParams::Elgamal { p, g, y } => p.write_len() + g.write_len() + y.write_len(),
            PublicParams::ECDSA { curve, p } => 1 + curve.len() + p.write_len(),
            PublicParams::EdDSALegacy { curve, q } => 1 + curve.len() + q.write_len(),
            PublicParams::ECDH { curve, p, kdf } => 1 + curve.len() + p.write_len() + 1 + kdf.len(),
            PublicParams::Unknown { data } => data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;

    #[test]
    fn rsa() {
        let raw = hex!("0009 01ff 0002 03");
        let params = PublicParams::try_from_buf(PublicKeyAlgorithm::RSASign, &raw[..]).unwrap();
        assert_eq!(
            params,
            PublicParams::RSA {
                n: Mpi::from_slice(&[0x01, 0xff]),
                e: Mpi::from_slice(&[0x03]),
            }
        );
        assert_eq!(params.to_bytes().unwrap(), raw.to_vec());
    }

    #[test]
    fn ecdh() {
        // curve25519 oid, a one octet point and kdf params
        let raw = hex!("0a 2b060104019755010501 0007 40 03 010807");
        let params = PublicParams::try_from_buf(PublicKeyAlgorithm::ECDH, &raw[..]).unwrap();
        match &params {
            PublicParams::ECDH { curve, p, kdf } => {
                assert_eq!(&curve[..], &hex!("2b060104019755010501")[..]);
                assert_eq!(p.as_bytes(), &[0x40]);
                assert_eq!(&kdf[..], &hex!("010807")[..]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(params.to_bytes().unwrap(), raw.to_vec());
        assert_eq!(params.write_len(), raw.len());
    }

    #[test]
    fn truncated() {
        let raw = hex!("0004 0f 0010");
        assert!(PublicParams::try_from_buf(PublicKeyAlgorithm::RSA, &raw[..]).is_err());
    }

    #[test]
    fn unknown_algorithm_keeps_body() {
        let raw = hex!("deadbeef");
        let params = PublicParams::try_from_buf(PublicKeyAlgorithm::Unknown(99), &raw[..]).unwrap();
        assert!(!params.is_known());
        assert_eq!(params.to_bytes().unwrap(), raw.to_vec());
    }
}
