use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use md5::Md5;
use sha1::{Digest, Sha1};

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{
    Fingerprint, KeyDetails, KeyId, KeyVersion, PacketHeaderVersion, PublicParams, Tag,
};

/// The public part shared by all four key packet types.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.5.2>
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKeyBody {
    version: KeyVersion,
    algorithm: PublicKeyAlgorithm,
    created_at: DateTime<Utc>,
    expiration: Option<u16>,
    public_params: PublicParams,
    fingerprint: Fingerprint,
    key_id: KeyId,
}

impl PublicKeyBody {
    /// Assembles a key body, `expiration` is only kept for v2 and v3 keys.
    pub fn new(
        version: KeyVersion,
        algorithm: PublicKeyAlgorithm,
        created_at: DateTime<Utc>,
        expiration: Option<u16>,
        public_params: PublicParams,
    ) -> Result<Self> {
        let expiration = match version {
            KeyVersion::V2 | KeyVersion::V3 => {
                // v3 keys are RSA only, their ids are taken from the modulus
                if !matches!(public_params, PublicParams::RSA { .. }) {
                    unsupported_err!(
                        "invalid algorithm {:?} for key version {:?}",
                        algorithm,
                        version
                    );
                }
                Some(expiration.unwrap_or(0))
            }
            KeyVersion::V4 => None,
            _ => unsupported_err!("key version {:?}", version),
        };

        let created_at = created_at.trunc_subsecs(0);
        let (fingerprint, key_id) =
            compute_ids(version, algorithm, &created_at, expiration, &public_params)?;

        Ok(PublicKeyBody {
            version,
            algorithm,
            created_at,
            expiration,
            public_params,
            fingerprint,
            key_id,
        })
    }

    /// Parses the public part of a key packet, leaving anything after it in `i`.
    pub fn try_from_buf<B: Buf>(i: &mut B) -> Result<Self> {
        let version = i.read_u8().map(KeyVersion::from)?;
        if !matches!(version, KeyVersion::V2 | KeyVersion::V3 | KeyVersion::V4) {
            unsupported_err!("key version {:?}", version);
        }

        let created = i.read_be_u32()?;
        let created_at = Utc
            .timestamp_opt(created.into(), 0)
            .single()
            .ok_or_else(|| format_err!("invalid key creation time {}", created))?;

        let expiration = if version.is_legacy() {
            Some(i.read_be_u16()?)
        } else {
            None
        };

        let algorithm = i.read_u8().map(PublicKeyAlgorithm::from)?;
        let public_params = PublicParams::try_from_buf(algorithm, &mut *i)?;

        Self::new(version, algorithm, created_at, expiration, public_params)
    }
}

fn write_body<W: io::Write>(
    writer: &mut W,
    version: KeyVersion,
    algorithm: PublicKeyAlgorithm,
    created_at: &DateTime<Utc>,
    expiration: Option<u16>,
    public_params: &PublicParams,
) -> Result<()> {
    writer.write_u8(version.into())?;
    writer.write_u32::<BigEndian>(created_at.timestamp().try_into()?)?;
    if let Some(expiration) = expiration {
        writer.write_u16::<BigEndian>(expiration)?;
    }
    writer.write_u8(algorithm.into())?;
    public_params.to_writer(writer)?;

    Ok(())
}

/// Fingerprint and key id, see <https://datatracker.ietf.org/doc/html/rfc4880#section-12.2>
fn compute_ids(
    version: KeyVersion,
    algorithm: PublicKeyAlgorithm,
    created_at: &DateTime<Utc>,
    expiration: Option<u16>,
    public_params: &PublicParams,
) -> Result<(Fingerprint, KeyId)> {
    match (version, public_params) {
        (KeyVersion::V2 | KeyVersion::V3, PublicParams::RSA { n, e }) => {
            let mut h = Md5::new();
            h.update(n.as_bytes());
            h.update(e.as_bytes());
            let fingerprint = Fingerprint::V3(h.finalize().into());

            // low 64 bits of the modulus
            let n = n.as_bytes();
            let take = n.len().min(8);
            let mut id = [0u8; 8];
            id[8 - take..].copy_from_slice(&n[n.len() - take..]);

            Ok((fingerprint, KeyId::from(id)))
        }
        (KeyVersion::V4, _) => {
            let mut body = Vec::new();
            write_body(
                &mut body,
                version,
                algorithm,
                created_at,
                expiration,
                public_params,
            )?;
            let len: u16 = body.len().try_into()?;

            let mut h = Sha1::new();
            h.update([0x99]);
            h.update(len.to_be_bytes());
            h.update(&body);
            let digest: [u8; 20] = h.finalize().into();

            let mut id = [0u8; 8];
            id.copy_from_slice(&digest[12..]);

            Ok((Fingerprint::V4(digest), KeyId::from(id)))
        }
        _ => unsupported_err!("key ids for {:?} keys with {:?}", version, algorithm),
    }
}

impl Serialize for PublicKeyBody {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        write_body(
            writer,
            self.version,
            self.algorithm,
            &self.created_at,
            self.expiration,
            &self.public_params,
        )
    }

    fn write_len(&self) -> usize {
        let expiration = if self.expiration.is_some() { 2 } else { 0 };
        1 + 4 + expiration + 1 + self.public_params.write_len()
    }
}

impl KeyDetails for PublicKeyBody {
    fn version(&self) -> KeyVersion {
        self.version
    }

    fn key_id(&self) -> KeyId {
        self.key_id
    }

    fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    fn expiration(&self) -> Option<u16> {
        self.expiration
    }

    fn public_params(&self) -> &PublicParams {
        &self.public_params
    }
}

/// Header for a key body of known size.
pub(super) fn key_header(version: PacketHeaderVersion, tag: Tag, body_len: usize) -> PacketHeader {
    // key bodies are bounded by the mpi size limit, far below u32::MAX
    PacketHeader::new_fixed(version, tag, body_len as u32)
}

macro_rules! impl_public_key {
    ($(#[$doc:meta])* $name:ident, $tag:expr) => {
        $(#[$doc])*
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub struct $name {
            packet_header: PacketHeader,
            body: PublicKeyBody,
        }

        impl $name {
            pub fn new(version: PacketHeaderVersion, body: PublicKeyBody) -> Self {
                let packet_header = key_header(version, $tag, body.write_len());
                Self {
                    packet_header,
                    body,
                }
            }

            /// Parses a packet body.
            pub fn from_slice(packet_header: PacketHeader, mut input: Bytes) -> Result<Self> {
                ensure_eq!(packet_header.tag(), $tag, "invalid packet tag");
                let body = PublicKeyBody::try_from_buf(&mut input)?;
                ensure!(
                    !input.has_remaining(),
                    "{} trailing octets in key packet",
                    input.remaining()
                );

                Ok(Self {
                    packet_header,
                    body,
                })
            }

            pub fn body(&self) -> &PublicKeyBody {
                &self.body
            }
        }

        impl Serialize for $name {
            fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
                self.body.to_writer(writer)
            }

            fn write_len(&self) -> usize {
                self.body.write_len()
            }
        }

        impl PacketTrait for $name {
            fn packet_header(&self) -> &PacketHeader {
                &self.packet_header
            }
        }

        impl KeyDetails for $name {
            fn version(&self) -> KeyVersion {
                self.body.version()
            }

            fn key_id(&self) -> KeyId {
                self.body.key_id()
            }

            fn fingerprint(&self) -> Fingerprint {
                self.body.fingerprint()
            }

            fn algorithm(&self) -> PublicKeyAlgorithm {
                self.body.algorithm()
            }

            fn created_at(&self) -> &DateTime<Utc> {
                self.body.created_at()
            }

            fn expiration(&self) -> Option<u16> {
                self.body.expiration()
            }

            fn public_params(&self) -> &PublicParams {
                self.body.public_params()
            }
        }
    };
}

impl_public_key!(
    /// Public-Key Packet
    PublicKey,
    Tag::PublicKey
);
impl_public_key!(
    /// Public-Subkey Packet
    PublicSubkey,
    Tag::PublicSubkey
);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;
    use crate::types::Mpi;

    fn rsa_params() -> PublicParams {
        PublicParams::RSA {
            n: Mpi::from_slice(&hex!("c0ffee0102030405060708090a0b0c0d0e0f")),
            e: Mpi::from_slice(&[0x01, 0x00, 0x01]),
        }
    }

    #[test]
    fn v4_ids() {
        let created = Utc.timestamp_opt(0x5f5e1000, 0).unwrap();
        let body =
            PublicKeyBody::new(KeyVersion::V4, PublicKeyAlgorithm::RSA, created, None, rsa_params())
                .unwrap();

        let raw = body.to_bytes().unwrap();
        assert_eq!(raw.len(), body.write_len());
        assert_eq!(&raw[..6], &hex!("04 5f5e1000 01"));

        let mut hashed = vec![0x99, 0, raw.len() as u8];
        hashed.extend_from_slice(&raw);
        let expected: [u8; 20] = Sha1::digest(&hashed).into();
        assert_eq!(body.fingerprint(), Fingerprint::V4(expected));
        assert_eq!(body.key_id().as_ref(), &expected[12..]);
    }

    #[test]
    fn v3_ids() {
        let created = Utc.timestamp_opt(0, 0).unwrap();
        let body = PublicKeyBody::new(
            KeyVersion::V3,
            PublicKeyAlgorithm::RSA,
            created,
            Some(30),
            rsa_params(),
        )
        .unwrap();

        assert_eq!(body.key_id().as_ref(), &hex!("08090a0b0c0d0e0f"));
        let expected: [u8; 16] =
            Md5::digest(hex!("c0ffee0102030405060708090a0b0c0d0e0f 010001")).into();
        assert_eq!(body.fingerprint(), Fingerprint::V3(expected));
        assert_eq!(body.expiration(), Some(30));

        // and back
        let raw = body.to_bytes().unwrap();
        let parsed = PublicKeyBody::try_from_buf(&mut &raw[..]).unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn v3_needs_rsa() {
        let params = PublicParams::Elgamal {
            p: Mpi::from_slice(&[7]),
            g: Mpi::from_slice(&[2]),
            y: Mpi::from_slice(&[3]),
        };
        let res = PublicKeyBody::new(
            KeyVersion::V3,
            PublicKeyAlgorithm::Elgamal,
            Utc::now(),
            Some(0),
            params,
        );
        assert!(res.is_err());
    }

    #[test]
    fn newer_versions_unsupported() {
        for version in [5u8, 6] {
            let raw = [version, 0, 0, 0, 0, 1];
            assert!(matches!(
                PublicKeyBody::try_from_buf(&mut &raw[..]),
                Err(crate::errors::Error::Unsupported { .. })
            ));
        }
    }

    #[test]
    fn packet_roundtrip() {
        let created = Utc.timestamp_opt(1, 0).unwrap();
        let body =
            PublicKeyBody::new(KeyVersion::V4, PublicKeyAlgorithm::RSA, created, None, rsa_params())
                .unwrap();
        let key = PublicSubkey::new(PacketHeaderVersion::Old, body);
        let raw = key.to_bytes().unwrap();
        let parsed = PublicSubkey::from_slice(*key.packet_header(), raw.into()).unwrap();
        assert_eq!(parsed, key);

        let wrong = PublicKey::from_slice(*key.packet_header(), Bytes::new());
        assert!(wrong.is_err());
    }
}
