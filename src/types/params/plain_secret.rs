use std::io;

use byteorder::{BigEndian, ByteOrder};
use bytes::Buf;
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::crypto::checksum;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{EncryptedSecretParams, StringToKey};

/// Unencrypted secret key material.
///
/// Holds the MPIs exactly as they appear on the wire (length prefixes included),
/// wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct PlainSecretParams {
    #[debug("***")]
    data: Zeroizing<Vec<u8>>,
}

/// Number of secret MPIs following the public part of a key.
fn secret_mpi_count(alg: PublicKeyAlgorithm) -> Result<usize> {
    match alg {
        // d, p, q, u
        PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign => {
            Ok(4)
        }
        PublicKeyAlgorithm::DSA
        | PublicKeyAlgorithm::Elgamal
        | PublicKeyAlgorithm::ElgamalSign
        | PublicKeyAlgorithm::ECDSA
        | PublicKeyAlgorithm::ECDH
        | PublicKeyAlgorithm::EdDSALegacy => Ok(1),
        _ => unsupported_err!("secret key material for {:?}", alg),
    }
}

/// Walks `count` MPIs without copying them and returns how many octets they span.
fn mpi_section_len(i: &[u8], count: usize) -> Result<usize> {
    let mut rest = i;
    for _ in 0..count {
        let bits = rest.read_be_u16()?;
        let len = usize::from(bits).div_ceil(8);
        ensure!(rest.len() >= len, "secret mpi too short");
        rest.advance(len);
    }

    Ok(i.len() - rest.len())
}

impl PlainSecretParams {
    /// Parses MPIs followed by their two octet checksum.
    pub fn try_from_slice(i: &[u8], alg: PublicKeyAlgorithm) -> Result<Self> {
        let len = mpi_section_len(i, secret_mpi_count(alg)?)?;
        let (mpis, rest) = i.split_at(len);
        ensure_eq!(rest.len(), 2, "expected a two octet checksum");
        ensure_eq!(
            BigEndian::read_u16(rest),
            checksum::calculate_simple(mpis),
            "invalid secret key checksum"
        );

        Ok(Self {
            data: Zeroizing::new(mpis.to_vec()),
        })
    }

    /// Parses MPIs whose integrity was already checked, the input must hold nothing else.
    pub fn try_from_slice_no_checksum(i: &[u8], alg: PublicKeyAlgorithm) -> Result<Self> {
        let len = mpi_section_len(i, secret_mpi_count(alg)?)?;
        ensure_eq!(len, i.len(), "failed to process full secret key material");

        Ok(Self {
            data: Zeroizing::new(i.to_vec()),
        })
    }

    /// The raw MPIs.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn checksum_simple(&self) -> u16 {
        checksum::calculate_simple(&self.data)
    }

    /// Protects the material under `passphrase`, using usage octet 254 (SHA-1 integrity).
    pub fn encrypt<R: CryptoRng + Rng>(
        &self,
        mut rng: R,
        passphrase: &[u8],
        alg: SymmetricKeyAlgorithm,
        s2k: StringToKey,
    ) -> Result<EncryptedSecretParams> {
        if !alg.is_supported() {
            unsupported_err!("protecting secret keys with {:?}", alg);
        }
        let key = s2k.derive_key(passphrase, alg.key_size())?;

        let mut iv = vec![0u8; alg.block_size()];
        rng.fill_bytes(&mut iv);

        let mut data = Zeroizing::new(Vec::with_capacity(self.data.len() + 20));
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&checksum::calculate_sha1(&self.data));
        alg.encrypt_with_iv_regular(&key, &iv, &mut data)?;

        Ok(EncryptedSecretParams::new(
            data.to_vec().into(),
            iv.into(),
            alg,
            s2k,
            254,
        ))
    }
}

impl Serialize for PlainSecretParams {
    /// Writes the MPIs and their checksum, without the usage octet.
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.data)?;
        writer.write_all(&self.checksum_simple().to_be_bytes())?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.data.len() + 2
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;

    #[test]
    fn dsa_with_checksum() {
        let raw = hex!("0008 ff 0107");
        let params = PlainSecretParams::try_from_slice(&raw, PublicKeyAlgorithm::DSA).unwrap();
        assert_eq!(params.as_bytes(), &hex!("0008ff"));
        assert_eq!(params.to_bytes().unwrap(), raw.to_vec());
    }

    #[test]
    fn bad_checksum() {
        let raw = hex!("0008 ff 0000");
        assert!(PlainSecretParams::try_from_slice(&raw, PublicKeyAlgorithm::DSA).is_err());
    }

    #[test]
    fn rsa_needs_four_mpis() {
        let raw = hex!("0001 01 0001 01 0001 01");
        assert!(
            PlainSecretParams::try_from_slice_no_checksum(&raw, PublicKeyAlgorithm::RSA).is_err()
        );
        let raw = hex!("0001 01 0001 01 0001 01 0001 01");
        assert!(
            PlainSecretParams::try_from_slice_no_checksum(&raw, PublicKeyAlgorithm::RSA).is_ok()
        );
    }

    #[test]
    fn trailing_garbage() {
        let raw = hex!("0001 01 ff");
        assert!(
            PlainSecretParams::try_from_slice_no_checksum(&raw, PublicKeyAlgorithm::ECDH).is_err()
        );
    }

    #[test]
    fn debug_hides_material() {
        let params =
            PlainSecretParams::try_from_slice_no_checksum(&hex!("0001 01"), PublicKeyAlgorithm::DSA)
                .unwrap();
        assert!(!format!("{params:?}").contains("0001"));
    }
}
