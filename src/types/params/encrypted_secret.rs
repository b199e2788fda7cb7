use std::io;

use byteorder::{BigEndian, ByteOrder};
use bytes::{Buf, Bytes};
use log::debug;
use zeroize::Zeroizing;

use crate::crypto::checksum;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyVersion, PlainSecretParams, StringToKey};

/// Passphrase protected secret key material.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.5.3>
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct EncryptedSecretParams {
    /// The encrypted data, including the encrypted checksum or hash.
    #[debug("{}", hex::encode(data))]
    data: Bytes,
    #[debug("{}", hex::encode(iv))]
    iv: Bytes,
    /// The encryption algorithm used.
    encryption_algorithm: SymmetricKeyAlgorithm,
    /// The string-to-key method and its parameters.
    string_to_key: StringToKey,
    /// The usage octet this was stored with.
    string_to_key_id: u8,
}

impl EncryptedSecretParams {
    pub fn new(
        data: Bytes,
        iv: Bytes,
        alg: SymmetricKeyAlgorithm,
        s2k: StringToKey,
        id: u8,
    ) -> Self {
        debug_assert_ne!(id, 0, "invalid string to key id");
        EncryptedSecretParams {
            data,
            iv,
            encryption_algorithm: alg,
            string_to_key: s2k,
            string_to_key_id: id,
        }
    }

    /// Parses everything after the usage octet `id`.
    pub fn try_from_buf<B: Buf>(id: u8, mut i: B) -> Result<Self> {
        let (encryption_algorithm, string_to_key) = match id {
            0 => bail!("usage octet 0 marks unencrypted material"),
            254 | 255 => {
                let alg = i.read_u8().map(SymmetricKeyAlgorithm::from)?;
                let s2k = StringToKey::try_from_buf(&mut i)?;
                (alg, s2k)
            }
            // legacy: the octet is the cipher, the key is a plain MD5 of the passphrase
            _ => (
                SymmetricKeyAlgorithm::from(id),
                StringToKey::Simple {
                    hash_alg: HashAlgorithm::Md5,
                },
            ),
        };

        if !encryption_algorithm.is_supported() {
            unsupported_err!("secret key protected with {:?}", encryption_algorithm);
        }

        let iv = i.read_take(encryption_algorithm.block_size())?;
        let data = i.rest();

        Ok(EncryptedSecretParams {
            data,
            iv,
            encryption_algorithm,
            string_to_key,
            string_to_key_id: id,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn encryption_algorithm(&self) -> SymmetricKeyAlgorithm {
        self.encryption_algorithm
    }

    pub fn string_to_key(&self) -> &StringToKey {
        &self.string_to_key
    }

    pub fn string_to_key_id(&self) -> u8 {
        self.string_to_key_id
    }

    /// Decrypts the material with `passphrase`.
    ///
    /// Any failure to verify the result is reported as [`Error::DecryptionFailed`].
    pub fn unlock(
        &self,
        passphrase: &[u8],
        alg: PublicKeyAlgorithm,
        version: KeyVersion,
    ) -> Result<PlainSecretParams> {
        if version.is_legacy() {
            // v2/v3 encrypt every MPI separately and keep the checksum in the clear
            unsupported_err!("unlocking {:?} secret keys", version);
        }
        debug!(
            "unlocking secret key: {:?}, usage {}",
            self.encryption_algorithm, self.string_to_key_id
        );

        let key = self
            .string_to_key
            .derive_key(passphrase, self.encryption_algorithm.key_size())?;

        let mut plaintext = Zeroizing::new(self.data.to_vec());
        self.encryption_algorithm
            .decrypt_with_iv_regular(&key, &self.iv, &mut plaintext)?;

        let mpis = if self.string_to_key_id == 254 {
            if plaintext.len() < 20 {
                return Err(Error::DecryptionFailed);
            }
            let (mpis, expected) = plaintext.split_at(plaintext.len() - 20);
            if checksum::calculate_sha1(mpis) != expected {
                return Err(Error::DecryptionFailed);
            }
            mpis
        } else {
            if plaintext.len() < 2 {
                return Err(Error::DecryptionFailed);
            }
            let (mpis, expected) = plaintext.split_at(plaintext.len() - 2);
            if checksum::calculate_simple(mpis) != BigEndian::read_u16(expected) {
                return Err(Error::DecryptionFailed);
            }
            mpis
        };

        PlainSecretParams::try_from_slice_no_checksum(mpis, alg)
            .map_err(|_| Error::DecryptionFailed)
    }
}

impl Serialize for EncryptedSecretParams {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.string_to_key_id])?;

        if matches!(self.string_to_key_id, 254 | 255) {
            writer.write_all(&[self.encryption_algorithm.into()])?;
            self.string_to_key.to_writer(writer)?;
        }

        writer.write_all(&self.iv)?;
        writer.write_all(&self.data)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        let mut sum = 1;
        if matches!(self.string_to_key_id, 254 | 255) {
            sum += 1 + self.string_to_key.write_len();
        }
        sum + self.iv.len() + self.data.len()
    }
}
