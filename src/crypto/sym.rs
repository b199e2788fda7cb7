use aes::{Aes128, Aes192, Aes256};
use blowfish::Blowfish;
use camellia::{Camellia128, Camellia192, Camellia256};
use cast5::Cast5;
use cfb_mode::{
    cipher::{AsyncStreamCipher, KeyIvInit},
    BufDecryptor, BufEncryptor, Decryptor, Encryptor,
};
use cipher::{BlockCipher, BlockDecrypt, BlockEncryptMut};
use des::TdesEde3;
use idea::Idea;
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};
use rand::{CryptoRng, Rng};
use twofish::Twofish;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Runs `$body` with `$cipher` bound to the block cipher type of `$alg`.
macro_rules! with_cipher {
    ($alg:expr, $cipher:ident => $body:expr) => {
        match $alg {
            SymmetricKeyAlgorithm::IDEA => {
                type $cipher = Idea;
                $body
            }
            SymmetricKeyAlgorithm::TripleDES => {
                type $cipher = TdesEde3;
                $body
            }
            SymmetricKeyAlgorithm::CAST5 => {
                type $cipher = Cast5;
                $body
            }
            SymmetricKeyAlgorithm::Blowfish => {
                type $cipher = Blowfish;
                $body
            }
            SymmetricKeyAlgorithm::AES128 => {
                type $cipher = Aes128;
                $body
            }
            SymmetricKeyAlgorithm::AES192 => {
                type $cipher = Aes192;
                $body
            }
            SymmetricKeyAlgorithm::AES256 => {
                type $cipher = Aes256;
                $body
            }
            SymmetricKeyAlgorithm::Twofish => {
                type $cipher = Twofish;
                $body
            }
            SymmetricKeyAlgorithm::Camellia128 => {
                type $cipher = Camellia128;
                $body
            }
            SymmetricKeyAlgorithm::Camellia192 => {
                type $cipher = Camellia192;
                $body
            }
            SymmetricKeyAlgorithm::Camellia256 => {
                type $cipher = Camellia256;
                $body
            }
            SymmetricKeyAlgorithm::Plaintext => {
                unsupported_err!("'Plaintext' is not a legal cipher for encrypted data")
            }
            SymmetricKeyAlgorithm::Other(id) => {
                unsupported_err!("SymmetricKeyAlgorithm {} is unsupported", id)
            }
        }
    };
}

/// OpenPGP CFB: encrypt the prefix under `iv`, then resync on its last `bs` ciphertext octets.
///
/// <https://datatracker.ietf.org/doc/html/rfc4880.html#section-13.9>
fn encrypt_resync<MODE>(key: &[u8], iv: &[u8], prefix: &mut [u8], data: &mut [u8]) -> Result<()>
where
    MODE: BlockDecrypt + BlockEncryptMut + BlockCipher,
    BufEncryptor<MODE>: KeyIvInit,
{
    let mut mode = BufEncryptor::<MODE>::new_from_slices(key, iv)?;
    mode.encrypt(prefix);

    // resync
    let mut mode = BufEncryptor::<MODE>::new_from_slices(key, &prefix[2..])?;
    mode.encrypt(data);

    Ok(())
}

fn decrypt_resync<MODE>(key: &[u8], iv: &[u8], prefix: &mut [u8], data: &mut [u8]) -> Result<()>
where
    MODE: BlockDecrypt + BlockEncryptMut + BlockCipher,
    BufDecryptor<MODE>: KeyIvInit,
{
    // the resync iv is ciphertext, grab it before it is overwritten
    let resync_iv = prefix[2..].to_vec();

    let mut mode = BufDecryptor::<MODE>::new_from_slices(key, iv)?;
    mode.decrypt(prefix);

    let bs = prefix.len() - 2;
    if prefix[bs - 2..bs] != prefix[bs..] {
        return Err(Error::DecryptionFailed);
    }

    let mut mode = BufDecryptor::<MODE>::new_from_slices(key, &resync_iv)?;
    mode.decrypt(data);

    Ok(())
}

/// Available symmetric key algorithms.
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-9.2>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SymmetricKeyAlgorithm {
    /// Plaintext or unencrypted data
    Plaintext = 0,
    /// IDEA
    IDEA = 1,
    /// Triple-DES
    TripleDES = 2,
    /// CAST5
    CAST5 = 3,
    /// Blowfish
    Blowfish = 4,
    // 5 & 6 are reserved for DES/SK
    /// AES with 128-bit key
    AES128 = 7,
    /// AES with 192-bit key
    AES192 = 8,
    /// AES with 256-bit key
    AES256 = 9,
    /// Twofish with 256-bit key
    Twofish = 10,
    /// [Camellia](https://tools.ietf.org/html/rfc5581#section-3) with 128-bit key
    Camellia128 = 11,
    /// [Camellia](https://tools.ietf.org/html/rfc5581#section-3) with 192-bit key
    Camellia192 = 12,
    /// [Camellia](https://tools.ietf.org/html/rfc5581#section-3) with 256-bit key
    Camellia256 = 13,

    #[num_enum(catch_all)]
    Other(u8),
}

impl Default for SymmetricKeyAlgorithm {
    fn default() -> Self {
        Self::AES256
    }
}

impl zeroize::DefaultIsZeroes for SymmetricKeyAlgorithm {}

impl SymmetricKeyAlgorithm {
    /// The size of a single block in bytes.
    pub fn block_size(self) -> usize {
        match self {
            SymmetricKeyAlgorithm::IDEA
            | SymmetricKeyAlgorithm::TripleDES
            | SymmetricKeyAlgorithm::CAST5
            | SymmetricKeyAlgorithm::Blowfish => 8,
            SymmetricKeyAlgorithm::AES128
            | SymmetricKeyAlgorithm::AES192
            | SymmetricKeyAlgorithm::AES256
            | SymmetricKeyAlgorithm::Twofish
            | SymmetricKeyAlgorithm::Camellia128
            | SymmetricKeyAlgorithm::Camellia192
            | SymmetricKeyAlgorithm::Camellia256 => 16,
            SymmetricKeyAlgorithm::Plaintext | SymmetricKeyAlgorithm::Other(_) => 0,
        }
    }

    /// The size of the key in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            SymmetricKeyAlgorithm::IDEA => 16,
            SymmetricKeyAlgorithm::TripleDES => 24,
            SymmetricKeyAlgorithm::CAST5 => 16,
            SymmetricKeyAlgorithm::Blowfish => 16,
            SymmetricKeyAlgorithm::AES128 => 16,
            SymmetricKeyAlgorithm::AES192 => 24,
            SymmetricKeyAlgorithm::AES256 => 32,
            SymmetricKeyAlgorithm::Twofish => 32,
            SymmetricKeyAlgorithm::Camellia128 => 16,
            SymmetricKeyAlgorithm::Camellia192 => 24,
            SymmetricKeyAlgorithm::Camellia256 => 32,
            SymmetricKeyAlgorithm::Plaintext | SymmetricKeyAlgorithm::Other(_) => 0,
        }
    }

    /// Is this an algorithm we can encrypt and decrypt with.
    pub fn is_supported(self) -> bool {
        self.block_size() > 0
    }

    /// Encrypt `plaintext` in OpenPGP CFB mode.
    ///
    /// A fresh random prefix of `block_size` octets is drawn from `rng`, followed by
    /// the two quick check octets. The result is `block_size + 2 + plaintext.len()` long.
    pub fn encrypt<R: CryptoRng + Rng>(
        self,
        mut rng: R,
        key: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let mut prefix = Zeroizing::new(vec![0u8; self.block_size()]);
        rng.fill_bytes(&mut prefix);

        self.encrypt_with_prefix(key, &prefix, plaintext)
    }

    /// Encrypt with a caller chosen prefix. Only for reproducible vectors.
    pub(crate) fn encrypt_with_prefix(
        self,
        key: &[u8],
        prefix: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        if !self.is_supported() {
            unsupported_err!("cannot encrypt with {:?}", self);
        }
        let bs = self.block_size();
        ensure_eq!(prefix.len(), bs, "prefix must be one block");
        debug!(
            "encrypt {:?}: {} bytes of plaintext",
            self,
            plaintext.len()
        );

        let prefix_len = bs + 2;
        let mut ciphertext = vec![0u8; prefix_len + plaintext.len()];
        ciphertext[..bs].copy_from_slice(prefix);

        // quick check
        ciphertext[bs] = prefix[bs - 2];
        ciphertext[bs + 1] = prefix[bs - 1];

        ciphertext[prefix_len..].copy_from_slice(plaintext);

        let iv = vec![0u8; bs];
        let (prefix, data) = ciphertext.split_at_mut(prefix_len);
        with_cipher!(self, C => encrypt_resync::<C>(key, &iv, prefix, data)?);

        Ok(ciphertext)
    }

    /// Decrypt data produced by [`SymmetricKeyAlgorithm::encrypt`].
    ///
    /// Fails with [`Error::DecryptionFailed`] when the input cannot hold the prefix or
    /// the quick check does not match, which usually means the key is wrong.
    pub fn decrypt(self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if !self.is_supported() {
            unsupported_err!("cannot decrypt with {:?}", self);
        }
        let bs = self.block_size();
        let prefix_len = bs + 2;
        if ciphertext.len() < prefix_len {
            return Err(Error::DecryptionFailed);
        }
        debug!("decrypt {:?}: {} bytes of ciphertext", self, ciphertext.len());

        let mut prefix = Zeroizing::new(ciphertext[..prefix_len].to_vec());
        let mut data = ciphertext[prefix_len..].to_vec();
        let iv = vec![0u8; bs];

        with_cipher!(self, C => decrypt_resync::<C>(key, &iv, &mut prefix, &mut data)?);

        Ok(data)
    }

    /// Decrypt the data using CFB mode, without padding. Overwrites the input.
    /// This is regular CFB, not OpenPGP CFB.
    pub fn decrypt_with_iv_regular(
        self,
        key: &[u8],
        iv: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<()> {
        with_cipher!(self, C => Decryptor::<C>::new_from_slices(key, iv)?.decrypt(ciphertext));
        Ok(())
    }

    /// Encrypt the data using CFB mode, without padding. Overwrites the input.
    pub fn encrypt_with_iv_regular(
        self,
        key: &[u8],
        iv: &[u8],
        plaintext: &mut [u8],
    ) -> Result<()> {
        with_cipher!(self, C => Encryptor::<C>::new_from_slices(key, iv)?.encrypt(plaintext));
        Ok(())
    }

    /// Generate a new random session key.
    pub fn new_session_key<R: Rng + CryptoRng>(self, mut rng: R) -> Zeroizing<Vec<u8>> {
        let mut session_key = Zeroizing::new(vec![0u8; self.key_size()]);
        rng.fill_bytes(&mut session_key);
        session_key
    }
}
