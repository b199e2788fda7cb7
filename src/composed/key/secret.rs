use log::debug;
use rand::{CryptoRng, Rng};

use super::Key;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::packet::Packet;
use crate::types::{KeyDetails, KeyId, Password, PlainSecretParams};

impl Key {
    /// Unlocks the secret material of every secret key packet.
    ///
    /// Either all packets are unlocked or, on error, none of them changes.
    pub fn decrypt(&mut self, pw: &Password) -> Result<()> {
        self.decrypt_selected(pw, |_| true)
    }

    /// Like [`Key::decrypt`], limited to the secret packets with one of the given key ids.
    pub fn decrypt_by_key_ids(&mut self, key_ids: &[KeyId], pw: &Password) -> Result<()> {
        self.decrypt_selected(pw, |key_id| key_ids.contains(key_id))
    }

    fn decrypt_selected<F>(&mut self, pw: &Password, select: F) -> Result<()>
    where
        F: Fn(&KeyId) -> bool,
    {
        // unlock into staged plaintext first, commit only when every packet succeeded
        let mut staged: Vec<(usize, PlainSecretParams)> = Vec::new();
        for (index, packet) in self.packets.iter().enumerate() {
            let plain = match packet {
                Packet::SecretKey(key) if select(&key.key_id()) => key.unlock(pw)?,
                Packet::SecretSubkey(key) if select(&key.key_id()) => key.unlock(pw)?,
                _ => continue,
            };
            staged.push((index, plain));
        }

        if staged.is_empty() {
            return Err(Error::KeyNotFound);
        }
        debug!("unlocked {} secret key packets", staged.len());

        let mut staged = staged.into_iter().peekable();
        for (index, packet) in self.packets.iter_mut().enumerate() {
            let Some((_, plain)) = staged.next_if(|(i, _)| *i == index) else {
                continue;
            };
            match packet {
                Packet::SecretKey(key) => key.set_plain_secret_params(plain),
                Packet::SecretSubkey(key) => key.set_plain_secret_params(plain),
                _ => {}
            }
        }

        Ok(())
    }

    /// Protects all secret key packets under `pw`, using the cipher and string-to-key
    /// settings from `config`.
    ///
    /// Fails if any secret packet is still encrypted, the key is left unchanged then.
    pub fn set_passphrase<R: CryptoRng + Rng>(
        &mut self,
        mut rng: R,
        pw: &Password,
        config: &Config,
    ) -> Result<()> {
        let mut packets = self.packets.clone();
        let mut count = 0;
        for packet in packets.iter_mut() {
            let alg = config.encryption_cipher;
            match packet {
                Packet::SecretKey(key) => {
                    let s2k = config.string_to_key(&mut rng);
                    key.set_password(&mut rng, pw, alg, s2k)?
                }
                Packet::SecretSubkey(key) => {
                    let s2k = config.string_to_key(&mut rng);
                    key.set_password(&mut rng, pw, alg, s2k)?
                }
                _ => continue,
            }
            count += 1;
        }

        if count == 0 {
            return Err(Error::KeyNotFound);
        }
        debug!("protected {} secret key packets", count);

        self.packets = packets;
        Ok(())
    }

    /// Are all secret key packets unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.packets.iter().all(|p| match p {
            Packet::SecretKey(key) => !key.is_encrypted(),
            Packet::SecretSubkey(key) => !key.is_encrypted(),
            _ => true,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::config::ConfigBuilder;
    use crate::crypto::hash::HashAlgorithm;
    use crate::crypto::public_key::PublicKeyAlgorithm;
    use crate::crypto::sym::SymmetricKeyAlgorithm;
    use crate::packet::{PublicKeyBody, SecretKey, SecretSubkey, UserId};
    use crate::types::{KeyVersion, Mpi, PacketHeaderVersion, PublicParams, SecretParams};

    fn plain(seed: u8) -> SecretParams {
        let raw = [0, 8, seed, 0, 1, 1, 0, 1, 1, 0, 1, 1];
        SecretParams::Plain(
            PlainSecretParams::try_from_slice_no_checksum(&raw, PublicKeyAlgorithm::RSA).unwrap(),
        )
    }

    fn body(seed: u8) -> PublicKeyBody {
        PublicKeyBody::new(
            KeyVersion::V4,
            PublicKeyAlgorithm::RSA,
            Utc.timestamp_opt(1_500_000_000, 0).unwrap(),
            None,
            PublicParams::RSA {
                n: Mpi::from_slice(&[0xc5, seed, 0x01]),
                e: Mpi::from_slice(&[1, 0, 1]),
            },
        )
        .unwrap()
    }

    fn plain_key() -> Key {
        let mut key = Key::default();
        key.push(SecretKey::new(PacketHeaderVersion::New, body(1), plain(0x81)));
        key.push(UserId::from_str(PacketHeaderVersion::New, "me").unwrap());
        key.push(SecretSubkey::new(PacketHeaderVersion::New, body(2), plain(0x82)));
        key.push(SecretSubkey::new(PacketHeaderVersion::New, body(3), plain(0x83)));
        key
    }

    fn fast_config() -> Config {
        ConfigBuilder::default()
            .encryption_cipher(SymmetricKeyAlgorithm::AES128)
            .s2k_hash(HashAlgorithm::Sha256)
            .s2k_count(16)
            .build()
            .unwrap()
    }

    fn protected_key(pw: &str) -> Key {
        let mut key = plain_key();
        key.set_passphrase(ChaCha8Rng::seed_from_u64(0), &pw.into(), &fast_config())
            .unwrap();
        key
    }

    #[test]
    fn set_passphrase_then_decrypt() {
        let mut key = protected_key("hunter2");
        assert!(!key.is_unlocked());

        key.decrypt(&"hunter2".into()).unwrap();
        assert!(key.is_unlocked());
        assert_eq!(key, plain_key());
    }

    #[test]
    fn wrong_passphrase_changes_nothing() {
        let mut key = protected_key("hunter2");
        let before = key.clone();

        assert!(matches!(
            key.decrypt(&"wrong".into()),
            Err(Error::DecryptionFailed)
        ));
        assert_eq!(key, before);
    }

    #[test]
    fn mixed_passphrases_are_atomic() {
        // the last subkey is protected under another passphrase
        let other = protected_key("two");
        let mut packets = protected_key("one").into_packets().into_inner();
        let last = other.packets().iter().last().unwrap().clone();
        *packets.last_mut().unwrap() = last;

        let mut key = Key::new(packets.into());
        let before = key.clone();

        assert!(matches!(
            key.decrypt(&"one".into()),
            Err(Error::DecryptionFailed)
        ));
        assert_eq!(key, before);

        // selecting by key id unlocks them one group at a time
        let ids = key.key_ids();
        key.decrypt_by_key_ids(&ids[..2], &"one".into()).unwrap();
        assert!(!key.is_unlocked());
        key.decrypt_by_key_ids(&ids[2..], &"two".into()).unwrap();
        assert!(key.is_unlocked());
        assert_eq!(key, plain_key());
    }

    #[test]
    fn nothing_selected() {
        let mut key = protected_key("pw");
        assert!(matches!(
            key.decrypt_by_key_ids(&[], &"pw".into()),
            Err(Error::KeyNotFound)
        ));

        let mut public = Key::default();
        public.push(UserId::from_str(PacketHeaderVersion::New, "me").unwrap());
        assert!(matches!(
            public.decrypt(&"pw".into()),
            Err(Error::KeyNotFound)
        ));
    }

    #[test]
    fn already_unlocked_counts_as_success() {
        let mut key = plain_key();
        key.decrypt(&Password::empty()).unwrap();
        assert_eq!(key, plain_key());
    }

    #[test]
    fn set_passphrase_twice_fails() {
        let mut key = protected_key("pw");
        let before = key.clone();
        assert!(key
            .set_passphrase(ChaCha8Rng::seed_from_u64(1), &"x".into(), &fast_config())
            .is_err());
        assert_eq!(key, before);
    }
}
