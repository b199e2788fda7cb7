//! A transferable key held as one owned packet sequence.

use log::warn;

use crate::crypto::hash::HashAlgorithm;
use crate::config::Config;
use crate::errors::Result;
use crate::packet::{Packet, PacketList, UserId};
use crate::types::{KeyId, KeyRole, Tag};

mod public;
mod secret;

const PRIMARY_TAGS: [Tag; 2] = [Tag::PublicKey, Tag::SecretKey];
const SUBKEY_TAGS: [Tag; 2] = [Tag::PublicSubkey, Tag::SecretSubkey];

/// A key with its subkeys, user ids and signatures.
///
/// Selection methods borrow from the owned packets. Signatures are carried but not verified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Key {
    packets: PacketList,
}

impl Key {
    pub fn new(packets: PacketList) -> Self {
        Key { packets }
    }

    pub fn packets(&self) -> &PacketList {
        &self.packets
    }

    pub fn into_packets(self) -> PacketList {
        self.packets
    }

    /// Appends a packet, for assembling a key.
    pub fn push(&mut self, packet: impl Into<Packet>) {
        self.packets.push(packet);
    }

    /// The first public or secret key packet.
    pub fn primary_key_packet(&self) -> Option<&Packet> {
        self.packets
            .iter()
            .find(|p| PRIMARY_TAGS.contains(&p.tag()))
    }

    /// All public and secret subkey packets, in stream order.
    pub fn subkey_packets(&self) -> Vec<&Packet> {
        self.packets.filter_by_tag(&SUBKEY_TAGS)
    }

    /// The primary key packet followed by the subkey packets.
    pub fn all_key_packets(&self) -> Vec<&Packet> {
        let subkeys = self.subkey_packets();
        match self.primary_key_packet() {
            Some(primary) => std::iter::once(primary).chain(subkeys).collect(),
            None => {
                warn!("key without primary key packet");
                subkeys
            }
        }
    }

    pub fn key_ids(&self) -> Vec<KeyId> {
        self.all_key_packets()
            .into_iter()
            .filter_map(Packet::key_details)
            .map(|k| k.key_id())
            .collect()
    }

    /// The first packet of the given role whose key id is one of `key_ids`.
    pub fn find_by_key_ids(&self, key_ids: &[KeyId], role: KeyRole) -> Option<&Packet> {
        self.packets
            .filter_by_tag(&role_tags(role))
            .into_iter()
            .find(|p| {
                p.key_details()
                    .is_some_and(|k| key_ids.contains(&k.key_id()))
            })
    }

    /// Is there a public primary key packet.
    pub fn is_public(&self) -> bool {
        !self.packets.filter_by_tag(&[Tag::PublicKey]).is_empty()
    }

    /// Is there a secret primary key packet.
    pub fn is_private(&self) -> bool {
        !self.packets.filter_by_tag(&[Tag::SecretKey]).is_empty()
    }

    /// The first key packet able to make signatures, primary first.
    pub fn signing_key_packet(&self) -> Option<&Packet> {
        self.all_key_packets().into_iter().find(|p| {
            p.key_details()
                .is_some_and(|k| k.algorithm().can_sign())
        })
    }

    /// The first key packet usable for encryption, subkeys first.
    ///
    /// Only the algorithm is checked, binding signatures and flags are not.
    pub fn encryption_key_packet(&self) -> Option<&Packet> {
        let can_encrypt =
            |p: &&Packet| p.key_details().is_some_and(|k| !k.algorithm().is_sign_only());

        self.subkey_packets()
            .into_iter()
            .find(can_encrypt)
            .or_else(|| self.primary_key_packet().filter(can_encrypt))
    }

    pub fn user_ids(&self) -> Vec<&UserId> {
        self.packets
            .iter()
            .filter_map(|p| match p {
                Packet::UserId(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Hash algorithm for signatures made with this key.
    pub fn preferred_signature_hash_algorithm(&self, config: &Config) -> HashAlgorithm {
        config.prefer_hash_algorithm
    }

    pub fn verify(&self) -> Result<()> {
        unimplemented_err!("key verification");
    }

    pub fn revoke(&mut self) -> Result<()> {
        unimplemented_err!("key revocation");
    }
}

fn role_tags(role: KeyRole) -> [Tag; 2] {
    match role {
        KeyRole::Public => [Tag::PublicKey, Tag::PublicSubkey],
        KeyRole::Private => [Tag::SecretKey, Tag::SecretSubkey],
    }
}

impl From<PacketList> for Key {
    fn from(packets: PacketList) -> Self {
        Key::new(packets)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::crypto::public_key::PublicKeyAlgorithm;
    use crate::errors::Error;
    use crate::packet::{PublicKey, PublicKeyBody, PublicSubkey, SecretKey, SecretSubkey};
    use crate::types::{
        KeyVersion, Mpi, PacketHeaderVersion, PlainSecretParams, PublicParams, SecretParams,
    };

    fn body(alg: PublicKeyAlgorithm, seed: u8) -> PublicKeyBody {
        let params = match alg {
            PublicKeyAlgorithm::DSA => PublicParams::DSA {
                p: Mpi::from_slice(&[23, seed]),
                q: Mpi::from_slice(&[11]),
                g: Mpi::from_slice(&[4]),
                y: Mpi::from_slice(&[8]),
            },
            _ => PublicParams::RSA {
                n: Mpi::from_slice(&[0xc5, seed, 0x01]),
                e: Mpi::from_slice(&[1, 0, 1]),
            },
        };
        PublicKeyBody::new(
            KeyVersion::V4,
            alg,
            Utc.timestamp_opt(1_500_000_000, 0).unwrap(),
            None,
            params,
        )
        .unwrap()
    }

    fn rsa_secret() -> SecretParams {
        let raw = [0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1];
        SecretParams::Plain(
            PlainSecretParams::try_from_slice_no_checksum(&raw, PublicKeyAlgorithm::RSA).unwrap(),
        )
    }

    fn secret_key(primary: PublicKeyAlgorithm, subkey: PublicKeyAlgorithm) -> Key {
        let mut key = Key::default();
        key.push(SecretKey::new(
            PacketHeaderVersion::New,
            body(primary, 1),
            rsa_secret(),
        ));
        key.push(UserId::from_str(PacketHeaderVersion::New, "me").unwrap());
        key.push(SecretSubkey::new(
            PacketHeaderVersion::New,
            body(subkey, 2),
            rsa_secret(),
        ));
        key
    }

    #[test]
    fn rsa_sign_primary_with_rsa_subkey() {
        let key = secret_key(PublicKeyAlgorithm::RSASign, PublicKeyAlgorithm::RSA);

        let primary = key.primary_key_packet().unwrap();
        let subkey = key.subkey_packets()[0];
        assert_eq!(key.signing_key_packet(), Some(primary));
        assert_eq!(key.encryption_key_packet(), Some(subkey));
        assert_eq!(key.all_key_packets(), vec![primary, subkey]);
        assert_eq!(key.user_ids()[0].id(), b"me");
    }

    #[test]
    fn dsa_only_cannot_encrypt() {
        let mut key = Key::default();
        key.push(PublicKey::new(
            PacketHeaderVersion::New,
            body(PublicKeyAlgorithm::DSA, 1),
        ));
        assert!(key.encryption_key_packet().is_none());
        assert_eq!(key.signing_key_packet(), key.primary_key_packet());
    }

    #[test]
    fn encryption_falls_back_to_primary() {
        let mut key = Key::default();
        key.push(PublicKey::new(
            PacketHeaderVersion::New,
            body(PublicKeyAlgorithm::RSA, 1),
        ));
        key.push(PublicSubkey::new(
            PacketHeaderVersion::New,
            body(PublicKeyAlgorithm::DSA, 2),
        ));
        assert_eq!(key.encryption_key_packet(), key.primary_key_packet());
    }

    #[test]
    fn find_by_key_ids_respects_role() {
        let key = secret_key(PublicKeyAlgorithm::RSA, PublicKeyAlgorithm::RSA);
        let ids = key.key_ids();
        assert_eq!(ids.len(), 2);

        assert!(key.find_by_key_ids(&[], KeyRole::Private).is_none());
        assert!(key.find_by_key_ids(&ids, KeyRole::Public).is_none());

        let found = key.find_by_key_ids(&ids[1..], KeyRole::Private).unwrap();
        assert_eq!(found.tag(), Tag::SecretSubkey);
        assert_eq!(found.key_details().unwrap().key_id(), ids[1]);

        // first match in stream order wins
        let found = key
            .find_by_key_ids(&[ids[1], ids[0]], KeyRole::Private)
            .unwrap();
        assert_eq!(found.tag(), Tag::SecretKey);
    }

    #[test]
    fn missing_primary() {
        let mut key = Key::default();
        key.push(PublicSubkey::new(
            PacketHeaderVersion::New,
            body(PublicKeyAlgorithm::RSA, 2),
        ));
        assert!(key.primary_key_packet().is_none());
        assert_eq!(key.all_key_packets().len(), 1);
        assert!(!key.is_public());
        assert!(!key.is_private());
    }

    #[test]
    fn verify_and_revoke_are_unimplemented() {
        let mut key = secret_key(PublicKeyAlgorithm::RSA, PublicKeyAlgorithm::RSA);
        assert!(matches!(key.verify(), Err(Error::Unimplemented { .. })));
        assert!(matches!(key.revoke(), Err(Error::Unimplemented { .. })));
    }

    #[test]
    fn preferred_hash_comes_from_config() {
        let key = Key::default();
        let config = crate::config::ConfigBuilder::default()
            .prefer_hash_algorithm(HashAlgorithm::Sha384)
            .build()
            .unwrap();
        assert_eq!(
            key.preferred_signature_hash_algorithm(&config),
            HashAlgorithm::Sha384
        );
    }
}
