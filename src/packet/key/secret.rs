use std::io;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::debug;
use rand::{CryptoRng, Rng};

use super::public::key_header;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::Result;
use crate::packet::{PacketHeader, PacketTrait, PublicKey, PublicKeyBody, PublicSubkey};
use crate::ser::Serialize;
use crate::types::{
    Fingerprint, KeyDetails, KeyId, KeyVersion, PacketHeaderVersion, Password, PlainSecretParams,
    PublicParams, SecretParams, StringToKey, Tag,
};

macro_rules! impl_secret_key {
    ($(#[$doc:meta])* $name:ident, $tag:expr, $public:ident) => {
        $(#[$doc])*
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub struct $name {
            packet_header: PacketHeader,
            body: PublicKeyBody,
            secret_params: SecretParams,
        }

        impl $name {
            pub fn new(
                version: PacketHeaderVersion,
                body: PublicKeyBody,
                secret_params: SecretParams,
            ) -> Self {
                let packet_header = key_header(
                    version,
                    $tag,
                    body.write_len() + secret_params.write_len(),
                );
                Self {
                    packet_header,
                    body,
                    secret_params,
                }
            }

            /// Parses a packet body.
            pub fn from_slice(packet_header: PacketHeader, mut input: Bytes) -> Result<Self> {
                ensure_eq!(packet_header.tag(), $tag, "invalid packet tag");
                let body = PublicKeyBody::try_from_buf(&mut input)?;
                if !body.public_params().is_known() {
                    unsupported_err!("secret key material for {:?}", body.algorithm());
                }
                let secret_params = SecretParams::try_from_buf(input, body.algorithm())?;

                Ok(Self {
                    packet_header,
                    body,
                    secret_params,
                })
            }

            pub fn body(&self) -> &PublicKeyBody {
                &self.body
            }

            pub fn secret_params(&self) -> &SecretParams {
                &self.secret_params
            }

            pub fn is_encrypted(&self) -> bool {
                self.secret_params.is_encrypted()
            }

            /// The public counterpart, in the same header format.
            pub fn public_key(&self) -> $public {
                $public::new(self.packet_header.version(), self.body.clone())
            }

            /// Decrypts the secret material without changing this packet.
            pub fn unlock(&self, pw: &Password) -> Result<PlainSecretParams> {
                match &self.secret_params {
                    SecretParams::Plain(params) => Ok(params.clone()),
                    SecretParams::Encrypted(params) => {
                        params.unlock(&pw.read(), self.body.algorithm(), self.body.version())
                    }
                }
            }

            /// Replaces the secret material with `params`, which must belong to this key.
            pub fn set_plain_secret_params(&mut self, params: PlainSecretParams) {
                self.replace_secret_params(SecretParams::Plain(params));
            }

            /// Decrypts the secret material in place.
            pub fn remove_password(&mut self, pw: &Password) -> Result<()> {
                let plain = self.unlock(pw)?;
                self.set_plain_secret_params(plain);
                Ok(())
            }

            /// Protects plain secret material under `pw`.
            pub fn set_password<R: CryptoRng + Rng>(
                &mut self,
                rng: R,
                pw: &Password,
                alg: SymmetricKeyAlgorithm,
                s2k: StringToKey,
            ) -> Result<()> {
                let SecretParams::Plain(plain) = &self.secret_params else {
                    bail!("secret key material is already encrypted");
                };
                debug!("protecting {:?} with {:?}", self.body.key_id(), alg);

                let encrypted = plain.encrypt(rng, &pw.read(), alg, s2k)?;
                self.replace_secret_params(SecretParams::Encrypted(encrypted));
                Ok(())
            }

            fn replace_secret_params(&mut self, secret_params: SecretParams) {
                self.secret_params = secret_params;
                self.packet_header = key_header(
                    self.packet_header.version(),
                    $tag,
                    self.write_len(),
                );
            }
        }

        impl Serialize for $name {
            fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
                self.body.to_writer(writer)?;
                self.secret_params.to_writer(writer)?;
                Ok(())
            }

            fn write_len(&self) -> usize {
                self.body.write_len() + self.secret_params.write_len()
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

impl_secret_key!(
    /// Secret-Key Packet
    /// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.5.3>
    SecretKey,
    Tag::SecretKey,
    PublicKey
);
impl_secret_key!(
    /// Secret-Subkey Packet
    SecretSubkey,
    Tag::SecretSubkey,
    PublicSubkey
);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use hex_literal::hex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::crypto::hash::HashAlgorithm;
    use crate::errors::Error;
    use crate::types::Mpi;

    fn dsa_key() -> SecretSubkey {
        let body = PublicKeyBody::new(
            KeyVersion::V4,
            PublicKeyAlgorithm::DSA,
            Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            None,
            PublicParams::DSA {
                p: Mpi::from_slice(&[23]),
                q: Mpi::from_slice(&[11]),
                g: Mpi::from_slice(&[4]),
                y: Mpi::from_slice(&[8]),
            },
        )
        .unwrap();
        let plain =
            PlainSecretParams::try_from_slice_no_checksum(&hex!("0003 05"), PublicKeyAlgorithm::DSA)
                .unwrap();

        SecretSubkey::new(PacketHeaderVersion::New, body, SecretParams::Plain(plain))
    }

    fn s2k() -> StringToKey {
        StringToKey::IteratedAndSalted {
            hash_alg: HashAlgorithm::Sha256,
            salt: [1; 8],
            count: 96,
        }
    }

    #[test]
    fn parse_plain() {
        let key = dsa_key();
        let raw = key.to_bytes().unwrap();
        let parsed = SecretSubkey::from_slice(*key.packet_header(), raw.into()).unwrap();
        assert_eq!(parsed, key);
        assert!(!parsed.is_encrypted());
    }

    #[test]
    fn password_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let original = dsa_key();
        let mut key = original.clone();

        key.set_password(
            &mut rng,
            &"secret".into(),
            SymmetricKeyAlgorithm::AES128,
            s2k(),
        )
        .unwrap();
        assert!(key.is_encrypted());
        assert_eq!(
            key.packet_header().packet_length().maybe_len(),
            Some(key.write_len() as u32)
        );
        // the public part is untouched
        assert_eq!(key.key_id(), original.key_id());

        // reparse the protected form
        let raw = key.to_bytes().unwrap();
        let mut key = SecretSubkey::from_slice(*key.packet_header(), raw.into()).unwrap();

        assert!(matches!(
            key.remove_password(&"wrong".into()),
            Err(Error::DecryptionFailed)
        ));
        assert!(key.is_encrypted());

        key.remove_password(&"secret".into()).unwrap();
        assert_eq!(key, original);
    }

    #[test]
    fn set_password_twice() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut key = dsa_key();
        let pw = Password::from("pw");
        key.set_password(&mut rng, &pw, SymmetricKeyAlgorithm::AES128, s2k())
            .unwrap();
        assert!(key
            .set_password(&mut rng, &pw, SymmetricKeyAlgorithm::AES128, s2k())
            .is_err());
    }

    #[test]
    fn public_key_keeps_ids() {
        let key = dsa_key();
        let public = key.public_key();
        assert_eq!(public.tag(), Tag::PublicSubkey);
        assert_eq!(public.fingerprint(), key.fingerprint());
        assert_eq!(public.body(), key.body());
    }
}
