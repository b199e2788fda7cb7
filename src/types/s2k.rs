use std::io;

use bytes::Buf;
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;

const EXPBIAS: u32 = 6;

/// String-To-Key specifier, turning a passphrase into a symmetric key.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-3.7>
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub enum StringToKey {
    Simple {
        hash_alg: HashAlgorithm,
    },
    Salted {
        hash_alg: HashAlgorithm,
        #[debug("{}", hex::encode(salt))]
        salt: [u8; 8],
    },
    IteratedAndSalted {
        hash_alg: HashAlgorithm,
        #[debug("{}", hex::encode(salt))]
        salt: [u8; 8],
        /// Coded count, see [`StringToKey::count`].
        count: u8,
    },
}

impl StringToKey {
    /// Iterated and salted with a fresh random salt.
    pub fn new_iterated<R: CryptoRng + Rng>(mut rng: R, hash_alg: HashAlgorithm, count: u8) -> Self {
        let mut salt = [0u8; 8];
        rng.fill(&mut salt);

        StringToKey::IteratedAndSalted {
            hash_alg,
            salt,
            count,
        }
    }

    /// Parses a specifier, starting at its type octet.
    pub fn try_from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let typ = i.read_u8()?;
        let s2k = match typ {
            0 => {
                let hash_alg = i.read_u8().map(HashAlgorithm::from)?;
                StringToKey::Simple { hash_alg }
            }
            1 => {
                let hash_alg = i.read_u8().map(HashAlgorithm::from)?;
                let salt = i.read_array::<8>()?;
                StringToKey::Salted { hash_alg, salt }
            }
            3 => {
                let hash_alg = i.read_u8().map(HashAlgorithm::from)?;
                let salt = i.read_array::<8>()?;
                let count = i.read_u8()?;
                StringToKey::IteratedAndSalted {
                    hash_alg,
                    salt,
                    count,
                }
            }
            _ => unsupported_err!("string to key type {}", typ),
        };

        Ok(s2k)
    }

    pub fn hash_alg(&self) -> HashAlgorithm {
        match self {
            StringToKey::Simple { hash_alg }
            | StringToKey::Salted { hash_alg, .. }
            | StringToKey::IteratedAndSalted { hash_alg, .. } => *hash_alg,
        }
    }

    /// Decodes the coded count into the number of octets to hash.
    /// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-3.7.1.3>
    pub fn count(&self) -> Option<usize> {
        match self {
            StringToKey::IteratedAndSalted { count, .. } => Some(decode_count(*count)),
            _ => None,
        }
    }

    fn type_id(&self) -> u8 {
        match self {
            StringToKey::Simple { .. } => 0,
            StringToKey::Salted { .. } => 1,
            StringToKey::IteratedAndSalted { .. } => 3,
        }
    }

    /// Derives a key of `key_size` octets from `passphrase`.
    ///
    /// If the digest is shorter than the key, additional hash contexts are run, each
    /// preloaded with one more zero octet than the last.
    pub fn derive_key(&self, passphrase: &[u8], key_size: usize) -> Result<Zeroizing<Vec<u8>>> {
        let hash_alg = self.hash_alg();
        let Some(digest_size) = hash_alg.digest_size() else {
            unsupported_err!("string to key with hash {:?}", hash_alg);
        };

        let rounds = key_size.div_ceil(digest_size);
        let mut key = Zeroizing::new(Vec::with_capacity(rounds * digest_size));
        let zeros = vec![0u8; rounds];

        for round in 0..rounds {
            let mut hasher = hash_alg.new_hasher()?;
            hasher.update(&zeros[..round]);

            match self {
                StringToKey::Simple { .. } => {
                    hasher.update(passphrase);
                }
                StringToKey::Salted { salt, .. } => {
                    hasher.update(salt);
                    hasher.update(passphrase);
                }
                StringToKey::IteratedAndSalted { salt, count, .. } => {
                    let data_len = salt.len() + passphrase.len();
                    // the whole of salt and passphrase is hashed at least once
                    let total = decode_count(*count).max(data_len);
                    let full = total / data_len;
                    let tail = total % data_len;

                    for _ in 0..full {
                        hasher.update(salt);
                        hasher.update(passphrase);
                    }

                    if tail > salt.len() {
                        hasher.update(salt);
                        hasher.update(&passphrase[..tail - salt.len()]);
                    } else {
                        hasher.update(&salt[..tail]);
                    }
                }
            }

            let digest = Zeroizing::new(hasher.finalize());
            key.extend_from_slice(&digest);
        }

        key.truncate(key_size);

        Ok(key)
    }
}

fn decode_count(c: u8) -> usize {
    ((16u32 + u32::from(c & 15)) << (u32::from(c >> 4) + EXPBIAS)) as usize
}

impl Serialize for StringToKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.type_id(), self.hash_alg().into()])?;

        match self {
            StringToKey::Simple { .. } => {}
            StringToKey::Salted { salt, .. } => {
                writer.write_all(salt)?;
            }
            StringToKey::IteratedAndSalted { salt, count, .. } => {
                writer.write_all(salt)?;
                writer.write_all(&[*count])?;
            }
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            StringToKey::Simple { .. } => 2,
            StringToKey::Salted { .. } => 2 + 8,
            StringToKey::IteratedAndSalted { .. } => 2 + 8 + 1,
        }
    }
}
