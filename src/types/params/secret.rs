use std::io;

use bytes::Buf;

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::Result;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{EncryptedSecretParams, PlainSecretParams};

/// Secret part of a secret key packet, in either of its two states.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SecretParams {
    Plain(PlainSecretParams),
    Encrypted(EncryptedSecretParams),
}

impl SecretParams {
    /// Parses the secret part, starting at the usage octet.
    pub fn try_from_buf<B: Buf>(mut i: B, alg: PublicKeyAlgorithm) -> Result<Self> {
        let id = i.read_u8()?;
        match id {
            0 => {
                let rest = i.rest();
                let params = PlainSecretParams::try_from_slice(&rest, alg)?;
                Ok(SecretParams::Plain(params))
            }
            _ => {
                let params = EncryptedSecretParams::try_from_buf(id, i)?;
                Ok(SecretParams::Encrypted(params))
            }
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, SecretParams::Encrypted(_))
    }

    pub fn string_to_key_id(&self) -> u8 {
        match self {
            SecretParams::Plain(_) => 0,
            SecretParams::Encrypted(k) => k.string_to_key_id(),
        }
    }
}

impl Serialize for SecretParams {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            SecretParams::Plain(k) => {
                writer.write_all(&[0])?;
                k.to_writer(writer)
            }
            SecretParams::Encrypted(k) => k.to_writer(writer),
        }
    }

    fn write_len(&self) -> usize {
        match self {
            SecretParams::Plain(k) => 1 + k.write_len(),
            SecretParams::Encrypted(k) => k.write_len(),
        }
    }
}
