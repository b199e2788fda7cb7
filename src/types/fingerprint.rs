use std::fmt;

use crate::types::KeyId;

/// Represents a key fingerprint.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-12.2>
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub enum Fingerprint {
    /// MD5 over the RSA `n` and `e` bodies.
    V3([u8; 16]),
    /// SHA-1 over the public key packet body.
    V4([u8; 20]),
}

impl Fingerprint {
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V3(f) => &f[..],
            Self::V4(f) => &f[..],
        }
    }

    /// The low 64 bits of a V4 fingerprint. V3 key ids are not derived from the fingerprint.
    pub fn v4_key_id(&self) -> Option<KeyId> {
        match self {
            Self::V3(_) => None,
            Self::V4(f) => {
                let mut id = [0u8; 8];
                id.copy_from_slice(&f[12..]);
                Some(KeyId::from(id))
            }
        }
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(self.as_bytes()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.as_bytes()))
    }
}
