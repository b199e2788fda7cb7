use std::fmt;

use crate::errors::Result;

/// Represents a Key ID.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-12.2>
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct KeyId([u8; 8]);

impl AsRef<[u8]> for KeyId {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; 8]> for KeyId {
    fn from(value: [u8; 8]) -> Self {
        KeyId(value)
    }
}

impl KeyId {
    pub fn from_slice(input: &[u8]) -> Result<KeyId> {
        ensure_eq!(input.len(), 8, "invalid input length");
        let mut r = [0u8; 8];
        r.copy_from_slice(input);

        Ok(KeyId(r))
    }

    /// Parses a key id from its 16 character hex representation.
    pub fn from_hex(input: &str) -> Result<KeyId> {
        let raw = hex::decode(input).map_err(|_| crate::errors::Error::InvalidInput)?;
        Self::from_slice(&raw)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyId({})", hex::encode(self.as_ref()))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn hex_roundtrip() {
        let id = KeyId::from_hex("77FB2DA8A452C337").unwrap();
        assert_eq!(id.to_string(), "77FB2DA8A452C337");
        assert_eq!(format!("{id:?}"), "KeyId(77fb2da8a452c337)");
    }

    #[test]
    fn wrong_length() {
        assert!(KeyId::from_slice(&[1, 2, 3]).is_err());
        assert!(KeyId::from_hex("zz").is_err());
    }
}
