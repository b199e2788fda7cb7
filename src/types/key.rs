use num_enum::{FromPrimitive, IntoPrimitive};

/// Version of a key packet.
///
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-5.5.2>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum KeyVersion {
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
    V6 = 6,

    #[num_enum(catch_all)]
    Other(u8),
}

impl Default for KeyVersion {
    fn default() -> Self {
        Self::V4
    }
}

impl KeyVersion {
    /// Legacy RSA only key formats, identified by the low bits of the modulus.
    pub fn is_legacy(self) -> bool {
        matches!(self, KeyVersion::V2 | KeyVersion::V3)
    }
}

/// Which side of a key pair a lookup is interested in.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum KeyRole {
    /// Public key and public subkey packets.
    Public,
    /// Secret key and secret subkey packets.
    Private,
}
