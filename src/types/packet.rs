use num_enum::{FromPrimitive, IntoPrimitive};

/// Represents the packet length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketLength {
    Fixed(u32),
    Indeterminate,
    Partial(u32),
}

impl PacketLength {
    /// Returns how many bytes encoding the given length as fixed encoding would need.
    pub fn fixed_encoding_len(len: u32) -> usize {
        if len < 192 {
            1
        } else if len < 8384 {
            2
        } else {
            1 + 4
        }
    }

    /// Returns the length in bytes, if it is specified.
    pub fn maybe_len(&self) -> Option<u32> {
        match self {
            Self::Fixed(len) => Some(*len),
            Self::Indeterminate => None,
            Self::Partial(len) => Some(*len),
        }
    }
}

/// Packet tag, see <https://datatracker.ietf.org/doc/html/rfc4880#section-4.3>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Tag {
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey = 1,
    /// Signature Packet
    Signature = 2,
    /// Symmetric-Key Encrypted Session Key Packet
    SymKeyEncryptedSessionKey = 3,
    /// One-Pass Signature Packet
    OnePassSignature = 4,
    /// Secret-Key Packet
    SecretKey = 5,
    /// Public-Key Packet
    PublicKey = 6,
    /// Secret-Subkey Packet
    SecretSubkey = 7,
    /// Compressed Data Packet
    CompressedData = 8,
    /// Symmetrically Encrypted Data Packet
    SymEncryptedData = 9,
    /// Marker Packet
    Marker = 10,
    /// Literal Data Packet
    LiteralData = 11,
    /// Trust Packet
    Trust = 12,
    /// User ID Packet
    UserId = 13,
    /// Public-Subkey Packet
    PublicSubkey = 14,
    /// User Attribute Packet
    UserAttribute = 17,
    /// Sym. Encrypted and Integrity Protected Data Packet
    SymEncryptedProtectedData = 18,
    /// Modification Detection Code Packet
    ModDetectionCode = 19,

    #[num_enum(catch_all)]
    Other(u8),
}

impl Tag {
    /// Is this one of the four key packet tags.
    pub fn is_key(self) -> bool {
        matches!(
            self,
            Tag::PublicKey | Tag::PublicSubkey | Tag::SecretKey | Tag::SecretSubkey
        )
    }
}

/// The version of the packet format.
///
/// There are two packet formats, see <https://datatracker.ietf.org/doc/html/rfc4880#section-4.2>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum PacketHeaderVersion {
    /// Old Packet Format
    Old,
    /// New Packet Format
    #[default]
    New,
}
