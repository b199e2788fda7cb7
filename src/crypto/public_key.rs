use num_enum::{FromPrimitive, IntoPrimitive};

/// Available public key algorithms.
/// Ref: <https://datatracker.ietf.org/doc/html/rfc4880#section-9.1>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt and Sign)
    RSA = 1,
    /// DEPRECATED: RSA (Encrypt-Only)
    RSAEncrypt = 2,
    /// DEPRECATED: RSA (Sign-Only)
    RSASign = 3,
    /// Elgamal (Encrypt-Only)
    Elgamal = 16,
    /// DSA (Digital Signature Algorithm)
    DSA = 17,
    /// Elliptic Curve: RFC-6637
    ECDH = 18,
    /// ECDSA: RFC-6637
    ECDSA = 19,
    /// DEPRECATED: Elgamal (Encrypt and Sign)
    ElgamalSign = 20,
    /// Reserved for Diffie-Hellman (X9.42, as defined for IETF-S/MIME)
    DiffieHellman = 21,
    /// EdDSA legacy format
    EdDSALegacy = 22,

    #[num_enum(catch_all)]
    Unknown(u8),
}

impl PublicKeyAlgorithm {
    /// Algorithms accepted when picking a signing key.
    pub fn can_sign(self) -> bool {
        matches!(
            self,
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSASign | PublicKeyAlgorithm::DSA
        )
    }

    /// Algorithms rejected when picking an encryption key.
    pub fn is_sign_only(self) -> bool {
        matches!(self, PublicKeyAlgorithm::DSA | PublicKeyAlgorithm::RSASign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_set() {
        assert!(PublicKeyAlgorithm::RSA.can_sign());
        assert!(PublicKeyAlgorithm::RSASign.can_sign());
        assert!(PublicKeyAlgorithm::DSA.can_sign());
        assert!(!PublicKeyAlgorithm::RSAEncrypt.can_sign());
        assert!(!PublicKeyAlgorithm::Elgamal.can_sign());
    }

    #[test]
    fn encryption_exclusions() {
        assert!(PublicKeyAlgorithm::DSA.is_sign_only());
        assert!(PublicKeyAlgorithm::RSASign.is_sign_only());
        assert!(!PublicKeyAlgorithm::RSA.is_sign_only());
        assert!(!PublicKeyAlgorithm::Elgamal.is_sign_only());
        assert_eq!(PublicKeyAlgorithm::from(3), PublicKeyAlgorithm::RSASign);
    }
}
