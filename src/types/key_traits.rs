use chrono::{DateTime, Utc};

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::types::{Fingerprint, KeyId, KeyVersion, PublicParams};

/// Metadata shared by public and secret key packets.
pub trait KeyDetails: std::fmt::Debug {
    /// Returns the [`KeyVersion`] of this key.
    fn version(&self) -> KeyVersion;

    /// Returns the [`KeyId`] for this key.
    fn key_id(&self) -> KeyId;

    /// Returns the [`Fingerprint`] for this key.
    fn fingerprint(&self) -> Fingerprint;

    /// Returns the algorithm for this key.
    fn algorithm(&self) -> PublicKeyAlgorithm;

    fn created_at(&self) -> &DateTime<Utc>;

    /// Expiration in days after key creation (only present on v2 and v3 keys).
    fn expiration(&self) -> Option<u16>;

    /// Returns the parameters for the public portion of this key.
    fn public_params(&self) -> &PublicParams;
}

impl<T: KeyDetails> KeyDetails for &T {
    fn version(&self) -> KeyVersion {
        (*self).version()
    }

    fn key_id(&self) -> KeyId {
        (*self).key_id()
    }

    fn fingerprint(&self) -> Fingerprint {
        (*self).fingerprint()
    }

    fn algorithm(&self) -> PublicKeyAlgorithm {
        (*self).algorithm()
    }

    fn created_at(&self) -> &DateTime<Utc> {
        (*self).created_at()
    }

    fn expiration(&self) -> Option<u16> {
        (*self).expiration()
    }

    fn public_params(&self) -> &PublicParams {
        (*self).public_params()
    }
}
