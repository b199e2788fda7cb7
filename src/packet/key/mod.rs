mod public;
mod secret;

pub use self::public::{PublicKey, PublicKeyBody, PublicSubkey};
pub use self::secret::{SecretKey, SecretSubkey};
