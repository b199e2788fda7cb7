//! Value types shared by the packet and key layers.

mod fingerprint;
mod key;
mod key_id;
mod key_traits;
mod mpi;
mod packet;
mod params;
mod password;
mod s2k;

pub use self::fingerprint::Fingerprint;
pub use self::key::{KeyRole, KeyVersion};
pub use self::key_id::KeyId;
pub use self::key_traits::KeyDetails;
pub use self::mpi::Mpi;
pub use self::packet::{PacketHeaderVersion, PacketLength, Tag};
pub use self::params::*;
pub use self::password::Password;
pub use self::s2k::StringToKey;
