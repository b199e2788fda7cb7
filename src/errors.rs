use snafu::{Backtrace, Snafu};

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

pub use crate::parsing::{Error as ParsingError, RemainingError};

/// Error types
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("invalid input"))]
    InvalidInput,
    #[snafu(display("invalid armor wrappers"))]
    InvalidArmorWrappers,
    #[snafu(display("invalid crc24 checksum"))]
    InvalidChecksum,
    #[snafu(transparent)]
    Base64Decode { source: base64::DecodeError },
    #[snafu(transparent)]
    PacketParsing { source: ParsingError },
    #[snafu(display("malformed packet stream: {source}"))]
    MalformedPacketStream { source: Box<Error> },
    /// Wrong key, wrong passphrase or corrupted ciphertext.
    ///
    /// Intentionally carries no detail about which of those it was.
    #[snafu(display("decryption failed"))]
    DecryptionFailed,
    #[snafu(display("missing key"))]
    MissingKey,
    #[snafu(display("no matching key found"))]
    KeyNotFound,
    #[snafu(transparent)]
    IO {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("cfb: invalid key iv length"))]
    CfbInvalidKeyIvLength,
    #[snafu(display("Not yet implemented: {message}"))]
    Unimplemented { message: String },
    /// Signals packet versions and parameters we don't support.
    #[snafu(display("Unsupported: {message}"))]
    Unsupported { message: String },
    #[snafu(display("{message}"))]
    Message { message: String },
    #[snafu(transparent)]
    Utf8Error { source: std::str::Utf8Error },
    #[snafu(transparent)]
    TryFromInt { source: std::num::TryFromIntError },
}

impl From<cipher::InvalidLength> for Error {
    fn from(_: cipher::InvalidLength) -> Error {
        Error::CfbInvalidKeyIvLength
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::Message { message: err }
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(err: derive_builder::UninitializedFieldError) -> Error {
        Error::Message {
            message: err.to_string(),
        }
    }
}

#[macro_export]
macro_rules! unimplemented_err {
    ($e:expr) => {
        return Err($crate::errors::Error::Unimplemented { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Unimplemented { message: format!($fmt, $($arg)+)})
    };
}

#[macro_export]
macro_rules! unsupported_err {
    ($e:expr) => {
        return Err($crate::errors::Error::Unsupported { message: $e.to_string()})
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Unsupported { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! bail {
    ($e:expr) => {
        return Err($crate::errors::Error::Message { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Message { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! format_err {
    ($e:expr) => {
        $crate::errors::Error::Message { message: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Message { message: format!($fmt, $($arg)+) }
    };
}

#[macro_export(local_inner_macros)]
macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            bail!($e);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)+) => {
        if !($cond) {
            bail!($fmt, $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr) => ({
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    $crate::bail!(r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#, left_val, right_val)
                }
            }
        }
    });
    ($left:expr, $right:expr, $($arg:tt)+) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    $crate::bail!(r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#, left_val, right_val,
                           format_args!($($arg)+))
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_failed_has_no_detail() {
        assert_eq!(Error::DecryptionFailed.to_string(), "decryption failed");
    }

    #[test]
    fn bail_produces_message() {
        fn inner() -> Result<()> {
            bail!("bad value {}", 3);
        }
        match inner() {
            Err(Error::Message { message }) => assert_eq!(message, "bad value 3"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
