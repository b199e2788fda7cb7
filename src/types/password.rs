use zeroize::Zeroizing;

/// A passphrase used to lock or unlock secret key material.
///
/// Either a fixed value, or a callback that is asked every time the passphrase is needed.
#[derive(derive_more::Debug)]
pub enum Password {
    Dynamic(#[debug("Box<Fn>")] Box<dyn Fn() -> Zeroizing<Vec<u8>> + 'static + Send + Sync>),
    Static(#[debug("***")] Zeroizing<Vec<u8>>),
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::Static(value.into_bytes().into())
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::Static(value.as_bytes().to_vec().into())
    }
}

impl From<&[u8]> for Password {
    fn from(value: &[u8]) -> Self {
        Self::Static(value.to_vec().into())
    }
}

impl Default for Password {
    fn default() -> Self {
        Self::empty()
    }
}

impl Password {
    pub fn empty() -> Self {
        Self::Static(Vec::new().into())
    }

    /// A passphrase produced by `f` each time it is read.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Zeroizing<Vec<u8>> + 'static + Send + Sync,
    {
        Self::Dynamic(Box::new(f))
    }

    /// Returns the passphrase octets, running the callback if there is one.
    pub fn read(&self) -> Zeroizing<Vec<u8>> {
        match self {
            Self::Dynamic(f) => f(),
            Self::Static(s) => s.clone(),
        }
    }
}
