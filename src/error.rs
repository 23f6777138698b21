use crate::{native::NativeError, BackendKind};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested data source was never registered.
    #[error("unknown data source '{name}'")]
    UnknownDataSource { name: String },
    /// No name was given and no default data source is configured.
    #[error("no default data source configured")]
    NoDefaultDataSource,
    /// A native driver primitive failed and the failure was not suppressed.
    #[error("{backend} driver error: {source}")]
    Native {
        /// Backend whose primitive failed.
        backend: BackendKind,
        #[source]
        source: NativeError,
    },
    /// Operation on a cursor whose native result was already released.
    #[error("cursor is closed")]
    Closed,
    /// Configuration text could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    pub(crate) fn native(backend: BackendKind, source: NativeError) -> Self {
        Self::Native { backend, source }
    }
}
