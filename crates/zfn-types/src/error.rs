//! The error type every wrapped call and builder step fails with.

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input to a builder step.
    Configuration,
    /// An argument or return value was rejected by its schema.
    Validation,
    /// A future leaked into a synchronous pipeline.
    Contract,
    /// The implementation (or a handler) failed.
    Execution,
}

/// Error raised by zfn.
///
/// `Configuration`, `Validation` and `Contract` are produced by zfn itself
/// and carry [`Error::TAG`]. `Execution` wraps whatever user code returned,
/// unmodified.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Contract(String),
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Identifying tag shared by every error zfn raises on its own behalf.
    pub const TAG: &'static str = "ZfnError";

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Error::Contract(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Contract(_) => ErrorKind::Contract,
            Error::Execution(_) => ErrorKind::Execution,
        }
    }

    /// [`Error::TAG`] for errors zfn raised, `None` for user errors.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Error::Execution(_) => None,
            _ => Some(Self::TAG),
        }
    }

    /// The formatted message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Surface an error returned by user code.
    ///
    /// An error that is already a zfn [`Error`] (for example a validation
    /// failure from a nested wrapped call, bubbled up with `?`) comes back
    /// out as itself; anything else becomes [`Error::Execution`].
    pub fn from_user(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(own) => own,
            Err(err) => Error::Execution(err),
        }
    }

    /// Recover the user's error, if this is one.
    pub fn into_execution(self) -> Option<anyhow::Error> {
        match self {
            Error::Execution(err) => Some(err),
            _ => None,
        }
    }
}
