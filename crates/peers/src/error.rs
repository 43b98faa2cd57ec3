//! Error types for the peer coordination layer.

/// Result type alias for the peer coordination layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// `ConfigurationConflict` is a programming-contract violation: a process
/// receiving it during startup should abort instead of serving traffic.
/// Every other kind is an ordinary, recoverable transport outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A router factory was already installed on the workspace.
    ConfigurationConflict,
    /// The peer does not hold the requested key.
    NotFound,
    /// The transport failed to reach or talk to the peer.
    Transport,
    /// The call context was cancelled.
    Cancelled,
    /// The call context deadline passed.
    DeadlineExceeded,
}

/// Errors returned by [`RemotePeer`](crate::RemotePeer) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeerError {
    /// The peer has no value for the key.
    #[error("key {key:?} not found in group {group:?}")]
    NotFound { group: String, key: String },
    /// Network or protocol failure in the transport.
    #[error("transport error: {0}")]
    Transport(String),
    /// The caller cancelled the call context.
    #[error("call cancelled")]
    Cancelled,
    /// The call context deadline elapsed before the peer answered.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl PeerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PeerError::NotFound { .. } => ErrorKind::NotFound,
            PeerError::Transport(_) => ErrorKind::Transport,
            PeerError::Cancelled => ErrorKind::Cancelled,
            PeerError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }
}

/// Errors that can occur in the peer coordination layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A second router registration was attempted on a workspace.
    #[error("router already registered on workspace {workspace:?}")]
    ConfigurationConflict { workspace: String },
    /// A remote peer call failed.
    #[error(transparent)]
    Peer(#[from] PeerError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigurationConflict { .. } => ErrorKind::ConfigurationConflict,
            Error::Peer(err) => err.kind(),
        }
    }

    /// True for errors the process must not continue past.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::ConfigurationConflict
    }
}
