//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the coordination primitives
#[derive(Error, Debug)]
pub enum Error {
    /// A Redis call failed (connection, timeout, protocol). The wrapping
    /// operation is named so callers can tell which primitive broke.
    #[error("redis transport error during {op}: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: redis::RedisError,
    },

    /// The caller's cancellation token fired during a blocking wait.
    #[error("canceled while {op}")]
    Canceled { op: &'static str },

    /// Key or value codec failure in the map layer.
    #[error("marshal error: {source}")]
    Marshal {
        #[from]
        source: serde_json::Error,
    },

    /// An invariant the store is expected to uphold was violated, e.g. a
    /// script returned a reply shape the library cannot interpret.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a transport error naming the failed operation
    pub fn transport(op: &'static str, source: redis::RedisError) -> Self {
        Self::Transport { op, source }
    }

    /// Create a cancellation error naming the interrupted operation
    pub fn canceled(op: &'static str) -> Self {
        Self::Canceled { op }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from caller cancellation
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Self::Transport {
            op: "redis call",
            source: err,
        }
    }
}
