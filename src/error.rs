//! Error types for tlsforge

use thiserror::Error;

/// Result type for tlsforge operations
pub type Result<T> = std::result::Result<T, TlsForgeError>;

/// Errors raised while configuring or building a transport context.
///
/// All failures surface synchronously to the caller of the operation that
/// triggered them; nothing is retried internally. A failed load leaves the
/// builder's accumulated state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlsForgeError {
    /// Store handle was malformed or not one the engine understands
    #[error("material error: {0}")]
    Material(String),

    /// No store entry could be unlocked with the supplied passphrase
    #[error("unrecoverable key: {0}")]
    UnrecoverableKey(String),

    /// The platform cannot produce the requested algorithm or factory
    #[error("crypto provider error: {0}")]
    CryptoProvider(String),

    /// The protocol name is not supported by the platform
    #[error("algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),

    /// The engine rejected the assembled provider/verifier sets
    #[error("context initialization failed: {0}")]
    ContextInit(String),
}

impl TlsForgeError {
    /// Create a new material error
    pub fn material(msg: impl Into<String>) -> Self {
        Self::Material(msg.into())
    }

    /// Create a new unrecoverable-key error
    pub fn unrecoverable_key(msg: impl Into<String>) -> Self {
        Self::UnrecoverableKey(msg.into())
    }

    /// Create a new crypto-provider error
    pub fn crypto_provider(msg: impl Into<String>) -> Self {
        Self::CryptoProvider(msg.into())
    }

    /// Create a new algorithm-unavailable error
    pub fn algorithm_unavailable(msg: impl Into<String>) -> Self {
        Self::AlgorithmUnavailable(msg.into())
    }

    /// Create a new context-initialization error
    pub fn context_init(msg: impl Into<String>) -> Self {
        Self::ContextInit(msg.into())
    }
}

/// Raised by a trust verifier when a presented certificate chain is rejected.
///
/// This surfaces during live handshakes, never at build time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("certificate chain rejected: {reason}")]
pub struct ChainValidationError {
    reason: String,
}

impl ChainValidationError {
    /// Rejection with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Human-readable rejection reason
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
