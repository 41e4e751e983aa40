//! Seams to the platform transport-security engine
//!
//! The engine owns the handshake state machine, record protection and cipher
//! negotiation. This crate only asks it for default verifier/provider
//! factories and hands the assembled material back at build time.

use std::sync::Arc;

use crate::context::TransportContext;
use crate::error::Result;
use crate::material::{KeyMaterial, TrustMaterial};
use crate::provider::CredentialProvider;
use crate::verifier::TrustVerifier;

/// Injectable source of cryptographically secure randomness.
///
/// Shared by concurrent handshakes, so filling goes through `&self`;
/// implementations provide their own synchronization where needed.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` with random bytes
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Produces the default trust verifiers for a store.
pub trait VerifierFactory: Send + Sync {
    /// The engine's default verifier set for `store`.
    ///
    /// # Errors
    /// [`TlsForgeError::Material`](crate::TlsForgeError::Material) when the
    /// store handle is not one this factory understands.
    fn verifiers_for(&self, store: &TrustMaterial) -> Result<Vec<TrustVerifier>>;
}

/// Produces the default credential providers for a store.
pub trait ProviderFactory: Send + Sync {
    /// The engine's default provider set for `store`, with entries unlocked
    /// by `key_passphrase`.
    ///
    /// # Errors
    /// [`TlsForgeError::UnrecoverableKey`](crate::TlsForgeError::UnrecoverableKey)
    /// when the passphrase unlocks no entry,
    /// [`TlsForgeError::Material`](crate::TlsForgeError::Material) when the
    /// store handle is invalid.
    fn providers_for(
        &self,
        store: &KeyMaterial,
        key_passphrase: &[u8],
    ) -> Result<Vec<CredentialProvider>>;
}

/// The platform TLS/SSL implementation this crate configures but never
/// reimplements.
pub trait TransportSecurityEngine: Send + Sync {
    /// Name of the engine's default chain-verification algorithm
    fn default_verifier_algorithm(&self) -> String;

    /// Name of the engine's default credential-management algorithm
    fn default_provider_algorithm(&self) -> String;

    /// Verifier factory for `algorithm`.
    ///
    /// # Errors
    /// [`TlsForgeError::CryptoProvider`](crate::TlsForgeError::CryptoProvider)
    /// when the platform cannot produce a factory for the algorithm.
    fn verifier_factory(&self, algorithm: &str) -> Result<Arc<dyn VerifierFactory>>;

    /// Provider factory for `algorithm`.
    ///
    /// # Errors
    /// [`TlsForgeError::CryptoProvider`](crate::TlsForgeError::CryptoProvider)
    /// when the platform cannot produce a factory for the algorithm.
    fn provider_factory(&self, algorithm: &str) -> Result<Arc<dyn ProviderFactory>>;

    /// Initialize a context from the assembled material.
    ///
    /// `None` for either array means "use the engine's own defaults"; an
    /// engine must never receive a zero-length array, which would defeat its
    /// default-selection fallback.
    ///
    /// # Errors
    /// [`TlsForgeError::AlgorithmUnavailable`](crate::TlsForgeError::AlgorithmUnavailable)
    /// for an unsupported protocol name,
    /// [`TlsForgeError::ContextInit`](crate::TlsForgeError::ContextInit) for
    /// any other initializer failure.
    fn init_context(
        &self,
        protocol: &str,
        providers: Option<Vec<CredentialProvider>>,
        verifiers: Option<Vec<TrustVerifier>>,
        random: Option<Arc<dyn RandomSource>>,
    ) -> Result<TransportContext>;
}
