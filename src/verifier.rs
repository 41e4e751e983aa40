//! Trust-side capability objects and the trust-policy delegate
//!
//! The engine's verifier factory hands back [`TrustVerifier`] handles. Handles
//! exposing the X.509 chain-checking capability can be intercepted by a
//! [`TrustPolicy`] via [`TrustDelegate`]; handles of any other shape are
//! opaque to this crate and always pass through unwrapped.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustls_pki_types::CertificateDer;
use tracing::trace;

use crate::error::ChainValidationError;

/// DER-encoded X.500 distinguished name identifying a certificate issuer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssuerName(
    /// DER bytes of the name
    pub Vec<u8>,
);

/// Chain-verification capability exposed by X.509-shaped trust verifiers.
///
/// Implementations must be safe for concurrent use by simultaneous handshakes.
pub trait X509TrustVerifier: Send + Sync {
    /// Verify a chain presented by a client (server side of mutual TLS).
    ///
    /// # Errors
    /// [`ChainValidationError`] when the chain is rejected.
    fn verify_client_chain(
        &self,
        chain: &[CertificateDer<'static>],
        auth_type: &str,
    ) -> Result<(), ChainValidationError>;

    /// Verify a chain presented by a server.
    ///
    /// # Errors
    /// [`ChainValidationError`] when the chain is rejected.
    fn verify_server_chain(
        &self,
        chain: &[CertificateDer<'static>],
        auth_type: &str,
    ) -> Result<(), ChainValidationError>;

    /// Issuers this verifier accepts chains from
    fn accepted_issuers(&self) -> Vec<IssuerName>;
}

/// Handle to one trust verifier produced by an engine factory.
#[derive(Clone)]
pub enum TrustVerifier {
    /// Verifier exposing the X.509 chain-checking capability; interceptable
    X509(Arc<dyn X509TrustVerifier>),
    /// Engine-specific verifier with no interceptable surface
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for TrustVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustVerifier::X509(_) => f.write_str("TrustVerifier::X509(..)"),
            TrustVerifier::Opaque(_) => f.write_str("TrustVerifier::Opaque(..)"),
        }
    }
}

/// Application trust override consulted before base server-chain verification.
///
/// Must be side-effect free with respect to shared state, or provide its own
/// synchronization; it is invoked concurrently from multiple handshakes.
pub trait TrustPolicy: Send + Sync {
    /// Whether `chain` is trusted outright for the given auth type,
    /// regardless of what the base verifier would decide
    fn is_trusted(&self, chain: &[CertificateDer<'static>], auth_type: &str) -> bool;
}

impl<F> TrustPolicy for F
where
    F: Fn(&[CertificateDer<'static>], &str) -> bool + Send + Sync,
{
    fn is_trusted(&self, chain: &[CertificateDer<'static>], auth_type: &str) -> bool {
        self(chain, auth_type)
    }
}

/// Wraps a base verifier so a [`TrustPolicy`] is consulted before server-chain
/// verification.
///
/// When the policy returns `true` the chain is accepted without consulting the
/// base verifier at all. This is an explicit bypass: a policy that always
/// returns `true` disables server certificate validation entirely.
///
/// Client chains are never subject to the policy. The override mechanism
/// exists for relaxing *server* trust (self-signed test certificates, pinned
/// CAs); silently weakening server-side authentication of clients is not
/// something it can express.
pub struct TrustDelegate {
    base: Arc<dyn X509TrustVerifier>,
    policy: Arc<dyn TrustPolicy>,
}

impl TrustDelegate {
    /// Wrap `base` with `policy`
    pub fn new(base: Arc<dyn X509TrustVerifier>, policy: Arc<dyn TrustPolicy>) -> Self {
        Self { base, policy }
    }
}

impl X509TrustVerifier for TrustDelegate {
    fn verify_client_chain(
        &self,
        chain: &[CertificateDer<'static>],
        auth_type: &str,
    ) -> Result<(), ChainValidationError> {
        self.base.verify_client_chain(chain, auth_type)
    }

    fn verify_server_chain(
        &self,
        chain: &[CertificateDer<'static>],
        auth_type: &str,
    ) -> Result<(), ChainValidationError> {
        if self.policy.is_trusted(chain, auth_type) {
            trace!(
                auth_type,
                chain_len = chain.len(),
                "trust policy accepted server chain, base verifier skipped"
            );
            return Ok(());
        }
        self.base.verify_server_chain(chain, auth_type)
    }

    fn accepted_issuers(&self) -> Vec<IssuerName> {
        self.base.accepted_issuers()
    }
}

impl fmt::Debug for TrustDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustDelegate")
            .field("base", &"<X509TrustVerifier>")
            .field("policy", &"<TrustPolicy>")
            .finish()
    }
}
