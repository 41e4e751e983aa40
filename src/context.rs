//! The immutable product of a successful build

use std::fmt;
use std::sync::Arc;

use crate::engine::RandomSource;
use crate::provider::CredentialProvider;
use crate::verifier::TrustVerifier;

/// A fully initialized transport-security context.
///
/// Immutable once built, and safe for concurrent read-only use by multiple
/// simultaneous handshakes. Captures the builder's accumulated material at
/// build time; later builder configuration produces new, independent contexts.
pub struct TransportContext {
    protocol: String,
    providers: Option<Vec<CredentialProvider>>,
    verifiers: Option<Vec<TrustVerifier>>,
    random: Option<Arc<dyn RandomSource>>,
}

impl TransportContext {
    /// Assemble a context. Called by engine initializers, not by
    /// configuration code; use
    /// [`ContextBuilder`](crate::ContextBuilder) to construct contexts.
    pub fn new(
        protocol: impl Into<String>,
        providers: Option<Vec<CredentialProvider>>,
        verifiers: Option<Vec<TrustVerifier>>,
        random: Option<Arc<dyn RandomSource>>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            providers,
            verifiers,
            random,
        }
    }

    /// Negotiated protocol identifier, e.g. `"TLS"`
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Resolved credential providers; `None` means engine defaults apply
    pub fn credential_providers(&self) -> Option<&[CredentialProvider]> {
        self.providers.as_deref()
    }

    /// Resolved trust verifiers; `None` means engine defaults apply
    pub fn trust_verifiers(&self) -> Option<&[TrustVerifier]> {
        self.verifiers.as_deref()
    }

    /// Injected randomness source; `None` means engine default randomness
    pub fn random_source(&self) -> Option<&Arc<dyn RandomSource>> {
        self.random.as_ref()
    }
}

impl fmt::Debug for TransportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportContext")
            .field("protocol", &self.protocol)
            .field(
                "providers",
                &self.providers.as_ref().map(|p| p.len()),
            )
            .field(
                "verifiers",
                &self.verifiers.as_ref().map(|v| v.len()),
            )
            .field("random", &self.random.as_ref().map(|_| "<RandomSource>"))
            .finish()
    }
}
