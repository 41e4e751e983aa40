//! Context builder: accumulates trust and identity material, then hands it to
//! the engine's initializer
//!
//! The builder is single-owner during configuration and is not safe for
//! concurrent mutation. Contexts produced by [`ContextBuilder::build`] are
//! immutable and safe to share across handshakes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::context::TransportContext;
use crate::engine::{RandomSource, TransportSecurityEngine};
use crate::error::Result;
use crate::material::{KeyMaterial, TrustMaterial};
use crate::provider::{AliasPolicy, CredentialProvider, IdentityDelegate};
use crate::verifier::{TrustDelegate, TrustPolicy, TrustVerifier};

/// Generic TLS negotiation protocol identifier, the default when no protocol
/// is set explicitly
pub const TLS: &str = "TLS";

/// Legacy SSL negotiation protocol identifier
pub const SSL: &str = "SSL";

/// Identity key for set membership in the accumulation sets.
///
/// Raw handles are keyed by the address of their capability object. A
/// delegate is keyed by the (base, policy) pair it wraps, so re-loading the
/// same store with the same policy collapses to one entry while a delegate
/// never collides with its unwrapped base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum IdentityKey {
    Raw(usize),
    Delegated { base: usize, policy: usize },
}

fn thin_ptr<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as *const () as usize
}

/// Builder for [`TransportContext`] instances.
///
/// Accumulates zero or more trust verifiers and zero or more credential
/// providers, each optionally wrapped with an application policy, plus a
/// protocol name and randomness source. Load operations are all-or-nothing:
/// a failed load leaves the accumulated sets untouched.
pub struct ContextBuilder {
    engine: Arc<dyn TransportSecurityEngine>,
    protocol: Option<String>,
    random: Option<Arc<dyn RandomSource>>,
    verifiers: Vec<TrustVerifier>,
    verifier_keys: HashSet<IdentityKey>,
    providers: Vec<CredentialProvider>,
    provider_keys: HashSet<IdentityKey>,
}

impl ContextBuilder {
    /// New builder configuring contexts against `engine`
    pub fn new(engine: Arc<dyn TransportSecurityEngine>) -> Self {
        Self {
            engine,
            protocol: None,
            random: None,
            verifiers: Vec::new(),
            verifier_keys: HashSet::new(),
            providers: Vec::new(),
            provider_keys: HashSet::new(),
        }
    }

    /// Convenience alias for [`ContextBuilder::new`]
    pub fn create(engine: Arc<dyn TransportSecurityEngine>) -> Self {
        Self::new(engine)
    }

    /// Record the desired protocol identifier, e.g. `"TLS"`
    pub fn set_protocol(&mut self, name: impl Into<String>) -> &mut Self {
        self.protocol = Some(name.into());
        self
    }

    /// Select the generic TLS negotiation protocol
    pub fn use_tls(&mut self) -> &mut Self {
        self.set_protocol(TLS)
    }

    /// Select the legacy SSL negotiation protocol
    pub fn use_ssl(&mut self) -> &mut Self {
        self.set_protocol(SSL)
    }

    /// Inject a randomness source; when unset the engine's own secure
    /// randomness is used
    pub fn set_random_source(&mut self, random: Arc<dyn RandomSource>) -> &mut Self {
        self.random = Some(random);
        self
    }

    /// Load trust material, optionally intercepted by `policy`.
    ///
    /// Asks the engine for its default verifiers for `store`. When a policy
    /// is given, every X.509-capable verifier is wrapped in a
    /// [`TrustDelegate`]; verifiers of other shapes cannot be intercepted and
    /// pass through unwrapped. Accumulation deduplicates by identity, so
    /// loading the same store with the same policy twice adds nothing.
    ///
    /// # Errors
    /// [`TlsForgeError::CryptoProvider`](crate::TlsForgeError::CryptoProvider)
    /// when the platform lacks a default verifier factory,
    /// [`TlsForgeError::Material`](crate::TlsForgeError::Material) when the
    /// store handle is invalid. On error nothing is accumulated.
    pub fn load_trust_material(
        &mut self,
        store: &TrustMaterial,
        policy: Option<Arc<dyn TrustPolicy>>,
    ) -> Result<&mut Self> {
        let algorithm = self.engine.default_verifier_algorithm();
        let factory = self.engine.verifier_factory(&algorithm)?;
        let verifiers = factory.verifiers_for(store)?;

        let mut added = 0usize;
        for verifier in verifiers {
            let (key, entry) = match verifier {
                TrustVerifier::X509(base) => match &policy {
                    Some(policy) => {
                        let key = IdentityKey::Delegated {
                            base: thin_ptr(&base),
                            policy: thin_ptr(policy),
                        };
                        let delegate = TrustDelegate::new(base, Arc::clone(policy));
                        (key, TrustVerifier::X509(Arc::new(delegate)))
                    }
                    None => (IdentityKey::Raw(thin_ptr(&base)), TrustVerifier::X509(base)),
                },
                TrustVerifier::Opaque(inner) => (
                    IdentityKey::Raw(thin_ptr(&inner)),
                    TrustVerifier::Opaque(inner),
                ),
            };
            if self.verifier_keys.insert(key) {
                self.verifiers.push(entry);
                added += 1;
            }
        }
        debug!(
            algorithm = %algorithm,
            added,
            total = self.verifiers.len(),
            "accumulated trust verifiers"
        );
        Ok(self)
    }

    /// Load key material, optionally intercepted by `policy`.
    ///
    /// Symmetric to [`ContextBuilder::load_trust_material`]: X.509-capable
    /// providers are wrapped in an [`IdentityDelegate`] when a policy is
    /// given, others pass through unwrapped, and accumulation deduplicates by
    /// identity.
    ///
    /// # Errors
    /// [`TlsForgeError::UnrecoverableKey`](crate::TlsForgeError::UnrecoverableKey)
    /// when `key_passphrase` unlocks no entry,
    /// [`TlsForgeError::CryptoProvider`](crate::TlsForgeError::CryptoProvider)
    /// and [`TlsForgeError::Material`](crate::TlsForgeError::Material) as for
    /// trust material. On error nothing is accumulated.
    pub fn load_key_material(
        &mut self,
        store: &KeyMaterial,
        key_passphrase: &[u8],
        policy: Option<Arc<dyn AliasPolicy>>,
    ) -> Result<&mut Self> {
        let algorithm = self.engine.default_provider_algorithm();
        let factory = self.engine.provider_factory(&algorithm)?;
        let providers = factory.providers_for(store, key_passphrase)?;

        let mut added = 0usize;
        for provider in providers {
            let (key, entry) = match provider {
                CredentialProvider::X509(base) => match &policy {
                    Some(policy) => {
                        let key = IdentityKey::Delegated {
                            base: thin_ptr(&base),
                            policy: thin_ptr(policy),
                        };
                        let delegate = IdentityDelegate::new(base, Arc::clone(policy));
                        (key, CredentialProvider::X509(Arc::new(delegate)))
                    }
                    None => (
                        IdentityKey::Raw(thin_ptr(&base)),
                        CredentialProvider::X509(base),
                    ),
                },
                CredentialProvider::Opaque(inner) => (
                    IdentityKey::Raw(thin_ptr(&inner)),
                    CredentialProvider::Opaque(inner),
                ),
            };
            if self.provider_keys.insert(key) {
                self.providers.push(entry);
                added += 1;
            }
        }
        debug!(
            algorithm = %algorithm,
            added,
            total = self.providers.len(),
            "accumulated credential providers"
        );
        Ok(self)
    }

    /// Build a context from the accumulated state.
    ///
    /// Resolves the protocol (explicit or the default `"TLS"`), converts
    /// empty accumulation sets to `None` so the engine's own default
    /// selection still applies, and invokes the engine initializer. The
    /// builder stays usable: building again after further configuration
    /// produces a new, independent context.
    ///
    /// # Errors
    /// [`TlsForgeError::AlgorithmUnavailable`](crate::TlsForgeError::AlgorithmUnavailable)
    /// for an unsupported protocol name,
    /// [`TlsForgeError::ContextInit`](crate::TlsForgeError::ContextInit) when
    /// the engine rejects the assembled sets.
    pub fn build(&self) -> Result<TransportContext> {
        let protocol = self.protocol.as_deref().unwrap_or(TLS);
        let providers = if self.providers.is_empty() {
            None
        } else {
            Some(self.providers.clone())
        };
        let verifiers = if self.verifiers.is_empty() {
            None
        } else {
            Some(self.verifiers.clone())
        };
        debug!(
            protocol,
            providers = self.providers.len(),
            verifiers = self.verifiers.len(),
            "initializing transport context"
        );
        self.engine
            .init_context(protocol, providers, verifiers, self.random.clone())
    }
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("protocol", &self.protocol)
            .field("verifiers", &self.verifiers.len())
            .field("providers", &self.providers.len())
            .field("random", &self.random.as_ref().map(|_| "<RandomSource>"))
            .finish()
    }
}
