//! Credential-side capability objects and the alias-policy delegate
//!
//! Mirrors the trust side: the engine's provider factory hands back
//! [`CredentialProvider`] handles, and X.509-shaped providers can have their
//! alias selection intercepted by an [`AliasPolicy`] via [`IdentityDelegate`].

use std::any::Any;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use rustls_pki_types::{CertificateDer, PrivateKeyDer};

use crate::ledger::{AliasLedger, CredentialDetails};
use crate::verifier::IssuerName;

/// Connection-scoped facts available to an [`AliasPolicy`] at selection time
#[derive(Debug, Clone, Default)]
pub struct ConnectionContext {
    /// Remote peer address, when known
    pub peer_addr: Option<SocketAddr>,
    /// Local address, when known
    pub local_addr: Option<SocketAddr>,
    /// Server name requested for the connection, when known
    pub server_name: Option<String>,
}

/// Credential-management capability exposed by X.509-shaped providers.
///
/// Implementations must be safe for concurrent use by simultaneous handshakes.
pub trait X509CredentialProvider: Send + Sync {
    /// Aliases usable for client authentication with the given key type,
    /// filtered by acceptable issuers when a filter is supplied
    fn client_aliases(&self, key_type: &str, issuers: Option<&[IssuerName]>) -> Vec<String>;

    /// Aliases usable for server authentication with the given key type
    fn server_aliases(&self, key_type: &str, issuers: Option<&[IssuerName]>) -> Vec<String>;

    /// Select an alias to authenticate this side as a client, or `None` when
    /// no suitable credential exists
    fn choose_client_alias(
        &self,
        key_types: &[&str],
        issuers: Option<&[IssuerName]>,
        cx: &ConnectionContext,
    ) -> Option<String>;

    /// Select an alias to authenticate this side as a server
    fn choose_server_alias(
        &self,
        key_type: &str,
        issuers: Option<&[IssuerName]>,
        cx: &ConnectionContext,
    ) -> Option<String>;

    /// Certificate chain for `alias`, leaf first
    fn chain_for_alias(&self, alias: &str) -> Option<Vec<CertificateDer<'static>>>;

    /// Private key for `alias`
    fn key_for_alias(&self, alias: &str) -> Option<PrivateKeyDer<'static>>;
}

/// Handle to one credential provider produced by an engine factory.
#[derive(Clone)]
pub enum CredentialProvider {
    /// Provider exposing the X.509 credential capability; interceptable
    X509(Arc<dyn X509CredentialProvider>),
    /// Engine-specific provider with no interceptable surface
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialProvider::X509(_) => f.write_str("CredentialProvider::X509(..)"),
            CredentialProvider::Opaque(_) => f.write_str("CredentialProvider::Opaque(..)"),
        }
    }
}

/// Application alias-selection override.
///
/// Given the ledger of valid aliases for a connection, returns the alias to
/// authenticate with, or `None` for "no suitable credential". Invoked
/// concurrently from multiple handshakes; must not mutate shared state.
pub trait AliasPolicy: Send + Sync {
    /// Select an alias from `candidates`
    fn choose_alias(&self, candidates: &AliasLedger, cx: &ConnectionContext) -> Option<String>;
}

impl<F> AliasPolicy for F
where
    F: Fn(&AliasLedger, &ConnectionContext) -> Option<String> + Send + Sync,
{
    fn choose_alias(&self, candidates: &AliasLedger, cx: &ConnectionContext) -> Option<String> {
        self(candidates, cx)
    }
}

/// Wraps a base provider so an [`AliasPolicy`] decides alias selection.
///
/// Selection calls enumerate the base provider's aliases into a fresh
/// [`AliasLedger`] and hand it to the policy; everything else passes through
/// to the base provider unchanged.
pub struct IdentityDelegate {
    base: Arc<dyn X509CredentialProvider>,
    policy: Arc<dyn AliasPolicy>,
}

impl IdentityDelegate {
    /// Wrap `base` with `policy`
    pub fn new(base: Arc<dyn X509CredentialProvider>, policy: Arc<dyn AliasPolicy>) -> Self {
        Self { base, policy }
    }
}

impl X509CredentialProvider for IdentityDelegate {
    fn client_aliases(&self, key_type: &str, issuers: Option<&[IssuerName]>) -> Vec<String> {
        self.base.client_aliases(key_type, issuers)
    }

    fn server_aliases(&self, key_type: &str, issuers: Option<&[IssuerName]>) -> Vec<String> {
        self.base.server_aliases(key_type, issuers)
    }

    fn choose_client_alias(
        &self,
        key_types: &[&str],
        issuers: Option<&[IssuerName]>,
        cx: &ConnectionContext,
    ) -> Option<String> {
        // A repeated alias under a later key type overwrites its details;
        // last key type in iteration order wins.
        let mut ledger = AliasLedger::new();
        for key_type in key_types {
            for alias in self.base.client_aliases(key_type, issuers) {
                let chain = self.base.chain_for_alias(&alias).unwrap_or_default();
                ledger.insert(alias, CredentialDetails::new(*key_type, chain));
            }
        }
        self.policy.choose_alias(&ledger, cx)
    }

    fn choose_server_alias(
        &self,
        key_type: &str,
        issuers: Option<&[IssuerName]>,
        cx: &ConnectionContext,
    ) -> Option<String> {
        let mut ledger = AliasLedger::new();
        for alias in self.base.server_aliases(key_type, issuers) {
            let chain = self.base.chain_for_alias(&alias).unwrap_or_default();
            ledger.insert(alias, CredentialDetails::new(key_type, chain));
        }
        self.policy.choose_alias(&ledger, cx)
    }

    fn chain_for_alias(&self, alias: &str) -> Option<Vec<CertificateDer<'static>>> {
        self.base.chain_for_alias(alias)
    }

    fn key_for_alias(&self, alias: &str) -> Option<PrivateKeyDer<'static>> {
        self.base.key_for_alias(alias)
    }
}

impl fmt::Debug for IdentityDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityDelegate")
            .field("base", &"<X509CredentialProvider>")
            .field("policy", &"<AliasPolicy>")
            .finish()
    }
}
