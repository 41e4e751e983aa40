//! Shared in-memory doubles for the engine, verifier and provider seams.
//!
//! The engine's factories hand back the pre-built handles stored inside the
//! material, so repeated loads of the same store observe identical object
//! identities and exercise the builder's deduplication.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tlsforge::{
    AliasLedger, AliasPolicy, ChainValidationError, ConnectionContext, CredentialProvider,
    IssuerName, KeyMaterial, MaterialLoader, ProviderFactory, RandomSource, Result, TlsForgeError,
    TransportContext, TransportSecurityEngine, TrustMaterial, TrustPolicy, TrustVerifier,
    VerifierFactory, X509CredentialProvider, X509TrustVerifier,
};

pub fn cert(tag: u8) -> CertificateDer<'static> {
    CertificateDer::from(vec![0x30, tag])
}

pub fn chain(tags: &[u8]) -> Vec<CertificateDer<'static>> {
    tags.iter().map(|tag| cert(*tag)).collect()
}

/// Verifier double that counts calls and either accepts or rejects every chain.
pub struct ProbeVerifier {
    pub client_calls: AtomicUsize,
    pub server_calls: AtomicUsize,
    reject: bool,
}

impl ProbeVerifier {
    pub fn accepting() -> Self {
        Self {
            client_calls: AtomicUsize::new(0),
            server_calls: AtomicUsize::new(0),
            reject: false,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::accepting()
        }
    }

    fn outcome(&self, side: &str) -> std::result::Result<(), ChainValidationError> {
        if self.reject {
            Err(ChainValidationError::new(format!("{side} chain rejected")))
        } else {
            Ok(())
        }
    }
}

impl X509TrustVerifier for ProbeVerifier {
    fn verify_client_chain(
        &self,
        _chain: &[CertificateDer<'static>],
        _auth_type: &str,
    ) -> std::result::Result<(), ChainValidationError> {
        self.client_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome("client")
    }

    fn verify_server_chain(
        &self,
        _chain: &[CertificateDer<'static>],
        _auth_type: &str,
    ) -> std::result::Result<(), ChainValidationError> {
        self.server_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome("server")
    }

    fn accepted_issuers(&self) -> Vec<IssuerName> {
        vec![IssuerName(b"CN=probe-root".to_vec())]
    }
}

/// Trust policy double that counts consultations and answers a fixed verdict.
pub struct CountingPolicy {
    pub calls: AtomicUsize,
    verdict: bool,
}

impl CountingPolicy {
    pub fn answering(verdict: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            verdict,
        }
    }
}

impl TrustPolicy for CountingPolicy {
    fn is_trusted(&self, _chain: &[CertificateDer<'static>], _auth_type: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}

/// Provider double with a fixed table of (alias, key type, chain) entries.
pub struct FixedProvider {
    entries: Vec<(String, String, Vec<CertificateDer<'static>>)>,
}

impl FixedProvider {
    pub fn new(entries: &[(&str, &str, &[u8])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(alias, key_type, tags)| {
                    (alias.to_string(), key_type.to_string(), chain(tags))
                })
                .collect(),
        }
    }

    fn aliases_for(&self, key_type: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, kt, _)| kt == key_type)
            .map(|(alias, _, _)| alias.clone())
            .collect()
    }
}

impl X509CredentialProvider for FixedProvider {
    fn client_aliases(&self, key_type: &str, _issuers: Option<&[IssuerName]>) -> Vec<String> {
        self.aliases_for(key_type)
    }

    fn server_aliases(&self, key_type: &str, _issuers: Option<&[IssuerName]>) -> Vec<String> {
        self.aliases_for(key_type)
    }

    fn choose_client_alias(
        &self,
        key_types: &[&str],
        issuers: Option<&[IssuerName]>,
        _cx: &ConnectionContext,
    ) -> Option<String> {
        key_types
            .iter()
            .flat_map(|key_type| self.client_aliases(key_type, issuers))
            .next()
    }

    fn choose_server_alias(
        &self,
        key_type: &str,
        issuers: Option<&[IssuerName]>,
        _cx: &ConnectionContext,
    ) -> Option<String> {
        self.server_aliases(key_type, issuers).into_iter().next()
    }

    fn chain_for_alias(&self, alias: &str) -> Option<Vec<CertificateDer<'static>>> {
        self.entries
            .iter()
            .find(|(name, _, _)| name == alias)
            .map(|(_, _, chain)| chain.clone())
    }

    fn key_for_alias(&self, alias: &str) -> Option<PrivateKeyDer<'static>> {
        self.entries
            .iter()
            .find(|(name, _, _)| name == alias)
            .map(|_| PrivateKeyDer::from(PrivatePkcs8KeyDer::from(vec![0x30, 0x00])))
    }
}

/// Alias policy selecting the alias whose chain has the fewest certificates,
/// first-enumerated alias winning ties.
pub fn fewest_certs_policy() -> Arc<dyn AliasPolicy> {
    Arc::new(|ledger: &AliasLedger, _cx: &ConnectionContext| {
        let mut best: Option<(&str, usize)> = None;
        for (alias, details) in ledger.iter() {
            match best {
                Some((_, len)) if details.chain.len() >= len => {}
                _ => best = Some((alias, details.chain.len())),
            }
        }
        best.map(|(alias, _)| alias.to_string())
    })
}

/// Trust store handle understood by [`TestEngine`]'s verifier factory.
pub struct TestTrustStore {
    verifiers: Vec<TrustVerifier>,
}

impl TestTrustStore {
    pub fn material(verifiers: Vec<TrustVerifier>) -> TrustMaterial {
        TrustMaterial::new(Arc::new(Self { verifiers }))
    }
}

/// Key store handle understood by [`TestEngine`]'s provider factory.
pub struct TestKeyStore {
    providers: Vec<CredentialProvider>,
    passphrase: Vec<u8>,
}

impl TestKeyStore {
    pub fn material(providers: Vec<CredentialProvider>, passphrase: &[u8]) -> KeyMaterial {
        KeyMaterial::new(Arc::new(Self {
            providers,
            passphrase: passphrase.to_vec(),
        }))
    }
}

/// Loader double: one-byte magic headers stand in for real store formats
/// (`T` for trust stores, `K` for key stores).
pub struct TestLoader {
    pub verifiers: Vec<TrustVerifier>,
    pub providers: Vec<CredentialProvider>,
}

impl MaterialLoader for TestLoader {
    fn load_trust_store(&self, bytes: &[u8], _passphrase: Option<&[u8]>) -> Result<TrustMaterial> {
        if bytes.first() != Some(&b'T') {
            return Err(TlsForgeError::material("unrecognized trust store format"));
        }
        Ok(TestTrustStore::material(self.verifiers.clone()))
    }

    fn load_key_store(&self, bytes: &[u8], passphrase: Option<&[u8]>) -> Result<KeyMaterial> {
        if bytes.first() != Some(&b'K') {
            return Err(TlsForgeError::material("unrecognized key store format"));
        }
        Ok(TestKeyStore::material(
            self.providers.clone(),
            passphrase.unwrap_or_default(),
        ))
    }
}

/// Deterministic randomness double.
pub struct SeededRandom(pub u8);

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        dest.fill(self.0);
    }
}

const VERIFIER_ALGORITHM: &str = "PKIX";
const PROVIDER_ALGORITHM: &str = "X509";
const PROTOCOLS: [&str; 4] = ["TLS", "SSL", "TLSv1.2", "TLSv1.3"];

/// In-memory engine: factories return the handles stored in the material,
/// and `init_context` only checks the protocol and the non-empty-array rule.
pub struct TestEngine {
    verifier_factory_available: bool,
    provider_factory_available: bool,
}

impl TestEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            verifier_factory_available: true,
            provider_factory_available: true,
        })
    }

    pub fn without_verifier_support() -> Arc<Self> {
        Arc::new(Self {
            verifier_factory_available: false,
            provider_factory_available: true,
        })
    }

    pub fn without_provider_support() -> Arc<Self> {
        Arc::new(Self {
            verifier_factory_available: true,
            provider_factory_available: false,
        })
    }
}

struct TestVerifierFactory;

impl VerifierFactory for TestVerifierFactory {
    fn verifiers_for(&self, store: &TrustMaterial) -> Result<Vec<TrustVerifier>> {
        let store = store
            .handle()
            .downcast_ref::<TestTrustStore>()
            .ok_or_else(|| TlsForgeError::material("not a TestTrustStore handle"))?;
        Ok(store.verifiers.clone())
    }
}

struct TestProviderFactory;

impl ProviderFactory for TestProviderFactory {
    fn providers_for(
        &self,
        store: &KeyMaterial,
        key_passphrase: &[u8],
    ) -> Result<Vec<CredentialProvider>> {
        let store = store
            .handle()
            .downcast_ref::<TestKeyStore>()
            .ok_or_else(|| TlsForgeError::material("not a TestKeyStore handle"))?;
        if store.passphrase != key_passphrase {
            return Err(TlsForgeError::unrecoverable_key(
                "passphrase unlocks no entry",
            ));
        }
        Ok(store.providers.clone())
    }
}

impl TransportSecurityEngine for TestEngine {
    fn default_verifier_algorithm(&self) -> String {
        VERIFIER_ALGORITHM.to_string()
    }

    fn default_provider_algorithm(&self) -> String {
        PROVIDER_ALGORITHM.to_string()
    }

    fn verifier_factory(&self, algorithm: &str) -> Result<Arc<dyn VerifierFactory>> {
        if self.verifier_factory_available && algorithm == VERIFIER_ALGORITHM {
            Ok(Arc::new(TestVerifierFactory))
        } else {
            Err(TlsForgeError::crypto_provider(format!(
                "no verifier factory for {algorithm}"
            )))
        }
    }

    fn provider_factory(&self, algorithm: &str) -> Result<Arc<dyn ProviderFactory>> {
        if self.provider_factory_available && algorithm == PROVIDER_ALGORITHM {
            Ok(Arc::new(TestProviderFactory))
        } else {
            Err(TlsForgeError::crypto_provider(format!(
                "no provider factory for {algorithm}"
            )))
        }
    }

    fn init_context(
        &self,
        protocol: &str,
        providers: Option<Vec<CredentialProvider>>,
        verifiers: Option<Vec<TrustVerifier>>,
        random: Option<Arc<dyn RandomSource>>,
    ) -> Result<TransportContext> {
        if !PROTOCOLS.contains(&protocol) {
            return Err(TlsForgeError::algorithm_unavailable(format!(
                "unsupported protocol {protocol}"
            )));
        }
        if providers.as_ref().is_some_and(|p| p.is_empty())
            || verifiers.as_ref().is_some_and(|v| v.is_empty())
        {
            return Err(TlsForgeError::context_init(
                "empty array breaks default selection, pass None",
            ));
        }
        Ok(TransportContext::new(protocol, providers, verifiers, random))
    }
}
