//! Insertion-ordered alias ledger used during credential selection

use rustls_pki_types::CertificateDer;

/// One selectable identity: key algorithm plus its certificate chain.
///
/// Rebuilt fresh on every selection call rather than cached, because the set
/// of valid aliases can change between connections (store reload).
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialDetails {
    /// Key algorithm name, e.g. `"RSA"`
    pub key_type: String,
    /// Certificate chain for the alias, leaf first
    pub chain: Vec<CertificateDer<'static>>,
}

impl CredentialDetails {
    /// Details for one alias
    pub fn new(key_type: impl Into<String>, chain: Vec<CertificateDer<'static>>) -> Self {
        Self {
            key_type: key_type.into(),
            chain,
        }
    }
}

/// Ordered mapping from alias name to [`CredentialDetails`].
///
/// Built transiently during each alias-selection call and handed to the
/// [`AliasPolicy`](crate::AliasPolicy). Re-inserting an existing alias
/// overwrites its details but keeps its original position, so a policy that
/// breaks ties by scanning in order sees aliases in first-enumeration order
/// while the details reflect the last key type enumerated.
#[derive(Debug, Clone, Default)]
pub struct AliasLedger {
    entries: Vec<(String, CredentialDetails)>,
}

impl AliasLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the details for `alias`
    pub fn insert(&mut self, alias: impl Into<String>, details: CredentialDetails) {
        let alias = alias.into();
        match self.entries.iter_mut().find(|(name, _)| *name == alias) {
            Some((_, existing)) => *existing = details,
            None => self.entries.push((alias, details)),
        }
    }

    /// Details for `alias`, if present
    pub fn get(&self, alias: &str) -> Option<&CredentialDetails> {
        self.entries
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, details)| details)
    }

    /// Aliases in insertion order
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CredentialDetails)> {
        self.entries
            .iter()
            .map(|(name, details)| (name.as_str(), details))
    }

    /// Number of distinct aliases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no aliases were enumerated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
