//! Opaque store handles and the material-loader seam
//!
//! Trust and key stores are produced outside this crate (file, URL or stream
//! reading lives behind [`MaterialLoader`]) and handed in as opaque handles.
//! Only the engine's factories know the concrete store representation; this
//! crate never inspects it and never mutates a store after load.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// An opaque certificate store holding trusted anchors.
///
/// Immutable after load. The wrapped handle's concrete type is owned by the
/// transport-security engine; factories downcast it back out.
#[derive(Clone)]
pub struct TrustMaterial {
    handle: Arc<dyn Any + Send + Sync>,
}

impl TrustMaterial {
    /// Wrap an engine-understood trust store handle
    pub fn new(handle: Arc<dyn Any + Send + Sync>) -> Self {
        Self { handle }
    }

    /// The underlying store handle, for engine-side downcasting
    pub fn handle(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.handle
    }
}

impl fmt::Debug for TrustMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustMaterial")
            .field("handle", &"<opaque>")
            .finish()
    }
}

/// An opaque credential store holding private keys and certificate chains.
///
/// Entries may be individually passphrase protected; unlocking happens in the
/// engine's provider factory, not here. Immutable after load.
#[derive(Clone)]
pub struct KeyMaterial {
    handle: Arc<dyn Any + Send + Sync>,
}

impl KeyMaterial {
    /// Wrap an engine-understood key store handle
    pub fn new(handle: Arc<dyn Any + Send + Sync>) -> Self {
        Self { handle }
    }

    /// The underlying store handle, for engine-side downcasting
    pub fn handle(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.handle
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("handle", &"<opaque>")
            .finish()
    }
}

/// Loads key/trust stores from raw bytes.
///
/// All I/O (files, URLs, streams) happens behind this seam, before material is
/// handed to the builder.
pub trait MaterialLoader: Send + Sync {
    /// Parse a trust store from `bytes`.
    ///
    /// # Errors
    /// [`TlsForgeError::Material`](crate::TlsForgeError::Material) when the
    /// bytes are malformed or the passphrase does not open the store.
    fn load_trust_store(&self, bytes: &[u8], passphrase: Option<&[u8]>) -> Result<TrustMaterial>;

    /// Parse a key store from `bytes`.
    ///
    /// # Errors
    /// [`TlsForgeError::Material`](crate::TlsForgeError::Material) when the
    /// bytes are malformed or the passphrase does not open the store.
    fn load_key_store(&self, bytes: &[u8], passphrase: Option<&[u8]>) -> Result<KeyMaterial>;
}
