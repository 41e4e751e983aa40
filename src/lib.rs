//! # tlsforge
//!
//! Composable construction of negotiated-protocol secure-transport (TLS/SSL)
//! contexts. Callers override default certificate-chain verification and
//! default alias selection through small policy objects, without touching the
//! handshake machinery itself, which stays inside an injected
//! transport-security engine.
//!
//! ## Architecture
//!
//! ```text
//! ContextBuilder
//! ├── protocol + RandomSource
//! ├── TrustVerifier set     (deduplicated by identity)
//! │   └── TrustDelegate     (base verifier + TrustPolicy)
//! ├── CredentialProvider set
//! │   └── IdentityDelegate  (base provider + AliasPolicy)
//! │       └── AliasLedger   (alias → CredentialDetails, per selection call)
//! └── build() → engine.init_context() → TransportContext
//! ```
//!
//! Policy hooks sit at exactly the two places application trust decisions
//! legitimately occur: server-certificate-chain acceptance and credential
//! alias selection. Path validation, record framing, cipher negotiation and
//! socket I/O are the engine's job, and store loading belongs to an external
//! [`MaterialLoader`].
//!
//! The builder is single-owner during configuration; built contexts and their
//! delegates are immutable and safe for concurrent handshakes.

#![forbid(unsafe_code)]
#![deny(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(missing_debug_implementations)]

mod builder;
mod context;
mod engine;
mod error;
mod ledger;
mod material;
mod provider;
mod verifier;

pub use builder::{ContextBuilder, SSL, TLS};

pub use context::TransportContext;

pub use engine::{ProviderFactory, RandomSource, TransportSecurityEngine, VerifierFactory};

pub use error::{ChainValidationError, Result, TlsForgeError};

pub use ledger::{AliasLedger, CredentialDetails};

pub use material::{KeyMaterial, MaterialLoader, TrustMaterial};

pub use provider::{
    AliasPolicy, ConnectionContext, CredentialProvider, IdentityDelegate, X509CredentialProvider,
};

pub use verifier::{IssuerName, TrustDelegate, TrustPolicy, TrustVerifier, X509TrustVerifier};
