//! Auth types shared across clinic services.
//!
//! Provides the `IdentityHeaders` extractor for gateway-injected identity.

pub mod identity;
