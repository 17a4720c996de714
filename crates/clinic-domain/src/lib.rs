//! Pure clinic rules: status derivation, phone normalization, pagination
//! envelopes and field validation.
//!
//! No framework or database types live here.

pub mod pagination;
pub mod phone;
pub mod status;
pub mod validation;
