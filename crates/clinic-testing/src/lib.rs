//! Test utilities for clinic services.
//!
//! Provides `MockAuth` identity injection and an in-memory migrated database.
//! Import in tests only; never in production code.

pub mod auth;
pub mod db;
