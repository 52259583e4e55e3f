//! Tricity Core - Shared types library.
//!
//! This crate provides common types used across the Tricity Commerce
//! components:
//! - `api` - Public REST backend (catalog, cart, orders, payments)
//! - `integration-tests` - Cross-crate contract tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
