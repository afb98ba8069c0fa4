//! ATL Urban Farms Core - Shared types library.
//!
//! This crate provides common types used across all ATL Urban Farms
//! components:
//! - `admin` - Internal back-office (gift card ledger, integrations settings)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, statuses, and
//!   the gift card code generator

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
