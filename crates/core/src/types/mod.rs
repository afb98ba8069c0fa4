//! Core types for ATL Urban Farms.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod email;
pub mod id;
pub mod status;

pub use code::{CODE_ALPHABET, CODE_LENGTH, CodeError, GiftCardCode};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
