//! ATL Urban Farms Admin library.
//!
//! This crate provides the back-office API as a library, allowing it to be
//! tested and reused. The core of it is the gift card ledger: issuance,
//! redemption, refunds, manual adjustments, and status management, all
//! recorded as append-only transactions.
//!
//! # Security
//!
//! This crate has access to the admin-only `PostgreSQL` database and the
//! stored third-party integration credentials. Only deploy behind the
//! internal network and the auth gateway.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
