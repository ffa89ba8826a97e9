//! Conker Core - Shared domain types.
//!
//! This crate provides the value types used by the storefront library and
//! the command-line front end:
//! - `storefront` - Cart store, catalog client and checkout views
//! - `cli` - Command-line driver for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP clients.
//! Every type validates on construction and on deserialization, so a value
//! that exists is a value that is valid.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices and stock limits

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
