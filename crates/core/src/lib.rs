//! SpaceMarket Core - Shared types library.
//!
//! This crate provides the domain types used across all SpaceMarket components:
//! - `storefront` - Catalog, cart and checkout client
//! - `admin` - Admin panel client
//! - `cli` - Terminal front end over both
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, emails, products, carts and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
