//! SpaceMarket storefront library.
//!
//! Shopper-facing client logic: browsing the catalog, keeping a local cart,
//! and checking out against the SpaceMarket API. Views (terminal or
//! otherwise) sit on top of [`state::Storefront`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod navbar;
pub mod state;

pub use error::{Result, StorefrontError};
pub use state::Storefront;
