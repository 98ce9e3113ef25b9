//! SpaceMarket admin library.
//!
//! Operator-facing client for the admin routes of the SpaceMarket API:
//! product listing and creation, order listing, and categories.
//!
//! # Security
//!
//! Admin requests are authorized only by the `x-admin-key` header. The key is
//! read from configuration as a secret and never compiled in, but it is still
//! a shared static credential. Keep it out of shells and logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod orders;
pub mod product_form;

pub use client::{AdminClient, Categories, CategorySource};
pub use config::AdminConfig;
pub use error::{AdminError, Result};
pub use orders::OrderRow;
pub use product_form::{CategoryChoice, ProductForm, ProductFormError};
