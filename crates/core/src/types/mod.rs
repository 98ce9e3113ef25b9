//! Core types for SpaceMarket.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod envelope;
pub mod id;
pub mod order;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem};
pub use email::{Email, EmailError};
pub use envelope::{Envelope, ErrorBody};
pub use id::*;
pub use order::{CustomerInfo, CustomerInfoError, Order, OrderContact, OrderItem, OrderLine, OrderRequest};
pub use price::{Price, PriceError};
pub use product::{NewProduct, Product};
