//! Spice Hub Core - Shared types and view-model logic.
//!
//! This crate provides what every Spice Hub component agrees on:
//! - `api` - REST backend
//! - `client` - typed HTTP client and cart/wishlist stores
//! - `storefront` / `admin` - server-rendered web frontends
//! - `cli` - migrations, seeding, and exports
//!
//! # Architecture
//!
//! The core crate contains types and pure functions only - no I/O, no
//! database access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, statuses, and money helpers
//! - [`models`] - Wire models of the REST API
//! - [`pricing`] - Line totals, shipping, and checkout totals
//! - [`invoice`] - Plain-text order invoices
//! - [`listing`] - Catalog filter, sort, and pagination
//! - [`tracking`] - Order progress steps
//! - [`analytics`] - Dashboard aggregates
//! - [`export`] - Order and customer exports
//! - [`bundles`] - Smart-shop bundles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod bundles;
pub mod export;
pub mod invoice;
pub mod listing;
pub mod models;
pub mod pricing;
pub mod tracking;
pub mod types;

pub use types::*;
