//! Go Marketplace Core - Shared cart types library.
//!
//! This crate provides the domain types used across all Go Marketplace components:
//! - `cart` - Cart state container with persistence
//! - `cli` - Command-line tools for inspecting and editing a local cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! storage access, no async runtime. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated product IDs, prices, line items and cart snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
