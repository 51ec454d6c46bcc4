//! # Depot Support
//!
//! Shared helpers for the Depot service registry.
//!
//! This crate provides:
//! - Type-name shortening for diagnostics
//! - "Did you mean" ranking for unknown identifiers

pub mod rendering;
