//! Shopfront Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront server:
//! usernames and the placeholder emails derived from them, provider-assigned
//! user identifiers, server timestamps, and passthrough documents.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no provider clients, no HTTP.
//! Everything that talks to the identity provider or the document store lives
//! in the storefront crate behind adapter traits.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for usernames, emails, identifiers,
//!   timestamps, and documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
