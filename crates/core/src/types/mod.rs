//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod document;
pub mod email;
pub mod id;
pub mod timestamp;
pub mod username;

pub use document::{Direction, Document, DocumentWrite, OrderBy};
pub use email::{Email, EmailError};
pub use id::Uid;
pub use timestamp::{Timestamp, TimestampError};
pub use username::{DEFAULT_EMAIL_DOMAIN, Username};
