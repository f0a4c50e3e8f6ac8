//! Core types for eventgrain
//!
//! This crate defines the foundational types used throughout the system:
//! - Identity: closed union of entity key representations (int64, UUID, string)
//! - IdentityValue: compile-time witness used to decode identity bytes
//! - Error: Error type hierarchy
//! - Limits: per-section frame size limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod identity;
pub mod limits;

pub use error::{Error, Result};
pub use identity::{Identity, IdentityKind, IdentityValue};
pub use limits::{MAX_BASE_BYTES, MAX_EVENT_BYTES, MAX_EVENT_TYPE_BYTES, MAX_IDENTITY_BYTES};
