//! Entity identity representations
//!
//! An entity is addressed by a primary key that takes one of three
//! representations. The set is closed: [`Identity`] is the tagged union and
//! [`IdentityValue`] is the compile-time witness a decoder uses to pick the
//! representation, since frames carry no type tag for the identity.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Discriminates between identity representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKind {
    /// 64-bit signed integer, 8 bytes on the wire
    Int,
    /// UUID, canonical text on the wire
    Uuid,
    /// Opaque string, UTF-8 on the wire
    Str,
}

impl IdentityKind {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            IdentityKind::Int => "int64",
            IdentityKind::Uuid => "uuid",
            IdentityKind::Str => "string",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entity identity value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// 64-bit signed integer key
    Int(i64),
    /// UUID key
    Uuid(Uuid),
    /// String key
    Str(String),
}

impl Identity {
    /// Representation of this identity
    pub fn kind(&self) -> IdentityKind {
        match self {
            Identity::Int(_) => IdentityKind::Int,
            Identity::Uuid(_) => IdentityKind::Uuid,
            Identity::Str(_) => IdentityKind::Str,
        }
    }

    /// Convert a dynamically typed identity into the closed union.
    ///
    /// Accepts `i64`, `Uuid`, `String` and `&'static str`. Any other type
    /// fails with [`Error::UnsupportedIdentityType`] carrying
    /// `event_type_code` for diagnosis.
    pub fn from_dyn(value: &dyn Any, event_type_code: &str) -> Result<Identity> {
        if let Some(id) = value.downcast_ref::<i64>() {
            return Ok(Identity::Int(*id));
        }
        if let Some(id) = value.downcast_ref::<Uuid>() {
            return Ok(Identity::Uuid(*id));
        }
        if let Some(id) = value.downcast_ref::<String>() {
            return Ok(Identity::Str(id.clone()));
        }
        if let Some(id) = value.downcast_ref::<&'static str>() {
            return Ok(Identity::Str((*id).to_string()));
        }
        Err(Error::UnsupportedIdentityType {
            event_type_code: event_type_code.to_string(),
        })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Int(id) => write!(f, "{}", id),
            Identity::Uuid(id) => write!(f, "{}", id),
            Identity::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for Identity {
    fn from(id: i64) -> Self {
        Identity::Int(id)
    }
}

impl From<Uuid> for Identity {
    fn from(id: Uuid) -> Self {
        Identity::Uuid(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Identity::Str(id)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Identity::Str(id.to_string())
    }
}

/// A concrete identity type usable as an entity primary key.
///
/// `KIND` is the witness decoders rely on: the frame does not record which
/// representation produced the identity bytes.
pub trait IdentityValue: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Representation used on the wire
    const KIND: IdentityKind;

    /// Wrap into the tagged union
    fn to_identity(&self) -> Identity;

    /// Unwrap from the tagged union.
    ///
    /// Returns `None` if `identity` has a different representation.
    fn from_identity(identity: Identity) -> Option<Self>;
}

impl IdentityValue for i64 {
    const KIND: IdentityKind = IdentityKind::Int;

    fn to_identity(&self) -> Identity {
        Identity::Int(*self)
    }

    fn from_identity(identity: Identity) -> Option<Self> {
        match identity {
            Identity::Int(id) => Some(id),
            _ => None,
        }
    }
}

impl IdentityValue for Uuid {
    const KIND: IdentityKind = IdentityKind::Uuid;

    fn to_identity(&self) -> Identity {
        Identity::Uuid(*self)
    }

    fn from_identity(identity: Identity) -> Option<Self> {
        match identity {
            Identity::Uuid(id) => Some(id),
            _ => None,
        }
    }
}

impl IdentityValue for String {
    const KIND: IdentityKind = IdentityKind::Str;

    fn to_identity(&self) -> Identity {
        Identity::Str(self.clone())
    }

    fn from_identity(identity: Identity) -> Option<Self> {
        match identity {
            Identity::Str(id) => Some(id),
            _ => None,
        }
    }
}
