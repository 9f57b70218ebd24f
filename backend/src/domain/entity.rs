//! Persisted entity abstraction shared by every repository.
//!
//! An [`Entity`] is created from a draft (`Entity::Draft`) once the store has
//! assigned its identifier. Drafts carry everything the caller supplies; the
//! store supplies the rest.

use std::fmt;
use std::hash::Hash;

/// Integer-backed entity identifier.
pub trait EntityId:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Wrap a raw store key.
    fn from_raw(raw: i32) -> Self;

    /// Unwrap to the raw store key.
    fn get(self) -> i32;
}

/// A uniqueness constraint value declared by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    /// Constraint name, stable across rows of the same entity.
    pub constraint: &'static str,
    /// Normalised value that must be unique within the constraint.
    pub value: String,
}

impl UniqueKey {
    /// Build a unique key for `constraint`.
    pub fn new(constraint: &'static str, value: impl Into<String>) -> Self {
        Self {
            constraint,
            value: value.into(),
        }
    }
}

/// A foreign key held by a row: the referenced entity's kind and raw id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    /// [`Entity::KIND`] of the referenced entity.
    pub kind: &'static str,
    pub id: i32,
}

impl Reference {
    /// Reference to the `T` row with `id`.
    pub fn to<T: Entity>(id: T::Id) -> Self {
        Self {
            kind: T::KIND,
            id: id.get(),
        }
    }
}

/// A persisted domain object.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Store-assigned identifier.
    type Id: EntityId;
    /// The entity before the store has assigned an identifier.
    type Draft: Send + Sync + 'static;

    /// Human-readable entity name used in error messages.
    const KIND: &'static str;

    /// The entity's identifier.
    fn id(&self) -> Self::Id;

    /// Combine a draft with its newly assigned identifier.
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    /// Uniqueness constraints the store must enforce for this row.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    /// Rows this row points at. Every reference must resolve when the
    /// transaction that wrote the row commits.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// Define an `i32` newtype identifier implementing [`EntityId`].
macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl $crate::domain::EntityId for $name {
            fn from_raw(raw: i32) -> Self {
                Self(raw)
            }

            fn get(self) -> i32 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }
    };
}

pub(crate) use define_entity_id;
