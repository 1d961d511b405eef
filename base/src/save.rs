//! Stable-id cross-referencing for the vehicle file format (§6.1).
//!
//! The file format references pieces, parts and machines by plain integer
//! ids rather than by position in an array, so that arrays can be emitted in
//! whatever order the in-memory arena iterates them. [`Id<T>`] is a
//! phantom-typed wrapper around that integer so that, for instance, a
//! `piece.part` field can't accidentally be compared against a piece id.
//!
//! This mirrors the teacher's `save::Id<D>` type, adapted from a dynamic
//! per-definition-type registry (this file format has a small fixed set of
//! tables, not a plugin registry of save record kinds) down to a plain
//! newtype used directly in the `serde` structs that model §6.1.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// An integer id scoped to a particular kind of entity `T`.
///
/// `T` is never constructed; it only disambiguates ids of different kinds
/// at the type level (a part id and a piece id are both `u32` on disk, but
/// should never be interchangeable in Rust).
pub struct Id<T>(u32, PhantomData<fn() -> T>);

impl<T> Id<T> {
    /// Constructs an id from a raw integer.
    #[must_use]
    pub fn new(raw: u32) -> Self { Self(raw, PhantomData) }

    /// Returns the raw integer backing this id.
    #[must_use]
    pub fn raw(self) -> u32 { self.0 }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self { *self }
}
impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}
impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}
impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.0.cmp(&other.0) }
}

impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.0.hash(state); }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Id::new)
    }
}

/// Allocates sequential ids for a kind of entity while saving (§6.1 saver
/// contract: "assign fresh sequential ids ... starting at 1").
pub struct IdAllocator<T> {
    next: u32,
    _ph: PhantomData<fn() -> T>,
}

impl<T> Default for IdAllocator<T> {
    fn default() -> Self { Self { next: 1, _ph: PhantomData } }
}

impl<T> IdAllocator<T> {
    /// Allocates the next sequential id.
    pub fn alloc(&mut self) -> Id<T> {
        let id = Id::new(self.next);
        self.next += 1;
        id
    }

    /// The maximum id allocated so far, i.e. the `part_id`/`piece_id`
    /// bound to emit at the top of the file.
    #[must_use]
    pub fn max(&self) -> u32 { self.next.saturating_sub(1) }
}
