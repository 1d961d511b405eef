//! Error taxonomy for the vehicle core (§7 of the specification).
//!
//! Malformed input and declared invariant violations are modeled as
//! [`LoadError`] variants so that a loader can name the offending id in a
//! diagnostic. Runtime invariant violations inside hot loops (a welded
//! piece with no `attached_to`, a plumbing path with mismatched ports) are
//! not recoverable and are raised as panics with a descriptive message,
//! matching how the teacher's own loaders `.expect()` on corrupted worlds
//! rather than thread a `Result` through every query.

use thiserror::Error;

/// Errors that can occur while loading a vehicle file (§6.1, §7).
///
/// Every variant names the offending id so the invoking editor/CLI can
/// surface a precise diagnostic, per the propagation policy in §7.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A `[[piece]]` or `[[part]]` table referenced a prototype the asset
    /// manager does not know about.
    #[error("unknown part prototype {proto:?}")]
    UnknownPrototype {
        /// The `"package:name"` string that could not be resolved.
        proto: String,
    },

    /// A piece, part or machine id referenced by another table does not
    /// exist in the file.
    #[error("{kind} references nonexistent {target} id {id}")]
    DanglingReference {
        /// The table doing the referencing, e.g. `"piece.link.to"`.
        kind: &'static str,
        /// What kind of id was expected, e.g. `"piece"`.
        target: &'static str,
        /// The id that could not be resolved.
        id: u32,
    },

    /// A pipe endpoint named a machine id or port id that does not exist.
    #[error("pipe {pipe_index} endpoint {side} references unknown machine/port {machine}/{port}")]
    DanglingPortReference {
        /// Index of the pipe in the `[[pipe]]` array.
        pipe_index: u32,
        /// `"a"` or `"b"`.
        side: &'static str,
        /// The machine id that was referenced.
        machine: String,
        /// The port id that was referenced.
        port: String,
    },

    /// More than one `[[piece]]` table declared `root = true`.
    #[error("vehicle file declares multiple root pieces")]
    MultipleRoots,

    /// No piece in the file was marked as root, so loading could not
    /// determine `Vehicle.root`.
    #[error("vehicle file has no root piece")]
    NoRoot,

    /// The `[[piece]]` array was empty.
    #[error("vehicle file declares no pieces")]
    NoPieces,

    /// A `[[part]]`'s declared `id` exceeds the file's `part_id` bound.
    #[error("part id {id} exceeds declared maximum part_id {max}")]
    PartIdOutOfRange {
        /// The offending part id.
        id: u32,
        /// The declared `part_id` upper bound.
        max: u32,
    },

    /// A `[[piece]]`'s declared `id` exceeds the file's `piece_id` bound.
    #[error("piece id {id} exceeds declared maximum piece_id {max}")]
    PieceIdOutOfRange {
        /// The offending piece id.
        id: u32,
        /// The declared `piece_id` upper bound.
        max: u32,
    },

    /// Attaching a piece would create a cycle in the piece graph.
    #[error("attaching piece {piece} to {attached_to} would create a cycle")]
    CyclicAttachment {
        /// The piece being attached.
        piece: u32,
        /// The piece it would be (transitively) attached to.
        attached_to: u32,
    },

    /// The vehicle is unpacked (has live rigid bodies) and cannot be saved
    /// until repacked (§6.2).
    #[error("cannot save an unpacked vehicle; repack it first")]
    VehicleNotPacked,

    /// A `[[piece]]`'s `transform` array does not represent a rigid
    /// transform, or a non-root piece has no `link` table.
    #[error("piece {piece} has an invalid transform or is missing its link table: {reason}")]
    InvalidPieceTransform {
        /// The offending piece id.
        piece: u32,
        /// Human-readable detail from the underlying validation failure.
        reason: String,
    },

    /// A non-root `[[piece]]` declared no `link` table, so its attachment
    /// point could not be determined.
    #[error("non-root piece {piece} has no link table")]
    MissingLink {
        /// The offending piece id.
        piece: u32,
    },

    /// The underlying TOML document was malformed.
    #[error("malformed vehicle file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serializing a vehicle back to TOML failed, e.g. because a value
    /// could not be represented in the file format.
    #[error("could not serialize vehicle file: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Convenience alias for fallible load operations.
pub type LoadResult<T> = Result<T, LoadError>;
