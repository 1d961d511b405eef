//! Common utility framework shared by the vehicle core crates.
//!
//! This crate has no notion of pieces, parts or fluids; it only provides the
//! plumbing (pun intended) that the domain crates build on: transform math,
//! a stable-id save framework, and the error/diagnostics taxonomy from the
//! vehicle core specification.

pub mod error;
pub mod math;
pub mod save;

pub use error::{LoadError, LoadResult};
pub use math::Transform;
