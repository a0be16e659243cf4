//! Shared foundational types for the Sable hardware-synthesis backend.
//!
//! This crate provides the arbitrary-width [`Bits`] value used by range
//! analysis and Verilog emission, interned identifiers, and content hashes
//! for generated artifacts.

#![warn(missing_docs)]

pub mod bits;
pub mod hash;
pub mod ident;

pub use bits::{Bits, FormatPreference};
pub use hash::ContentHash;
pub use ident::{Ident, Interner};
