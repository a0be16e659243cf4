//! Sable IR support: the interval-set abstract domain used by range analysis,
//! trace format strings, and the register-transfer [`Block`] that the code
//! generator lowers into a Verilog module.

#![warn(missing_docs)]

pub mod arena;
pub mod block;
pub mod error;
pub mod format_strings;
pub mod ids;
pub mod interval;
pub mod interval_set;
pub mod name_uniquer;

pub use arena::{Arena, ArenaId};
pub use block::{Block, Node, NodeKind, Port, Register};
pub use error::IrError;
pub use format_strings::{
    operands_expected_by_format, parse_format_string, to_verilog_format, FormatError, FormatStep,
};
pub use ids::{NodeId, RegisterId};
pub use interval::{Cardinality, Interval};
pub use interval_set::IntervalSet;
pub use name_uniquer::{sanitize_identifier, NameUniquer};
