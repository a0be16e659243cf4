//! Signal shapes and declarations.

use super::ids::ExprId;
use sable_common::Ident;

/// Shape of a signal: optional width, signedness, and packed dimensions.
///
/// A `None` width is a scalar (single bit). Packed dimensions are listed
/// outermost first and follow the width range in emitted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataType {
    /// Bit width expression; `None` for a scalar.
    pub width: Option<ExprId>,
    /// Emit the `signed` keyword.
    pub is_signed: bool,
    /// Extra packed dimensions, outermost first.
    pub packed_dims: Vec<ExprId>,
}

impl DataType {
    /// A single-bit scalar.
    pub fn scalar() -> Self {
        Self::default()
    }

    /// A vector of the given width expression.
    pub fn with_width(width: ExprId) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Marks the type signed.
    pub fn signed(mut self) -> Self {
        self.is_signed = true;
        self
    }

    /// Appends a packed dimension.
    pub fn packed_dim(mut self, dim: ExprId) -> Self {
        self.packed_dims.push(dim);
        self
    }

    /// Returns true if no width is declared.
    pub fn is_scalar(&self) -> bool {
        self.width.is_none()
    }
}

/// Storage kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// `reg`
    Reg,
    /// `wire`
    Wire,
    /// `logic`
    Logic,
}

impl DataKind {
    /// Keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            DataKind::Reg => "reg",
            DataKind::Wire => "wire",
            DataKind::Logic => "logic",
        }
    }
}

/// One unpacked array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackedArrayBound {
    /// `[size]`
    Size(ExprId),
    /// `[hi:lo]`
    Range(ExprId, ExprId),
}

/// A named signal declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Def {
    /// Declared name.
    pub name: Ident,
    /// Storage kind.
    pub kind: DataKind,
    /// Shape.
    pub data_type: DataType,
    /// Initial value (`reg x = 0;`).
    pub init: Option<ExprId>,
    /// Unpacked dimensions, outermost first. Empty for plain signals.
    pub unpacked_bounds: Vec<UnpackedArrayBound>,
}
