//! VAST: an arena-backed Verilog/SystemVerilog AST and its text emitter.
//!
//! A [`VerilogFile`] owns every node. Builders on the file allocate nodes and
//! return typed IDs; emission walks those IDs and produces deterministic
//! text, parenthesizing by operator precedence.

pub mod data_type;
pub mod emit;
pub mod expr;
pub mod file;
pub mod ids;
pub mod module;
pub mod stmt;

pub use data_type::{DataKind, DataType, Def, UnpackedArrayBound};
pub use emit::indent;
pub use expr::{BinaryOp, Expr, UnaryOp, MAX_PRECEDENCE, TERNARY_PRECEDENCE, UNARY_PRECEDENCE};
pub use file::VerilogFile;
pub use ids::{
    BlockId, DefId, ExprId, FlopId, FunctionId, LocalParamId, ModuleId, SectionId, StmtId,
};
pub use module::{
    AlwaysFlop, Connection, Direction, FileMember, FileType, Instantiation, LocalParam, Module,
    ModuleMember, ModuleSection, Port, ProcedureKind, Reset, SensitivityListElement,
    StructuredProcedure, VerilogFunction,
};
pub use stmt::{Case, CaseLabel, Conditional, Statement, StatementBlock};
