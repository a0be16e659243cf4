//! Verilog and SystemVerilog code generation for Sable blocks.
//!
//! [`vast`] is the structured output AST; [`generate_module`] lowers a
//! [`sable_ir::Block`] into one module of it and returns the emitted text
//! together with a port [`ModuleSignature`].

#![warn(missing_docs)]

pub mod error;
pub mod generator;
pub mod signature;
pub mod vast;

pub use error::{CodegenError, VastError};
pub use generator::{generate_module, ModuleGeneratorResult};
pub use sable_ir::sanitize_identifier;
pub use signature::{ModuleSignature, PortSignature, ResetSignature};
