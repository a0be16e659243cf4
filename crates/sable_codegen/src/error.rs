//! Error types for the Verilog AST and the module generator.

use sable_config::ConfigError;
use sable_ir::IrError;

/// Recoverable failures while building or querying a
/// [`VerilogFile`](crate::vast::VerilogFile).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VastError {
    /// A width or dimension needed as an integer is not a literal.
    #[error("{what} is not a literal: {text}")]
    NotALiteral {
        /// `"width"` or `"dimension"`.
        what: &'static str,
        /// Emitted text of the offending expression.
        text: String,
    },

    /// A literal width or dimension, or a bit count derived from them, does
    /// not fit in an `i64`.
    #[error("{what} {text} does not fit in 64 bits")]
    ValueTooLarge {
        /// `"width"`, `"dimension"` or `"bit count"`.
        what: &'static str,
        /// Emitted text of the offending expression.
        text: String,
    },

    /// A name is declared twice in one scope.
    #[error("'{name}' is already declared in {scope}")]
    DuplicateName {
        /// The repeated name.
        name: String,
        /// Module or file in which it clashed.
        scope: String,
    },

    /// A requested port order names a port twice.
    #[error("port '{0}' appears more than once in the requested order")]
    DuplicatePortInOrder(String),

    /// A requested port order names a port that does not exist.
    #[error("port '{0}' in the requested order does not exist")]
    UnknownPortInOrder(String),

    /// A requested port order leaves out an existing port.
    #[error("port '{0}' is missing from the requested order")]
    MissingPortInOrder(String),
}

/// Failures of [`generate_module`](crate::generate_module).
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The AST rejected a construct.
    #[error(transparent)]
    Vast(#[from] VastError),

    /// The block is inconsistent.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// The generator options are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A register has a reset value but no reset signal is configured.
    #[error("register '{register}' has a reset value but no reset signal is configured")]
    ResetNotConfigured {
        /// Register name.
        register: String,
    },

    /// The block has registers but no clock is available.
    #[error("block '{block}' has registers but no clock port is configured")]
    MissingClock {
        /// Block name.
        block: String,
    },

    /// The block and the options name different clocks.
    #[error("block clock '{block_clock}' does not match configured clock '{configured}'")]
    ClockMismatch {
        /// Clock declared on the block.
        block_clock: String,
        /// Clock named in the options.
        configured: String,
    },

    /// A port has zero width.
    #[error("port '{0}' has zero width")]
    ZeroWidthPort(String),
}
