//! Error types for building and editing a [`Block`](crate::Block).

use crate::format_strings::FormatError;

/// Recoverable failures reported by [`Block`](crate::Block) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// A port with this name already exists.
    #[error("block already has a port named '{0}'")]
    DuplicatePort(String),

    /// A port name is not a legal identifier.
    #[error("'{0}' is not a valid port name")]
    InvalidPortName(String),

    /// The block already has a clock port.
    #[error("block already has clock port '{existing}', cannot add '{requested}'")]
    ClockAlreadyExists {
        /// Name of the existing clock.
        existing: String,
        /// Name that was requested.
        requested: String,
    },

    /// A register name is not a legal identifier.
    #[error("'{0}' is not a valid register name")]
    InvalidRegisterName(String),

    /// A register with this name already exists.
    #[error("block already has a register named '{0}'")]
    DuplicateRegister(String),

    /// A port and a register would share a name.
    #[error("name '{0}' is used by both a port and a register")]
    PortRegisterCollision(String),

    /// No register has this name.
    #[error("no register named '{0}'")]
    RegisterNotFound(String),

    /// A register ID does not refer to a live register.
    #[error("register {0} does not exist")]
    InvalidRegister(u32),

    /// Registers must be at least one bit wide.
    #[error("register '{0}' must have a non-zero width")]
    ZeroWidthRegister(String),

    /// Two values that must agree in width do not.
    #[error("width mismatch for {what}: expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// What was being checked.
        what: String,
        /// Required width.
        expected: u32,
        /// Width actually supplied.
        actual: u32,
    },

    /// The register is still read or written by some node.
    #[error("register '{name}' is still used by {users} node(s)")]
    RegisterInUse {
        /// Register name.
        name: String,
        /// Number of reads and writes referring to it.
        users: usize,
    },

    /// A register has no read (or write) node.
    #[error("register '{register}' has no {access} node")]
    NoRegisterAccess {
        /// Register name.
        register: String,
        /// `"read"` or `"write"`.
        access: &'static str,
    },

    /// A register has more than one read (or write) node.
    #[error("register '{register}' has {count} {access} nodes, expected exactly one")]
    MultipleRegisterAccesses {
        /// Register name.
        register: String,
        /// `"read"` or `"write"`.
        access: &'static str,
        /// Number found.
        count: usize,
    },

    /// The node is still an operand of other nodes.
    #[error("node '{name}' still has {users} user(s)")]
    NodeHasUsers {
        /// Node name.
        name: String,
        /// Number of users.
        users: usize,
    },

    /// A node ID does not refer to a live node.
    #[error("node {0} does not exist")]
    NodeNotFound(u32),

    /// A node was used where a value-producing node is required.
    #[error("node '{0}' does not produce a value")]
    NotAValue(String),

    /// The trace argument count does not match its format string.
    #[error("trace format expects {expected} argument(s) but {actual} were given")]
    TraceArgumentCount {
        /// Substitutions in the format.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
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

    /// A trace format string failed to parse.
    #[error(transparent)]
    Format(#[from] FormatError),
}
