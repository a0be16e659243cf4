//! Modules, their members, and file-level items.

use super::ids::{BlockId, DefId, ExprId, FlopId, FunctionId, LocalParamId, ModuleId, SectionId};
use sable_common::Ident;
use std::collections::HashSet;
use std::fmt;

/// Output dialect of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// IEEE 1364 Verilog.
    Verilog,
    /// IEEE 1800 SystemVerilog.
    SystemVerilog,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Input => "input",
            Direction::Output => "output",
        })
    }
}

/// A module port: a direction and the wire it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    /// Direction.
    pub direction: Direction,
    /// The declared wire.
    pub def: DefId,
}

/// A module definition.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name.
    pub name: Ident,
    /// Ports in declaration order.
    pub ports: Vec<Port>,
    /// Root member section.
    pub top: SectionId,
    pub(crate) names: HashSet<Ident>,
}

/// An ordered group of module members. Sections may nest; nesting does not
/// affect emitted order.
#[derive(Debug, Clone)]
pub struct ModuleSection {
    /// Owning module.
    pub module: ModuleId,
    /// Members in insertion order.
    pub members: Vec<ModuleMember>,
}

/// `.name(expr)` in an instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Port or parameter name.
    pub name: String,
    /// Connected expression.
    pub expr: ExprId,
}

/// An instance of another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    /// Instantiated module.
    pub module_name: String,
    /// Instance name.
    pub instance_name: String,
    /// Parameter overrides, in order.
    pub parameters: Vec<Connection>,
    /// Port connections, in order.
    pub connections: Vec<Connection>,
}

impl Instantiation {
    /// Creates an instantiation with no connections.
    pub fn new(module_name: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            instance_name: instance_name.into(),
            parameters: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Adds a parameter override.
    pub fn parameter(mut self, name: impl Into<String>, expr: ExprId) -> Self {
        self.parameters.push(Connection {
            name: name.into(),
            expr,
        });
        self
    }

    /// Adds a port connection.
    pub fn connect(mut self, name: impl Into<String>, expr: ExprId) -> Self {
        self.connections.push(Connection {
            name: name.into(),
            expr,
        });
        self
    }
}

/// Kind of an `always`/`initial` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    /// `always @ (...)`
    Always,
    /// `always_ff @ (...)`
    AlwaysFf,
    /// `always_comb`
    AlwaysComb,
    /// `initial`
    Initial,
}

impl ProcedureKind {
    /// Keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            ProcedureKind::Always => "always",
            ProcedureKind::AlwaysFf => "always_ff",
            ProcedureKind::AlwaysComb => "always_comb",
            ProcedureKind::Initial => "initial",
        }
    }

    /// Returns true if the kind is written with a sensitivity list.
    pub fn has_sensitivity_list(self) -> bool {
        matches!(self, ProcedureKind::Always | ProcedureKind::AlwaysFf)
    }
}

/// One entry of a sensitivity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitivityListElement {
    /// `*`
    Implicit,
    /// `posedge e`
    PosEdge(ExprId),
    /// `negedge e`
    NegEdge(ExprId),
}

/// An `always`, `always_ff`, `always_comb` or `initial` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredProcedure {
    /// Which keyword.
    pub kind: ProcedureKind,
    /// Sensitivity list; empty for `always_comb` and `initial`.
    pub sensitivity: Vec<SensitivityListElement>,
    /// Body.
    pub body: BlockId,
}

/// Reset wiring for an [`AlwaysFlop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reset {
    /// Reset signal.
    pub signal: ExprId,
    /// Included in the sensitivity list.
    pub asynchronous: bool,
    /// Asserted when low.
    pub active_low: bool,
}

/// A clocked block assigning a set of registers, with optional reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlwaysFlop {
    /// Clock signal.
    pub clk: ExprId,
    /// Reset wiring.
    pub reset: Option<Reset>,
    /// Outer block of the procedure.
    pub top_block: BlockId,
    /// Branch taken while reset is asserted.
    pub reset_block: Option<BlockId>,
    /// Branch holding the steady-state assignments.
    pub assignment_block: BlockId,
}

/// `localparam` with one or more items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalParam {
    /// Module whose namespace the item names live in.
    pub module: ModuleId,
    /// `(name, value)` items in order.
    pub items: Vec<(Ident, ExprId)>,
}

/// `function automatic ... endfunction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerilogFunction {
    /// Function name (also the return-value variable).
    pub name: Ident,
    /// Declaration of the return value.
    pub return_def: DefId,
    /// Input arguments in order.
    pub args: Vec<DefId>,
    /// Local `reg` declarations.
    pub locals: Vec<DefId>,
    /// Body.
    pub body: BlockId,
}

/// Anything that may appear inside a module body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleMember {
    /// A signal declaration.
    Def(DefId),
    /// `localparam`.
    LocalParam(LocalParamId),
    /// `parameter name = value;`
    Parameter {
        /// Parameter name.
        name: Ident,
        /// Default value.
        value: ExprId,
    },
    /// Instance of another module.
    Instantiation(Instantiation),
    /// `assign lhs = rhs;`
    ContinuousAssignment {
        /// Target.
        lhs: ExprId,
        /// Value.
        rhs: ExprId,
    },
    /// `// text`
    Comment(String),
    /// An empty line.
    BlankLine,
    /// Text emitted verbatim.
    Raw(String),
    /// `always`/`initial` block.
    StructuredProcedure(StructuredProcedure),
    /// Clocked register block.
    AlwaysFlop(FlopId),
    /// Function definition.
    Function(FunctionId),
    /// Nested section.
    Section(SectionId),
}

/// A top-level item of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMember {
    /// `` `include "path" ``
    Include(String),
    /// A module definition.
    Module(ModuleId),
}
