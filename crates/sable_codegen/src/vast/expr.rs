//! Expression nodes and the operator precedence table.
//!
//! Precedence follows IEEE 1364-2005 Table 5-4. Higher binds tighter.
//! Ternary is the loosest; every atom (literal, reference, index, call, ...)
//! has [`MAX_PRECEDENCE`].

use super::ids::{DefId, ExprId, FunctionId};
use sable_common::{Bits, FormatPreference, Ident};

/// Precedence of `?:`.
pub const TERNARY_PRECEDENCE: u8 = 0;

/// Precedence of every prefix operator.
pub const UNARY_PRECEDENCE: u8 = 12;

/// Precedence of expressions that never need parentheses.
pub const MAX_PRECEDENCE: u8 = 13;

/// A prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`).
    Negate,
    /// Bitwise NOT (`~`).
    BitwiseNot,
    /// Logical NOT (`!`).
    LogicalNot,
    /// Reduction AND (`&`).
    AndReduce,
    /// Reduction OR (`|`).
    OrReduce,
    /// Reduction XOR (`^`).
    XorReduce,
}

impl UnaryOp {
    /// Source token.
    pub fn token(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::BitwiseNot => "~",
            UnaryOp::LogicalNot => "!",
            UnaryOp::AndReduce => "&",
            UnaryOp::OrReduce => "|",
            UnaryOp::XorReduce => "^",
        }
    }
}

/// An infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<<`
    Shll,
    /// `>>`
    Shrl,
    /// `>>>`
    Shra,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Power,
}

impl BinaryOp {
    /// Source token.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Shll => "<<",
            BinaryOp::Shrl => ">>",
            BinaryOp::Shra => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Power => "**",
        }
    }

    /// Binding strength; see the module docs.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogicalOr => 1,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::BitwiseOr => 3,
            BinaryOp::BitwiseXor => 4,
            BinaryOp::BitwiseAnd => 5,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Shll | BinaryOp::Shrl | BinaryOp::Shra => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
            BinaryOp::Power => 11,
        }
    }
}

/// An expression node. Children are referenced by [`ExprId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An integer constant.
    Literal {
        /// Value and width.
        bits: Bits,
        /// Radix used for emission.
        format: FormatPreference,
        /// Emit the `<width>'` prefix for decimal literals.
        emit_bit_count: bool,
    },
    /// All-X value of the given width (`8'dx`).
    XSentinel {
        /// Width in bits.
        width: u32,
    },
    /// A reference to a declared signal.
    LogicRef(DefId),
    /// A reference to a `parameter` or `localparam` item.
    ParameterRef(Ident),
    /// A preprocessor macro use (`` `NAME ``).
    MacroRef(String),
    /// A string constant.
    QuotedString(String),
    /// Prefix operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        arg: ExprId,
    },
    /// Infix operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: ExprId,
        /// Right operand.
        rhs: ExprId,
    },
    /// `test ? consequent : alternate`.
    Ternary {
        /// Selector.
        test: ExprId,
        /// Value when `test` is true.
        consequent: ExprId,
        /// Value when `test` is false.
        alternate: ExprId,
    },
    /// `{a, b}` or, replicated, `{n{a, b}}`.
    Concat {
        /// Replication count.
        replication: Option<ExprId>,
        /// Elements, most significant first.
        args: Vec<ExprId>,
    },
    /// `'{a, b}`.
    ArrayAssignmentPattern(Vec<ExprId>),
    /// `subject[index]`.
    Index {
        /// Indexed expression.
        subject: ExprId,
        /// Bit or element index.
        index: ExprId,
    },
    /// `subject[hi:lo]`.
    Slice {
        /// Sliced expression.
        subject: ExprId,
        /// Upper bound.
        hi: ExprId,
        /// Lower bound.
        lo: ExprId,
    },
    /// `subject[start +: width]`.
    PartSelect {
        /// Selected expression.
        subject: ExprId,
        /// Start bit.
        start: ExprId,
        /// Width of the selection.
        width: ExprId,
    },
    /// Call of a function defined in the file.
    FunctionCall {
        /// Callee.
        function: FunctionId,
        /// Arguments.
        args: Vec<ExprId>,
    },
    /// `$name(args)` or `$name`.
    SystemFunctionCall {
        /// Name without the `$`.
        name: String,
        /// Arguments; `None` omits the parentheses.
        args: Option<Vec<ExprId>>,
    },
    /// `posedge e`.
    PosEdge(ExprId),
    /// `negedge e`.
    NegEdge(ExprId),
}

impl Expr {
    /// Binding strength used to decide parenthesization.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Ternary { .. } => TERNARY_PRECEDENCE,
            _ => MAX_PRECEDENCE,
        }
    }

    /// Returns true for [`Expr::Literal`].
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal { .. })
    }

    /// Returns true for [`Expr::Unary`].
    pub fn is_unary(&self) -> bool {
        matches!(self, Expr::Unary { .. })
    }

    /// Returns true for [`Expr::LogicRef`].
    pub fn is_logic_ref(&self) -> bool {
        matches!(self, Expr::LogicRef(_))
    }

    /// Returns true if the expression may be indexed or sliced.
    pub fn is_indexable(&self) -> bool {
        matches!(
            self,
            Expr::LogicRef(_)
                | Expr::ParameterRef(_)
                | Expr::Index { .. }
                | Expr::Slice { .. }
                | Expr::PartSelect { .. }
        )
    }

    /// Returns true if this is a literal equal to `value`.
    pub fn is_literal_with_value(&self, value: u64) -> bool {
        match self {
            Expr::Literal { bits, .. } => bits.to_u64() == Some(value),
            _ => false,
        }
    }

    /// The literal value, if this is a literal.
    pub fn as_literal(&self) -> Option<&Bits> {
        match self {
            Expr::Literal { bits, .. } => Some(bits),
            _ => None,
        }
    }
}
