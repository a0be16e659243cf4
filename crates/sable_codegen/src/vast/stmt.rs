//! Procedural statements.

use super::ids::{BlockId, ExprId, StmtId};

/// A `begin ... end` sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBlock {
    /// Statements in execution order.
    pub statements: Vec<StmtId>,
}

/// `if / else if / else` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    /// Test of the leading `if`.
    pub condition: ExprId,
    /// Body of the leading `if`.
    pub consequent: BlockId,
    /// `else if` (with a condition) and `else` (without) branches in order.
    pub alternates: Vec<(Option<ExprId>, BlockId)>,
}

impl Conditional {
    /// Returns true once an unconditional `else` has been added.
    pub fn is_closed(&self) -> bool {
        matches!(self.alternates.last(), Some((None, _)))
    }
}

/// Label of a case arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseLabel {
    /// Matches a value.
    Expr(ExprId),
    /// `default`.
    Default,
}

/// `case (subject) ... endcase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// Value being matched.
    pub subject: ExprId,
    /// Arms in emission order.
    pub arms: Vec<(CaseLabel, BlockId)>,
}

/// A procedural statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `lhs = rhs;`
    BlockingAssignment {
        /// Target.
        lhs: ExprId,
        /// Value.
        rhs: ExprId,
    },
    /// `lhs <= rhs;`
    NonblockingAssignment {
        /// Target.
        lhs: ExprId,
        /// Value.
        rhs: ExprId,
    },
    /// `if` chain.
    Conditional(Conditional),
    /// `case` statement.
    Case(Case),
    /// `while (condition) body`
    While {
        /// Loop test.
        condition: ExprId,
        /// Loop body.
        body: BlockId,
    },
    /// `repeat (count) statement`
    Repeat {
        /// Iteration count.
        count: ExprId,
        /// Repeated statement.
        statement: StmtId,
    },
    /// `@(event);`
    EventControl(ExprId),
    /// `#delay statement` or `#delay;`
    Delay {
        /// Delay amount.
        delay: ExprId,
        /// Delayed statement, if any.
        statement: Option<StmtId>,
    },
    /// `wait(event);`
    Wait(ExprId),
    /// `forever statement`
    Forever(StmtId),
    /// `$name(args);` or `$name;`
    SystemTaskCall {
        /// Task name without the `$`.
        name: String,
        /// Arguments; `None` omits the parentheses.
        args: Option<Vec<ExprId>>,
    },
    /// `assert (condition) else $fatal(0, "message");`
    Assert {
        /// Asserted condition.
        condition: ExprId,
        /// Failure message; empty omits it.
        message: String,
    },
    /// `// text`
    Comment(String),
    /// Text emitted verbatim.
    Raw(String),
    /// A nested `begin ... end`.
    Block(BlockId),
}
