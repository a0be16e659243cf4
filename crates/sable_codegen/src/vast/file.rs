//! [`VerilogFile`]: the owner of every node in one output unit.
//!
//! All AST nodes live in per-kind arenas inside the file and refer to each
//! other by ID, so a finished file is a plain tree of indices that can be
//! shared read-only across threads for emission.

use super::data_type::{DataKind, DataType, Def, UnpackedArrayBound};
use super::expr::{BinaryOp, Expr, UnaryOp};
use super::ids::{
    BlockId, DefId, ExprId, FlopId, FunctionId, LocalParamId, ModuleId, SectionId, StmtId,
};
use super::module::{
    AlwaysFlop, Direction, FileMember, FileType, Instantiation, LocalParam, Module,
    ModuleMember, ModuleSection, Port, ProcedureKind, Reset, SensitivityListElement,
    StructuredProcedure, VerilogFunction,
};
use super::stmt::{Case, CaseLabel, Conditional, Statement, StatementBlock};
use crate::error::VastError;
use sable_common::{Bits, FormatPreference, Ident, Interner};
use sable_ir::Arena;
use std::collections::{HashMap, HashSet};

/// Width of the plain integer literals used for widths, indices and counts.
const PLAIN_LITERAL_WIDTH: u32 = 32;

/// A Verilog or SystemVerilog source file under construction.
pub struct VerilogFile {
    file_type: FileType,
    interner: Interner,
    pub(crate) exprs: Arena<ExprId, Expr>,
    pub(crate) stmts: Arena<StmtId, Statement>,
    pub(crate) blocks: Arena<BlockId, StatementBlock>,
    pub(crate) defs: Arena<DefId, Def>,
    pub(crate) modules: Arena<ModuleId, Module>,
    pub(crate) sections: Arena<SectionId, ModuleSection>,
    pub(crate) flops: Arena<FlopId, AlwaysFlop>,
    pub(crate) localparams: Arena<LocalParamId, LocalParam>,
    pub(crate) functions: Arena<FunctionId, VerilogFunction>,
    pub(crate) members: Vec<FileMember>,
    module_names: HashSet<Ident>,
}

impl VerilogFile {
    /// Creates an empty file of the given dialect.
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            interner: Interner::new(),
            exprs: Arena::new(),
            stmts: Arena::new(),
            blocks: Arena::new(),
            defs: Arena::new(),
            modules: Arena::new(),
            sections: Arena::new(),
            flops: Arena::new(),
            localparams: Arena::new(),
            functions: Arena::new(),
            members: Vec::new(),
            module_names: HashSet::new(),
        }
    }

    /// Output dialect.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Resolves an interned name.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Top-level members in order.
    pub fn members(&self) -> &[FileMember] {
        &self.members
    }

    // ---- node access ----

    /// Expression by ID.
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    /// Statement by ID.
    pub fn statement(&self, id: StmtId) -> &Statement {
        &self.stmts[id]
    }

    /// Statement block by ID.
    pub fn block(&self, id: BlockId) -> &StatementBlock {
        &self.blocks[id]
    }

    /// Declaration by ID.
    pub fn def(&self, id: DefId) -> &Def {
        &self.defs[id]
    }

    /// Declared name of a def.
    pub fn def_name(&self, id: DefId) -> &str {
        self.resolve(self.defs[id].name)
    }

    /// Module by ID.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Name of a module.
    pub fn module_name(&self, id: ModuleId) -> &str {
        self.resolve(self.modules[id].name)
    }

    /// Ports of a module in declaration order.
    pub fn ports(&self, module: ModuleId) -> &[Port] {
        &self.modules[module].ports
    }

    /// Section by ID.
    pub fn section(&self, id: SectionId) -> &ModuleSection {
        &self.sections[id]
    }

    /// Flop by ID.
    pub fn flop(&self, id: FlopId) -> &AlwaysFlop {
        &self.flops[id]
    }

    /// Function by ID.
    pub fn function(&self, id: FunctionId) -> &VerilogFunction {
        &self.functions[id]
    }

    // ---- file members ----

    /// Appends `` `include "path" ``.
    pub fn add_include(&mut self, path: impl Into<String>) {
        self.members.push(FileMember::Include(path.into()));
    }

    /// Appends a new empty module.
    pub fn add_module(&mut self, name: &str) -> Result<ModuleId, VastError> {
        let ident = self.interner.intern(name);
        if !self.module_names.insert(ident) {
            return Err(VastError::DuplicateName {
                name: name.to_string(),
                scope: "file".to_string(),
            });
        }
        let id = self.modules.next_id();
        let top = self.sections.alloc(ModuleSection {
            module: id,
            members: Vec::new(),
        });
        let allocated = self.modules.alloc(Module {
            name: ident,
            ports: Vec::new(),
            top,
            names: HashSet::new(),
        });
        debug_assert_eq!(allocated, id);
        self.members.push(FileMember::Module(id));
        Ok(id)
    }

    /// Root section of a module.
    pub fn top_section(&self, module: ModuleId) -> SectionId {
        self.modules[module].top
    }

    /// Appends a nested section to `parent` and returns it.
    pub fn add_section(&mut self, parent: SectionId) -> SectionId {
        let module = self.sections[parent].module;
        let id = self.sections.alloc(ModuleSection {
            module,
            members: Vec::new(),
        });
        self.sections[parent].members.push(ModuleMember::Section(id));
        id
    }

    fn push_member(&mut self, section: SectionId, member: ModuleMember) {
        self.sections[section].members.push(member);
    }

    /// Claims `name` in the module namespace.
    fn declare_name(&mut self, module: ModuleId, name: &str) -> Result<Ident, VastError> {
        let ident = self.interner.intern(name);
        let m = &mut self.modules[module];
        if !m.names.insert(ident) {
            let scope = format!("module '{}'", self.interner.resolve(m.name));
            return Err(VastError::DuplicateName {
                name: name.to_string(),
                scope,
            });
        }
        Ok(ident)
    }

    fn alloc_def(
        &mut self,
        name: Ident,
        kind: DataKind,
        data_type: DataType,
        init: Option<ExprId>,
        unpacked_bounds: Vec<UnpackedArrayBound>,
    ) -> (DefId, ExprId) {
        let def = self.defs.alloc(Def {
            name,
            kind,
            data_type,
            init,
            unpacked_bounds,
        });
        (def, self.exprs.alloc(Expr::LogicRef(def)))
    }

    fn add_port(
        &mut self,
        module: ModuleId,
        direction: Direction,
        name: &str,
        data_type: DataType,
    ) -> Result<ExprId, VastError> {
        let ident = self.declare_name(module, name)?;
        let (def, r) = self.alloc_def(ident, DataKind::Wire, data_type, None, Vec::new());
        self.modules[module].ports.push(Port { direction, def });
        Ok(r)
    }

    /// Declares an input wire port and returns a reference to it.
    pub fn add_input(
        &mut self,
        module: ModuleId,
        name: &str,
        data_type: DataType,
    ) -> Result<ExprId, VastError> {
        self.add_port(module, Direction::Input, name, data_type)
    }

    /// Declares an output wire port and returns a reference to it.
    pub fn add_output(
        &mut self,
        module: ModuleId,
        name: &str,
        data_type: DataType,
    ) -> Result<ExprId, VastError> {
        self.add_port(module, Direction::Output, name, data_type)
    }

    fn add_declaration(
        &mut self,
        section: SectionId,
        name: &str,
        kind: DataKind,
        data_type: DataType,
        init: Option<ExprId>,
        unpacked_bounds: Vec<UnpackedArrayBound>,
    ) -> Result<ExprId, VastError> {
        let module = self.sections[section].module;
        let ident = self.declare_name(module, name)?;
        let (def, r) = self.alloc_def(ident, kind, data_type, init, unpacked_bounds);
        self.push_member(section, ModuleMember::Def(def));
        Ok(r)
    }

    /// Declares a `reg`, optionally initialized.
    pub fn add_reg(
        &mut self,
        section: SectionId,
        name: &str,
        data_type: DataType,
        init: Option<ExprId>,
    ) -> Result<ExprId, VastError> {
        self.add_declaration(section, name, DataKind::Reg, data_type, init, Vec::new())
    }

    /// Declares a `wire`.
    pub fn add_wire(
        &mut self,
        section: SectionId,
        name: &str,
        data_type: DataType,
    ) -> Result<ExprId, VastError> {
        self.add_declaration(section, name, DataKind::Wire, data_type, None, Vec::new())
    }

    /// Declares a SystemVerilog `logic`.
    pub fn add_logic(
        &mut self,
        section: SectionId,
        name: &str,
        data_type: DataType,
    ) -> Result<ExprId, VastError> {
        self.add_declaration(section, name, DataKind::Logic, data_type, None, Vec::new())
    }

    /// Declares a `reg` array with unpacked dimensions.
    pub fn add_unpacked_array_reg(
        &mut self,
        section: SectionId,
        name: &str,
        data_type: DataType,
        bounds: Vec<UnpackedArrayBound>,
        init: Option<ExprId>,
    ) -> Result<ExprId, VastError> {
        assert!(!bounds.is_empty(), "unpacked array '{name}' needs a bound");
        self.add_declaration(section, name, DataKind::Reg, data_type, init, bounds)
    }

    /// Declares a `wire` array with unpacked dimensions.
    pub fn add_unpacked_array_wire(
        &mut self,
        section: SectionId,
        name: &str,
        data_type: DataType,
        bounds: Vec<UnpackedArrayBound>,
    ) -> Result<ExprId, VastError> {
        assert!(!bounds.is_empty(), "unpacked array '{name}' needs a bound");
        self.add_declaration(section, name, DataKind::Wire, data_type, None, bounds)
    }

    /// Declares `parameter name = value;` and returns a reference to it.
    pub fn add_parameter(
        &mut self,
        section: SectionId,
        name: &str,
        value: ExprId,
    ) -> Result<ExprId, VastError> {
        let module = self.sections[section].module;
        let ident = self.declare_name(module, name)?;
        self.push_member(section, ModuleMember::Parameter { name: ident, value });
        Ok(self.exprs.alloc(Expr::ParameterRef(ident)))
    }

    /// Appends an empty `localparam` declaration; fill it with
    /// [`add_localparam_item`](Self::add_localparam_item).
    pub fn add_localparam(&mut self, section: SectionId) -> LocalParamId {
        let module = self.sections[section].module;
        let id = self.localparams.alloc(LocalParam {
            module,
            items: Vec::new(),
        });
        self.push_member(section, ModuleMember::LocalParam(id));
        id
    }

    /// Adds `name = value` to a `localparam` and returns a reference to it.
    pub fn add_localparam_item(
        &mut self,
        localparam: LocalParamId,
        name: &str,
        value: ExprId,
    ) -> Result<ExprId, VastError> {
        let module = self.localparams[localparam].module;
        let ident = self.declare_name(module, name)?;
        self.localparams[localparam].items.push((ident, value));
        Ok(self.exprs.alloc(Expr::ParameterRef(ident)))
    }

    /// Appends `assign lhs = rhs;`.
    pub fn add_continuous_assignment(&mut self, section: SectionId, lhs: ExprId, rhs: ExprId) {
        self.push_member(section, ModuleMember::ContinuousAssignment { lhs, rhs });
    }

    /// Appends a `//` comment.
    pub fn add_comment(&mut self, section: SectionId, text: impl Into<String>) {
        self.push_member(section, ModuleMember::Comment(text.into()));
    }

    /// Appends an empty line.
    pub fn add_blank_line(&mut self, section: SectionId) {
        self.push_member(section, ModuleMember::BlankLine);
    }

    /// Appends verbatim text.
    pub fn add_raw(&mut self, section: SectionId, text: impl Into<String>) {
        self.push_member(section, ModuleMember::Raw(text.into()));
    }

    /// Appends an instance of another module.
    pub fn add_instantiation(&mut self, section: SectionId, instantiation: Instantiation) {
        self.push_member(section, ModuleMember::Instantiation(instantiation));
    }

    /// Appends an `always`/`initial` block and returns its body.
    ///
    /// # Panics
    ///
    /// Panics if the sensitivity list is empty for `always`/`always_ff` or
    /// non-empty for `always_comb`/`initial`.
    pub fn add_structured_procedure(
        &mut self,
        section: SectionId,
        kind: ProcedureKind,
        sensitivity: Vec<SensitivityListElement>,
    ) -> BlockId {
        assert_eq!(
            kind.has_sensitivity_list(),
            !sensitivity.is_empty(),
            "{} sensitivity list mismatch",
            kind.keyword()
        );
        let body = self.new_block();
        self.push_member(
            section,
            ModuleMember::StructuredProcedure(StructuredProcedure {
                kind,
                sensitivity,
                body,
            }),
        );
        body
    }

    /// Appends a clocked block. With a reset, the body is
    /// `if (reset asserted) <reset block> else <assignment block>`.
    pub fn add_always_flop(
        &mut self,
        section: SectionId,
        clk: ExprId,
        reset: Option<Reset>,
    ) -> FlopId {
        let top_block = self.new_block();
        let (reset_block, assignment_block) = match reset {
            Some(r) => {
                let condition = if r.active_low {
                    self.logical_not(r.signal)
                } else {
                    r.signal
                };
                let conditional = self.add_conditional(top_block, condition);
                let reset_block = self.consequent(conditional);
                let assignment_block = self.add_alternate(conditional, None);
                (Some(reset_block), assignment_block)
            }
            None => (None, top_block),
        };
        let id = self.flops.alloc(AlwaysFlop {
            clk,
            reset,
            top_block,
            reset_block,
            assignment_block,
        });
        self.push_member(section, ModuleMember::AlwaysFlop(id));
        id
    }

    /// Adds `reg <= next;` to the flop, and `reg <= reset_value;` to its
    /// reset branch when given.
    ///
    /// # Panics
    ///
    /// Panics if a reset value is given for a flop without reset.
    pub fn add_flop_register(
        &mut self,
        flop: FlopId,
        reg: ExprId,
        next: ExprId,
        reset_value: Option<ExprId>,
    ) {
        let AlwaysFlop {
            reset_block,
            assignment_block,
            ..
        } = self.flops[flop];
        if let Some(value) = reset_value {
            let Some(reset_block) = reset_block else {
                panic!("reset value given for a flop without reset");
            };
            self.add_nonblocking_assignment(reset_block, reg, value);
        }
        self.add_nonblocking_assignment(assignment_block, reg, next);
    }

    /// Appends `function automatic` returning `result_type`.
    pub fn add_function(
        &mut self,
        section: SectionId,
        name: &str,
        result_type: DataType,
    ) -> Result<FunctionId, VastError> {
        let module = self.sections[section].module;
        let ident = self.declare_name(module, name)?;
        let return_def = self.defs.alloc(Def {
            name: ident,
            kind: DataKind::Reg,
            data_type: result_type,
            init: None,
            unpacked_bounds: Vec::new(),
        });
        let body = self.new_block();
        let id = self.functions.alloc(VerilogFunction {
            name: ident,
            return_def,
            args: Vec::new(),
            locals: Vec::new(),
            body,
        });
        self.push_member(section, ModuleMember::Function(id));
        Ok(id)
    }

    /// Adds an `input` argument and returns a reference to it.
    pub fn add_function_argument(
        &mut self,
        function: FunctionId,
        name: &str,
        data_type: DataType,
    ) -> ExprId {
        let ident = self.interner.intern(name);
        let (def, r) = self.alloc_def(ident, DataKind::Reg, data_type, None, Vec::new());
        self.functions[function].args.push(def);
        r
    }

    /// Adds a local `reg` and returns a reference to it.
    pub fn add_function_local(
        &mut self,
        function: FunctionId,
        name: &str,
        data_type: DataType,
    ) -> ExprId {
        let ident = self.interner.intern(name);
        let (def, r) = self.alloc_def(ident, DataKind::Reg, data_type, None, Vec::new());
        self.functions[function].locals.push(def);
        r
    }

    /// Reference to the function's return variable.
    pub fn function_return_ref(&mut self, function: FunctionId) -> ExprId {
        let def = self.functions[function].return_def;
        self.exprs.alloc(Expr::LogicRef(def))
    }

    /// Body block of a function.
    pub fn function_body(&self, function: FunctionId) -> BlockId {
        self.functions[function].body
    }

    // ---- expressions ----

    /// Allocates an arbitrary expression.
    pub fn make_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// A sized literal, with the `<width>'` prefix for decimal.
    pub fn literal(&mut self, bits: Bits, format: FormatPreference) -> ExprId {
        self.literal_with(bits, format, true)
    }

    /// A literal with explicit control over the decimal width prefix.
    pub fn literal_with(
        &mut self,
        bits: Bits,
        format: FormatPreference,
        emit_bit_count: bool,
    ) -> ExprId {
        self.exprs.alloc(Expr::Literal {
            bits,
            format,
            emit_bit_count,
        })
    }

    /// An unsized 32-bit decimal literal, as used for widths and indices.
    pub fn plain_literal(&mut self, value: u32) -> ExprId {
        self.literal_with(
            Bits::from_u64(u64::from(value), PLAIN_LITERAL_WIDTH),
            FormatPreference::Default,
            false,
        )
    }

    /// `<width>'dx`.
    pub fn x_sentinel(&mut self, width: u32) -> ExprId {
        self.exprs.alloc(Expr::XSentinel { width })
    }

    /// `"text"`; `text` must already be escaped.
    pub fn quoted_string(&mut self, text: impl Into<String>) -> ExprId {
        self.exprs.alloc(Expr::QuotedString(text.into()))
    }

    /// `` `NAME ``.
    pub fn macro_ref(&mut self, name: impl Into<String>) -> ExprId {
        self.exprs.alloc(Expr::MacroRef(name.into()))
    }

    /// A new reference to an existing def.
    pub fn logic_ref(&mut self, def: DefId) -> ExprId {
        self.exprs.alloc(Expr::LogicRef(def))
    }

    /// Prefix operation.
    pub fn unary(&mut self, op: UnaryOp, arg: ExprId) -> ExprId {
        self.exprs.alloc(Expr::Unary { op, arg })
    }

    /// `!arg`.
    pub fn logical_not(&mut self, arg: ExprId) -> ExprId {
        self.unary(UnaryOp::LogicalNot, arg)
    }

    /// `~arg`.
    pub fn bitwise_not(&mut self, arg: ExprId) -> ExprId {
        self.unary(UnaryOp::BitwiseNot, arg)
    }

    /// Infix operation.
    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.exprs.alloc(Expr::Binary { op, lhs, rhs })
    }

    /// `lhs + rhs`.
    pub fn add(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Add, lhs, rhs)
    }

    /// `lhs - rhs`.
    pub fn sub(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Sub, lhs, rhs)
    }

    /// `lhs == rhs`.
    pub fn equals(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Eq, lhs, rhs)
    }

    /// `test ? consequent : alternate`.
    pub fn ternary(&mut self, test: ExprId, consequent: ExprId, alternate: ExprId) -> ExprId {
        self.exprs.alloc(Expr::Ternary {
            test,
            consequent,
            alternate,
        })
    }

    /// `{a, b, ...}`.
    pub fn concat(&mut self, args: Vec<ExprId>) -> ExprId {
        self.exprs.alloc(Expr::Concat {
            replication: None,
            args,
        })
    }

    /// `{n{a, b, ...}}`.
    pub fn replicated_concat(&mut self, replication: ExprId, args: Vec<ExprId>) -> ExprId {
        self.exprs.alloc(Expr::Concat {
            replication: Some(replication),
            args,
        })
    }

    /// `'{a, b, ...}`.
    pub fn array_assignment_pattern(&mut self, args: Vec<ExprId>) -> ExprId {
        self.exprs.alloc(Expr::ArrayAssignmentPattern(args))
    }

    fn assert_indexable(&self, subject: ExprId) {
        assert!(
            self.exprs[subject].is_indexable(),
            "cannot select from {:?}",
            self.exprs[subject]
        );
    }

    /// `subject[index]`.
    ///
    /// # Panics
    ///
    /// Panics if `subject` is not a reference or a selection.
    pub fn index(&mut self, subject: ExprId, index: ExprId) -> ExprId {
        self.assert_indexable(subject);
        self.exprs.alloc(Expr::Index { subject, index })
    }

    /// `subject[index]` with a plain literal index.
    pub fn index_at(&mut self, subject: ExprId, index: u32) -> ExprId {
        let index = self.plain_literal(index);
        self.index(subject, index)
    }

    /// `subject[hi:lo]`.
    ///
    /// # Panics
    ///
    /// Panics if `subject` is not a reference or a selection.
    pub fn slice(&mut self, subject: ExprId, hi: ExprId, lo: ExprId) -> ExprId {
        self.assert_indexable(subject);
        self.exprs.alloc(Expr::Slice { subject, hi, lo })
    }

    /// `subject[hi:lo]` with plain literal bounds.
    pub fn slice_at(&mut self, subject: ExprId, hi: u32, lo: u32) -> ExprId {
        let hi = self.plain_literal(hi);
        let lo = self.plain_literal(lo);
        self.slice(subject, hi, lo)
    }

    /// `subject[start +: width]`.
    pub fn part_select(&mut self, subject: ExprId, start: ExprId, width: ExprId) -> ExprId {
        self.assert_indexable(subject);
        self.exprs.alloc(Expr::PartSelect {
            subject,
            start,
            width,
        })
    }

    /// `posedge e`.
    pub fn pos_edge(&mut self, e: ExprId) -> ExprId {
        self.exprs.alloc(Expr::PosEdge(e))
    }

    /// `negedge e`.
    pub fn neg_edge(&mut self, e: ExprId) -> ExprId {
        self.exprs.alloc(Expr::NegEdge(e))
    }

    /// Call of a function defined in this file.
    pub fn function_call(&mut self, function: FunctionId, args: Vec<ExprId>) -> ExprId {
        self.exprs.alloc(Expr::FunctionCall { function, args })
    }

    /// `$name(args)` or, with `None`, `$name`.
    pub fn system_function_call(
        &mut self,
        name: impl Into<String>,
        args: Option<Vec<ExprId>>,
    ) -> ExprId {
        self.exprs.alloc(Expr::SystemFunctionCall {
            name: name.into(),
            args,
        })
    }

    // ---- statements ----

    /// Allocates an empty block not attached to anything.
    pub fn new_block(&mut self) -> BlockId {
        self.blocks.alloc(StatementBlock::default())
    }

    /// Allocates a statement without placing it in a block.
    pub fn make_statement(&mut self, statement: Statement) -> StmtId {
        self.stmts.alloc(statement)
    }

    /// Appends a statement to a block.
    pub fn add_statement(&mut self, block: BlockId, statement: Statement) -> StmtId {
        let id = self.stmts.alloc(statement);
        self.blocks[block].statements.push(id);
        id
    }

    /// Appends a previously made statement to a block.
    pub fn push_statement(&mut self, block: BlockId, statement: StmtId) {
        self.blocks[block].statements.push(statement);
    }

    /// Appends `lhs = rhs;`.
    pub fn add_blocking_assignment(&mut self, block: BlockId, lhs: ExprId, rhs: ExprId) -> StmtId {
        self.add_statement(block, Statement::BlockingAssignment { lhs, rhs })
    }

    /// Appends `lhs <= rhs;`.
    pub fn add_nonblocking_assignment(
        &mut self,
        block: BlockId,
        lhs: ExprId,
        rhs: ExprId,
    ) -> StmtId {
        self.add_statement(block, Statement::NonblockingAssignment { lhs, rhs })
    }

    /// Appends `if (condition) begin end` and returns the statement.
    pub fn add_conditional(&mut self, block: BlockId, condition: ExprId) -> StmtId {
        let consequent = self.new_block();
        self.add_statement(
            block,
            Statement::Conditional(Conditional {
                condition,
                consequent,
                alternates: Vec::new(),
            }),
        )
    }

    fn conditional_mut(&mut self, id: StmtId) -> &mut Conditional {
        match &mut self.stmts[id] {
            Statement::Conditional(c) => c,
            other => panic!("{other:?} is not a conditional"),
        }
    }

    /// Body of the leading `if`.
    pub fn consequent(&self, conditional: StmtId) -> BlockId {
        match &self.stmts[conditional] {
            Statement::Conditional(c) => c.consequent,
            other => panic!("{other:?} is not a conditional"),
        }
    }

    /// Adds `else if (condition)` or, with `None`, `else`.
    ///
    /// # Panics
    ///
    /// Panics if the chain already ends in an unconditional `else`.
    pub fn add_alternate(&mut self, conditional: StmtId, condition: Option<ExprId>) -> BlockId {
        let block = self.new_block();
        let c = self.conditional_mut(conditional);
        assert!(
            !c.is_closed(),
            "cannot add an alternate after an unconditional else"
        );
        c.alternates.push((condition, block));
        block
    }

    /// Appends `case (subject) endcase` and returns the statement.
    pub fn add_case(&mut self, block: BlockId, subject: ExprId) -> StmtId {
        self.add_statement(
            block,
            Statement::Case(Case {
                subject,
                arms: Vec::new(),
            }),
        )
    }

    /// Adds an arm to a case statement and returns its body.
    pub fn add_case_arm(&mut self, case: StmtId, label: CaseLabel) -> BlockId {
        let block = self.new_block();
        match &mut self.stmts[case] {
            Statement::Case(c) => c.arms.push((label, block)),
            other => panic!("{other:?} is not a case statement"),
        }
        block
    }

    /// Appends `while (condition)` and returns its body.
    pub fn add_while(&mut self, block: BlockId, condition: ExprId) -> BlockId {
        let body = self.new_block();
        self.add_statement(block, Statement::While { condition, body });
        body
    }

    // ---- ports and widths ----

    /// Reorders a module's ports to match `names` exactly.
    pub fn reorder_ports(&mut self, module: ModuleId, names: &[&str]) -> Result<(), VastError> {
        let mut by_name: HashMap<&str, Port> = HashMap::new();
        for port in &self.modules[module].ports {
            by_name.insert(self.interner.resolve(self.defs[port.def].name), *port);
        }
        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(names.len());
        for &name in names {
            if !seen.insert(name) {
                return Err(VastError::DuplicatePortInOrder(name.to_string()));
            }
            match by_name.get(name) {
                Some(port) => reordered.push(*port),
                None => return Err(VastError::UnknownPortInOrder(name.to_string())),
            }
        }
        if let Some(missing) = self.modules[module]
            .ports
            .iter()
            .map(|p| self.interner.resolve(self.defs[p.def].name))
            .find(|n| !seen.contains(n))
        {
            return Err(VastError::MissingPortInOrder(missing.to_string()));
        }
        self.modules[module].ports = reordered;
        Ok(())
    }

    /// Data type of the given bit count: scalar for 1, a plain-literal width
    /// otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `bit_count` is zero.
    pub fn data_type_of_width(&mut self, bit_count: u32) -> DataType {
        assert!(bit_count > 0, "data type width must be positive");
        if bit_count == 1 {
            DataType::scalar()
        } else {
            DataType::with_width(self.plain_literal(bit_count))
        }
    }

    fn literal_as_i64(&self, expr: ExprId, what: &'static str) -> Result<i64, VastError> {
        let Some(bits) = self.exprs[expr].as_literal() else {
            return Err(VastError::NotALiteral {
                what,
                text: self.emit_expr(expr),
            });
        };
        bits.to_u64()
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| VastError::ValueTooLarge {
                what,
                text: self.emit_expr(expr),
            })
    }

    /// Width in bits; 1 for a scalar.
    pub fn width_as_i64(&self, data_type: &DataType) -> Result<i64, VastError> {
        match data_type.width {
            None => Ok(1),
            Some(w) => self.literal_as_i64(w, "width"),
        }
    }

    /// Total bits including packed dimensions.
    pub fn flat_bit_count(&self, data_type: &DataType) -> Result<i64, VastError> {
        let mut count = self.width_as_i64(data_type)?;
        for &dim in &data_type.packed_dims {
            let dim_value = self.literal_as_i64(dim, "dimension")?;
            count = count
                .checked_mul(dim_value)
                .ok_or_else(|| VastError::ValueTooLarge {
                    what: "bit count",
                    text: self.emit_data_type(data_type).trim_start().to_string(),
                })?;
        }
        Ok(count)
    }

    fn direction_bits(&self, module: ModuleId, direction: Direction) -> Result<i64, VastError> {
        let mut total: i64 = 0;
        for port in &self.modules[module].ports {
            if port.direction == direction {
                let bits = self.flat_bit_count(&self.defs[port.def].data_type)?;
                total = total
                    .checked_add(bits)
                    .ok_or_else(|| VastError::ValueTooLarge {
                        what: "bit count",
                        text: self.def_name(port.def).to_string(),
                    })?;
            }
        }
        Ok(total)
    }

    /// Sum of input port widths.
    pub fn input_bits(&self, module: ModuleId) -> Result<i64, VastError> {
        self.direction_bits(module, Direction::Input)
    }

    /// Sum of output port widths.
    pub fn output_bits(&self, module: ModuleId) -> Result<i64, VastError> {
        self.direction_bits(module, Direction::Output)
    }
}
