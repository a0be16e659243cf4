//! Lowering of a [`Block`] into a single Verilog module.

use crate::error::CodegenError;
use crate::signature::{ModuleSignature, ResetSignature};
use crate::vast::{
    DataType, ExprId, FileType, ModuleId, ProcedureKind, Reset, SectionId,
    SensitivityListElement, Statement, VerilogFile,
};
use sable_common::{ContentHash, FormatPreference};
use sable_config::{validate_options, GeneratorOptions, ResetOptions};
use sable_ir::{
    sanitize_identifier, to_verilog_format, Block, IrError, NodeId, NodeKind, Port, RegisterId,
};
use std::collections::HashMap;

/// Emitted text plus the metadata downstream tools need.
#[derive(Debug, Clone)]
pub struct ModuleGeneratorResult {
    /// The complete file text.
    pub verilog_text: String,
    /// Port summary.
    pub signature: ModuleSignature,
    /// XXH3 hash of `verilog_text`.
    pub text_hash: ContentHash,
}

/// Lowers `block` into one module.
///
/// Ports follow the block's port order; the clock (and the reset right after
/// it) sit where the block declares its clock, or first if only the options
/// name one. Registers share one clocked block, traces become `$display`
/// calls, and output ports become continuous assignments.
pub fn generate_module(
    block: &Block,
    options: &GeneratorOptions,
) -> Result<ModuleGeneratorResult, CodegenError> {
    validate_options(options)?;
    let clock = resolve_clock(block, options)?;
    let has_registers = block.registers().next().is_some();
    if has_registers && clock.is_none() {
        return Err(CodegenError::MissingClock {
            block: block.name().to_string(),
        });
    }
    if options.reset.is_none() {
        if let Some((_, reg)) = block.registers().find(|(_, r)| r.reset_value.is_some()) {
            return Err(CodegenError::ResetNotConfigured {
                register: reg.name.clone(),
            });
        }
    }

    let module_name = options
        .module
        .name
        .clone()
        .unwrap_or_else(|| sanitize_identifier(block.name()));
    let file_type = if options.output.system_verilog {
        FileType::SystemVerilog
    } else {
        FileType::Verilog
    };
    let mut file = VerilogFile::new(file_type);
    let module = file.add_module(&module_name)?;
    let top = file.top_section(module);
    let mut lowering = Lowering {
        block,
        file: &mut file,
        module,
        top,
        values: HashMap::new(),
        regs: HashMap::new(),
        clk: None,
        rst: None,
    };
    lowering.ports(clock.as_deref(), options.reset.as_ref())?;
    lowering.values()?;
    lowering.registers(options.reset.as_ref())?;
    lowering.traces()?;
    lowering.outputs()?;

    let reset = options.reset.as_ref().map(|r| ResetSignature {
        name: r.name.clone(),
        asynchronous: r.asynchronous,
        active_low: r.active_low,
    });
    let signature = ModuleSignature::from_module(&file, module, clock, reset)?;
    let verilog_text = file.emit();
    let text_hash = ContentHash::of_text(&verilog_text);
    log::debug!(
        "generated module '{}': {} input bits, {} output bits, hash {}",
        signature.module_name,
        signature.input_bits(),
        signature.output_bits(),
        text_hash.short()
    );
    Ok(ModuleGeneratorResult {
        verilog_text,
        signature,
        text_hash,
    })
}

/// The block's clock wins; an options clock must agree with it.
fn resolve_clock(
    block: &Block,
    options: &GeneratorOptions,
) -> Result<Option<String>, CodegenError> {
    match (block.clock_name(), &options.clock) {
        (Some(block_clock), Some(configured)) if block_clock != configured.name => {
            Err(CodegenError::ClockMismatch {
                block_clock: block_clock.to_string(),
                configured: configured.name.clone(),
            })
        }
        (Some(block_clock), _) => Ok(Some(block_clock.to_string())),
        (None, Some(configured)) => Ok(Some(configured.name.clone())),
        (None, None) => Ok(None),
    }
}

/// State threaded through the lowering passes.
struct Lowering<'a> {
    block: &'a Block,
    file: &'a mut VerilogFile,
    module: ModuleId,
    top: SectionId,
    /// Expression standing for each value node.
    values: HashMap<NodeId, ExprId>,
    regs: HashMap<RegisterId, ExprId>,
    clk: Option<ExprId>,
    rst: Option<ExprId>,
}

impl Lowering<'_> {
    fn value(&self, node: NodeId) -> Result<ExprId, CodegenError> {
        self.values
            .get(&node)
            .copied()
            .ok_or_else(|| IrError::NotAValue(self.block.node(node).name.clone()).into())
    }

    fn control_ports(
        &mut self,
        clock: Option<&str>,
        reset: Option<&ResetOptions>,
    ) -> Result<(), CodegenError> {
        if let Some(name) = clock {
            self.clk = Some(self.file.add_input(self.module, name, DataType::scalar())?);
        }
        if let Some(r) = reset {
            self.rst = Some(self.file.add_input(self.module, &r.name, DataType::scalar())?);
        }
        Ok(())
    }

    fn ports(
        &mut self,
        clock: Option<&str>,
        reset: Option<&ResetOptions>,
    ) -> Result<(), CodegenError> {
        let block = self.block;
        if block.clock_name().is_none() {
            self.control_ports(clock, reset)?;
        }
        for port in block.ports() {
            match port {
                Port::Clock(_) => self.control_ports(clock, reset)?,
                Port::Input(id) => {
                    let node = block.node(*id);
                    let dt = self.data_type(&node.name, node.width)?;
                    let r = self.file.add_input(self.module, &node.name, dt)?;
                    self.values.insert(*id, r);
                }
                Port::Output(id) => {
                    let node = block.node(*id);
                    let dt = self.data_type(&node.name, node.width)?;
                    let r = self.file.add_output(self.module, &node.name, dt)?;
                    self.values.insert(*id, r);
                }
            }
        }
        Ok(())
    }

    fn data_type(&mut self, port: &str, width: u32) -> Result<DataType, CodegenError> {
        if width == 0 {
            return Err(CodegenError::ZeroWidthPort(port.to_string()));
        }
        Ok(self.file.data_type_of_width(width))
    }

    /// Declares registers and binds literals and register reads.
    fn values(&mut self) -> Result<(), CodegenError> {
        let block = self.block;
        for (id, reg) in block.registers() {
            let dt = self.file.data_type_of_width(reg.width);
            let r = self.file.add_reg(self.top, &reg.name, dt, None)?;
            self.regs.insert(id, r);
        }
        for id in block.topo_sort() {
            match &block.node(id).kind {
                NodeKind::Literal(bits) => {
                    let lit = self.file.literal(bits.clone(), FormatPreference::Decimal);
                    self.values.insert(id, lit);
                }
                NodeKind::RegisterRead { register } => {
                    let r = self.regs[register];
                    self.values.insert(id, r);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn registers(&mut self, reset: Option<&ResetOptions>) -> Result<(), CodegenError> {
        let block = self.block;
        let Some(clk) = self.clk else {
            return Ok(());
        };
        if block.registers().next().is_none() {
            return Ok(());
        }
        let any_reset_value = block.registers().any(|(_, r)| r.reset_value.is_some());
        let flop_reset = match (reset, self.rst) {
            (Some(r), Some(signal)) if any_reset_value => Some(Reset {
                signal,
                asynchronous: r.asynchronous,
                active_low: r.active_low,
            }),
            _ => None,
        };
        let flop = self.file.add_always_flop(self.top, clk, flop_reset);
        for (id, reg) in block.registers() {
            let write = match block.register_write(id) {
                Ok(w) => w,
                Err(IrError::NoRegisterAccess { .. }) => {
                    log::debug!("register '{}' is never written; holding its value", reg.name);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let NodeKind::RegisterWrite {
                data, load_enable, ..
            } = block.node(write).kind
            else {
                continue;
            };
            let reg_ref = self.regs[&id];
            let data = self.value(data)?;
            let next = match load_enable {
                Some(le) => {
                    let le = self.value(le)?;
                    self.file.ternary(le, data, reg_ref)
                }
                None => data,
            };
            let reset_value = reg
                .reset_value
                .clone()
                .map(|v| self.file.literal(v, FormatPreference::Decimal));
            self.file.add_flop_register(flop, reg_ref, next, reset_value);
        }
        Ok(())
    }

    fn traces(&mut self) -> Result<(), CodegenError> {
        let block = self.block;
        let traces: Vec<NodeId> = block
            .topo_sort()
            .into_iter()
            .filter(|id| matches!(block.node(*id).kind, NodeKind::Trace { .. }))
            .collect();
        if traces.is_empty() {
            return Ok(());
        }
        let body = match self.clk {
            Some(clk) => self.file.add_structured_procedure(
                self.top,
                ProcedureKind::Always,
                vec![SensitivityListElement::PosEdge(clk)],
            ),
            None if self.file.file_type() == FileType::SystemVerilog => {
                self.file
                    .add_structured_procedure(self.top, ProcedureKind::AlwaysComb, Vec::new())
            }
            None => self.file.add_structured_procedure(
                self.top,
                ProcedureKind::Always,
                vec![SensitivityListElement::Implicit],
            ),
        };
        for id in traces {
            let NodeKind::Trace {
                condition,
                format,
                args,
            } = &block.node(id).kind
            else {
                continue;
            };
            let condition = self.value(*condition)?;
            let mut call_args = vec![self.file.quoted_string(to_verilog_format(format))];
            for arg in args {
                call_args.push(self.value(*arg)?);
            }
            let guard = self.file.add_conditional(body, condition);
            let consequent = self.file.consequent(guard);
            self.file.add_statement(
                consequent,
                Statement::SystemTaskCall {
                    name: "display".to_string(),
                    args: Some(call_args),
                },
            );
        }
        Ok(())
    }

    fn outputs(&mut self) -> Result<(), CodegenError> {
        let block = self.block;
        for port in block.ports() {
            let Port::Output(id) = port else {
                continue;
            };
            let NodeKind::OutputPort { operand } = block.node(*id).kind else {
                continue;
            };
            let lhs = self.value(*id)?;
            let rhs = self.value(operand)?;
            self.file.add_continuous_assignment(self.top, lhs, rhs);
        }
        Ok(())
    }
}
