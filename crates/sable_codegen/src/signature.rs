//! Port summary of a generated module, consumed by testbench and simulation
//! tooling.

use crate::error::VastError;
use crate::vast::{Direction, ModuleId, VerilogFile};
use serde::{Deserialize, Serialize};

/// A data port and its flattened width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSignature {
    /// Port name.
    pub name: String,
    /// Width in bits.
    pub width: i64,
}

/// Reset port and polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSignature {
    /// Port name.
    pub name: String,
    /// Whether reset bypasses the clock.
    pub asynchronous: bool,
    /// Whether reset is asserted low.
    pub active_low: bool,
}

/// Interface of a generated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSignature {
    /// Emitted module name.
    pub module_name: String,
    /// Clock port, if clocked.
    pub clock: Option<String>,
    /// Reset port, if configured.
    pub reset: Option<ResetSignature>,
    /// Data inputs in port order, excluding clock and reset.
    pub data_inputs: Vec<PortSignature>,
    /// Data outputs in port order.
    pub data_outputs: Vec<PortSignature>,
}

impl ModuleSignature {
    /// Reads the ports of `module`, treating `clock` and `reset` as control
    /// inputs.
    pub fn from_module(
        file: &VerilogFile,
        module: ModuleId,
        clock: Option<String>,
        reset: Option<ResetSignature>,
    ) -> Result<Self, VastError> {
        let mut data_inputs = Vec::new();
        let mut data_outputs = Vec::new();
        for port in file.ports(module) {
            let name = file.def_name(port.def);
            let is_control = clock.as_deref() == Some(name)
                || reset.as_ref().is_some_and(|r| r.name == name);
            if is_control {
                continue;
            }
            let sig = PortSignature {
                name: name.to_string(),
                width: file.flat_bit_count(&file.def(port.def).data_type)?,
            };
            match port.direction {
                Direction::Input => data_inputs.push(sig),
                Direction::Output => data_outputs.push(sig),
            }
        }
        Ok(Self {
            module_name: file.module_name(module).to_string(),
            clock,
            reset,
            data_inputs,
            data_outputs,
        })
    }

    /// Sum of data input widths.
    pub fn input_bits(&self) -> i64 {
        self.data_inputs.iter().map(|p| p.width).sum()
    }

    /// Sum of data output widths.
    pub fn output_bits(&self) -> i64 {
        self.data_outputs.iter().map(|p| p.width).sum()
    }
}
