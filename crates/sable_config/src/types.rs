//! Option types deserialized from `sable.toml`.

use serde::Deserialize;

/// Everything the module generator needs beyond the block itself.
///
/// Every section is optional; [`GeneratorOptions::default`] produces a
/// SystemVerilog module named after the block with no clock or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneratorOptions {
    /// Module naming.
    #[serde(default)]
    pub module: ModuleOptions,
    /// Clock port, if the generated module is clocked.
    #[serde(default)]
    pub clock: Option<ClockOptions>,
    /// Reset port and polarity, if registers have reset values.
    #[serde(default)]
    pub reset: Option<ResetOptions>,
    /// Output dialect.
    #[serde(default)]
    pub output: OutputOptions,
}

/// The `[module]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModuleOptions {
    /// Name of the emitted module. Defaults to the block name.
    #[serde(default)]
    pub name: Option<String>,
}

/// The `[clock]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockOptions {
    /// Clock port name.
    pub name: String,
}

/// The `[reset]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetOptions {
    /// Reset port name.
    pub name: String,
    /// Reset takes effect without waiting for a clock edge.
    #[serde(default)]
    pub asynchronous: bool,
    /// Reset is asserted when the signal is low.
    #[serde(default)]
    pub active_low: bool,
}

/// The `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputOptions {
    /// Emit SystemVerilog (`always_comb`, `assert`) instead of plain Verilog.
    #[serde(default = "default_true")]
    pub system_verilog: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            system_verilog: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl GeneratorOptions {
    /// Sets the emitted module name.
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module.name = Some(name.into());
        self
    }

    /// Sets the clock port name.
    pub fn clock_name(mut self, name: impl Into<String>) -> Self {
        self.clock = Some(ClockOptions { name: name.into() });
        self
    }

    /// Configures the reset port.
    pub fn reset(mut self, name: impl Into<String>, asynchronous: bool, active_low: bool) -> Self {
        self.reset = Some(ResetOptions {
            name: name.into(),
            asynchronous,
            active_low,
        });
        self
    }

    /// Chooses SystemVerilog (`true`) or Verilog (`false`) output.
    pub fn use_system_verilog(mut self, value: bool) -> Self {
        self.output.system_verilog = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = GeneratorOptions::default();
        assert_eq!(opts.module.name, None);
        assert!(opts.clock.is_none());
        assert!(opts.reset.is_none());
        assert!(opts.output.system_verilog);
    }

    #[test]
    fn builder_chain() {
        let opts = GeneratorOptions::default()
            .module_name("top")
            .clock_name("clk")
            .reset("rst_n", true, true)
            .use_system_verilog(false);
        assert_eq!(opts.module.name.as_deref(), Some("top"));
        assert_eq!(opts.clock.map(|c| c.name), Some("clk".to_string()));
        let reset = opts.reset.unwrap();
        assert_eq!(reset.name, "rst_n");
        assert!(reset.asynchronous && reset.active_low);
        assert!(!opts.output.system_verilog);
    }
}
