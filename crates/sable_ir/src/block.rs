//! Register-transfer block: ports, registers and the nodes connecting them.
//!
//! A [`Block`] is the unit the code generator lowers into one Verilog
//! module. Nodes live in an [`Arena`] and refer to their operands by
//! [`NodeId`]; because an operand must exist before it can be referenced,
//! the node graph is always acyclic.

use crate::arena::{Arena, ArenaId};
use crate::error::IrError;
use crate::format_strings::{operands_expected_by_format, parse_format_string, FormatStep};
use crate::ids::{NodeId, RegisterId};
use crate::name_uniquer::{sanitize_identifier, NameUniquer};
use petgraph::graph::{DiGraph, NodeIndex};
use sable_common::Bits;
use std::collections::{HashMap, HashSet};

/// A state element updated on the clock edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    /// Register name, unique within the block.
    pub name: String,
    /// Width in bits.
    pub width: u32,
    /// Value loaded while reset is asserted, if any.
    pub reset_value: Option<Bits>,
}

/// The operation a node performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A data input of the block.
    InputPort,
    /// A data output of the block, driven by `operand`.
    OutputPort {
        /// The driving value.
        operand: NodeId,
    },
    /// A constant.
    Literal(Bits),
    /// The current value of a register.
    RegisterRead {
        /// The register read.
        register: RegisterId,
    },
    /// The next value of a register.
    RegisterWrite {
        /// The register written.
        register: RegisterId,
        /// New value.
        data: NodeId,
        /// One-bit enable; the register holds its value when it is low.
        load_enable: Option<NodeId>,
    },
    /// A formatted message printed whenever `condition` is high.
    Trace {
        /// One-bit guard.
        condition: NodeId,
        /// Parsed format string.
        format: Vec<FormatStep>,
        /// One value per substitution in `format`.
        args: Vec<NodeId>,
    },
}

impl NodeKind {
    /// Nodes this node reads, in operand order.
    pub fn operands(&self) -> Vec<NodeId> {
        match self {
            NodeKind::InputPort | NodeKind::Literal(_) | NodeKind::RegisterRead { .. } => {
                Vec::new()
            }
            NodeKind::OutputPort { operand } => vec![*operand],
            NodeKind::RegisterWrite {
                data, load_enable, ..
            } => std::iter::once(*data).chain(*load_enable).collect(),
            NodeKind::Trace {
                condition, args, ..
            } => std::iter::once(*condition).chain(args.iter().copied()).collect(),
        }
    }

    /// Returns true if the node produces a value other nodes may consume.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            NodeKind::InputPort | NodeKind::Literal(_) | NodeKind::RegisterRead { .. }
        )
    }

    fn is_port(&self) -> bool {
        matches!(self, NodeKind::InputPort | NodeKind::OutputPort { .. })
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            NodeKind::InputPort => "input_port",
            NodeKind::OutputPort { .. } => "output_port",
            NodeKind::Literal(_) => "literal",
            NodeKind::RegisterRead { .. } => "register_read",
            NodeKind::RegisterWrite { .. } => "register_write",
            NodeKind::Trace { .. } => "trace",
        }
    }
}

/// A named operation in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique, sanitized name.
    pub name: String,
    /// What the node does.
    pub kind: NodeKind,
    /// Width of the produced value; zero for nodes without a value.
    pub width: u32,
}

/// An entry in the block's ordered port list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Port {
    /// The clock input.
    Clock(String),
    /// A data input node.
    Input(NodeId),
    /// A data output node.
    Output(NodeId),
}

/// A register-transfer block.
#[derive(Debug, Clone)]
pub struct Block {
    name: String,
    nodes: Arena<NodeId, Node>,
    registers: Arena<RegisterId, Register>,
    ports: Vec<Port>,
    uniquer: NameUniquer,
    node_by_name: HashMap<String, NodeId>,
}

impl Block {
    /// Creates an empty block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Arena::new(),
            registers: Arena::new(),
            ports: Vec::new(),
            uniquer: NameUniquer::new(),
            node_by_name: HashMap::new(),
        }
    }

    /// The block name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node.
    ///
    /// # Panics
    ///
    /// Panics if the node was removed or never existed.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Looks up a node by its current name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_by_name.get(name).copied()
    }

    /// Ports in declaration order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Name of a port as it appears in the emitted module.
    pub fn port_name<'a>(&'a self, port: &'a Port) -> &'a str {
        match port {
            Port::Clock(name) => name,
            Port::Input(id) | Port::Output(id) => &self.nodes[*id].name,
        }
    }

    /// Name of the clock port, if the block has one.
    pub fn clock_name(&self) -> Option<&str> {
        self.ports.iter().find_map(|p| match p {
            Port::Clock(name) => Some(name.as_str()),
            _ => None,
        })
    }

    fn port_holding(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| self.port_name(p) == name)
    }

    fn register_named(&self, name: &str) -> Option<RegisterId> {
        self.registers
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(id, _)| id)
    }

    fn check_port_name(&self, name: &str) -> Result<(), IrError> {
        if sanitize_identifier(name) != name {
            return Err(IrError::InvalidPortName(name.to_string()));
        }
        if self.port_holding(name).is_some() {
            return Err(IrError::DuplicatePort(name.to_string()));
        }
        if self.register_named(name).is_some() {
            return Err(IrError::PortRegisterCollision(name.to_string()));
        }
        Ok(())
    }

    fn alloc_node(&mut self, name: &str, kind: NodeKind, width: u32) -> NodeId {
        let name = self.uniquer.unique_name(name);
        let id = self.nodes.alloc(Node {
            name: name.clone(),
            kind,
            width,
        });
        self.node_by_name.insert(name, id);
        id
    }

    /// Moves whatever non-port node currently holds `name` to a fresh name.
    ///
    /// # Panics
    ///
    /// Panics if a port (other than `except`) holds the name.
    fn displace(&mut self, name: &str, except: Option<NodeId>) {
        if let Some(Port::Clock(_)) = self.port_holding(name) {
            panic!("port name '{name}' collides with the clock port");
        }
        let Some(holder) = self.node_by_name.get(name).copied() else {
            return;
        };
        if Some(holder) == except {
            return;
        }
        assert!(
            !self.nodes[holder].kind.is_port(),
            "port name '{name}' collides with another port"
        );
        let fresh = self.uniquer.unique_name(name);
        log::debug!("renaming node '{name}' to '{fresh}' to free the name for a port");
        self.node_by_name.remove(name);
        self.node_by_name.insert(fresh.clone(), holder);
        self.nodes[holder].name = fresh;
    }

    /// Gives port `port` exactly the name `name`, renaming any non-port node
    /// that currently holds it.
    ///
    /// # Panics
    ///
    /// Panics if `port` is not a port node, if another port already has the
    /// name, or if a register has the name.
    pub fn set_port_name_exactly(&mut self, name: &str, port: NodeId) {
        assert!(
            self.nodes[port].kind.is_port(),
            "node '{}' is not a port",
            self.nodes[port].name
        );
        assert!(
            self.register_named(name).is_none(),
            "port name '{name}' collides with a register"
        );
        self.displace(name, Some(port));
        self.uniquer.reserve(name);
        let old = std::mem::replace(&mut self.nodes[port].name, name.to_string());
        if old != name {
            self.node_by_name.remove(&old);
        }
        self.node_by_name.insert(name.to_string(), port);
    }

    /// Adds a data input of the given width.
    pub fn add_input_port(&mut self, name: &str, width: u32) -> Result<NodeId, IrError> {
        self.check_port_name(name)?;
        let id = self.alloc_node(name, NodeKind::InputPort, width);
        if self.nodes[id].name != name {
            self.set_port_name_exactly(name, id);
        }
        self.ports.push(Port::Input(id));
        Ok(id)
    }

    /// Adds a data output driven by `operand`.
    pub fn add_output_port(&mut self, name: &str, operand: NodeId) -> Result<NodeId, IrError> {
        self.check_port_name(name)?;
        let width = self.value_width(operand)?;
        let id = self.alloc_node(name, NodeKind::OutputPort { operand }, width);
        if self.nodes[id].name != name {
            self.set_port_name_exactly(name, id);
        }
        self.ports.push(Port::Output(id));
        Ok(id)
    }

    /// Adds the clock input. A block has at most one clock.
    pub fn add_clock_port(&mut self, name: &str) -> Result<(), IrError> {
        if let Some(existing) = self.clock_name() {
            return Err(IrError::ClockAlreadyExists {
                existing: existing.to_string(),
                requested: name.to_string(),
            });
        }
        self.check_port_name(name)?;
        self.displace(name, None);
        self.uniquer.reserve(name);
        self.ports.push(Port::Clock(name.to_string()));
        Ok(())
    }

    /// Adds a constant.
    pub fn add_literal(&mut self, name: &str, value: Bits) -> NodeId {
        let width = value.width();
        self.alloc_node(name, NodeKind::Literal(value), width)
    }

    /// Adds a register, optionally with a reset value.
    pub fn add_register(
        &mut self,
        name: &str,
        width: u32,
        reset_value: Option<Bits>,
    ) -> Result<RegisterId, IrError> {
        if sanitize_identifier(name) != name {
            return Err(IrError::InvalidRegisterName(name.to_string()));
        }
        if self.register_named(name).is_some() {
            return Err(IrError::DuplicateRegister(name.to_string()));
        }
        if self.port_holding(name).is_some() {
            return Err(IrError::PortRegisterCollision(name.to_string()));
        }
        if width == 0 {
            return Err(IrError::ZeroWidthRegister(name.to_string()));
        }
        if let Some(value) = &reset_value {
            if value.width() != width {
                return Err(IrError::WidthMismatch {
                    what: format!("reset value of register '{name}'"),
                    expected: width,
                    actual: value.width(),
                });
            }
        }
        self.displace(name, None);
        self.uniquer.reserve(name);
        log::debug!("adding register '{name}' of {width} bits");
        Ok(self.registers.alloc(Register {
            name: name.to_string(),
            width,
            reset_value,
        }))
    }

    /// Returns the register.
    ///
    /// # Panics
    ///
    /// Panics if the register was removed or never existed.
    pub fn register(&self, id: RegisterId) -> &Register {
        &self.registers[id]
    }

    /// Looks up a register by name.
    pub fn get_register(&self, name: &str) -> Result<RegisterId, IrError> {
        self.register_named(name)
            .ok_or_else(|| IrError::RegisterNotFound(name.to_string()))
    }

    /// Live registers in creation order.
    pub fn registers(&self) -> impl Iterator<Item = (RegisterId, &Register)> {
        self.registers.iter()
    }

    /// Removes a register that has no remaining reads or writes.
    pub fn remove_register(&mut self, id: RegisterId) -> Result<Register, IrError> {
        let name = self.live_register(id)?.name.clone();
        let users = self.register_accesses(id, false).len() + self.register_accesses(id, true).len();
        if users > 0 {
            return Err(IrError::RegisterInUse { name, users });
        }
        log::debug!("removing register '{name}'");
        self.registers
            .remove(id)
            .ok_or(IrError::InvalidRegister(id.as_raw()))
    }

    /// Adds a read of the register's current value.
    pub fn add_register_read(&mut self, register: RegisterId) -> Result<NodeId, IrError> {
        let reg = self.live_register(register)?;
        let (name, width) = (format!("{}_read", reg.name), reg.width);
        Ok(self.alloc_node(&name, NodeKind::RegisterRead { register }, width))
    }

    /// Adds a write of the register's next value.
    pub fn add_register_write(
        &mut self,
        register: RegisterId,
        data: NodeId,
        load_enable: Option<NodeId>,
    ) -> Result<NodeId, IrError> {
        let reg = self.live_register(register)?;
        let (reg_name, width) = (reg.name.clone(), reg.width);
        self.expect_width(data, width, || format!("data written to register '{reg_name}'"))?;
        if let Some(le) = load_enable {
            self.expect_width(le, 1, || format!("load enable of register '{reg_name}'"))?;
        }
        Ok(self.alloc_node(
            &format!("{reg_name}_write"),
            NodeKind::RegisterWrite {
                register,
                data,
                load_enable,
            },
            0,
        ))
    }

    /// The single read of `register`.
    pub fn register_read(&self, register: RegisterId) -> Result<NodeId, IrError> {
        self.single_access(register, false)
    }

    /// The single write of `register`.
    pub fn register_write(&self, register: RegisterId) -> Result<NodeId, IrError> {
        self.single_access(register, true)
    }

    fn single_access(&self, register: RegisterId, write: bool) -> Result<NodeId, IrError> {
        let reg = self.live_register(register)?;
        let access = if write { "write" } else { "read" };
        match self.register_accesses(register, write).as_slice() {
            [] => Err(IrError::NoRegisterAccess {
                register: reg.name.clone(),
                access,
            }),
            [only] => Ok(*only),
            many => Err(IrError::MultipleRegisterAccesses {
                register: reg.name.clone(),
                access,
                count: many.len(),
            }),
        }
    }

    fn register_accesses(&self, register: RegisterId, write: bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| match &node.kind {
                NodeKind::RegisterRead { register: r } => !write && *r == register,
                NodeKind::RegisterWrite { register: r, .. } => write && *r == register,
                _ => false,
            })
            .map(|(id, _)| id)
            .collect()
    }

    fn live_register(&self, id: RegisterId) -> Result<&Register, IrError> {
        self.registers
            .try_get(id)
            .ok_or(IrError::InvalidRegister(id.as_raw()))
    }

    /// Adds a trace printed when `condition` is high.
    pub fn add_trace(
        &mut self,
        condition: NodeId,
        format: &str,
        args: Vec<NodeId>,
    ) -> Result<NodeId, IrError> {
        let steps = parse_format_string(format)?;
        let expected = operands_expected_by_format(&steps);
        if expected != args.len() {
            return Err(IrError::TraceArgumentCount {
                expected,
                actual: args.len(),
            });
        }
        self.expect_width(condition, 1, || "trace condition".to_string())?;
        for &arg in &args {
            self.value_width(arg)?;
        }
        Ok(self.alloc_node(
            "trace",
            NodeKind::Trace {
                condition,
                format: steps,
                args,
            },
            0,
        ))
    }

    fn value_width(&self, id: NodeId) -> Result<u32, IrError> {
        let node = self
            .nodes
            .try_get(id)
            .ok_or(IrError::NodeNotFound(id.as_raw()))?;
        if !node.kind.is_value() {
            return Err(IrError::NotAValue(node.name.clone()));
        }
        Ok(node.width)
    }

    fn expect_width(
        &self,
        id: NodeId,
        expected: u32,
        what: impl FnOnce() -> String,
    ) -> Result<(), IrError> {
        let actual = self.value_width(id)?;
        if actual != expected {
            return Err(IrError::WidthMismatch {
                what: what(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Nodes that use `id` as an operand.
    pub fn users(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.kind.operands().contains(&id))
            .map(|(user, _)| user)
            .collect()
    }

    /// Removes a node that no other node uses.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, IrError> {
        let name = self
            .nodes
            .try_get(id)
            .ok_or(IrError::NodeNotFound(id.as_raw()))?
            .name
            .clone();
        let users = self.users(id).len();
        if users > 0 {
            return Err(IrError::NodeHasUsers { name, users });
        }
        self.ports
            .retain(|p| !matches!(p, Port::Input(n) | Port::Output(n) if *n == id));
        self.node_by_name.remove(&name);
        self.nodes.remove(id).ok_or(IrError::NodeNotFound(id.as_raw()))
    }

    /// Rearranges the port list to match `names`, which must name every port
    /// exactly once.
    pub fn reorder_ports(&mut self, names: &[&str]) -> Result<(), IrError> {
        let by_name: HashMap<&str, &Port> =
            self.ports.iter().map(|p| (self.port_name(p), p)).collect();
        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(names.len());
        for &name in names {
            if !seen.insert(name) {
                return Err(IrError::DuplicatePortInOrder(name.to_string()));
            }
            let port = by_name
                .get(name)
                .ok_or_else(|| IrError::UnknownPortInOrder(name.to_string()))?;
            reordered.push((*port).clone());
        }
        if let Some(missing) = self
            .ports
            .iter()
            .map(|p| self.port_name(p))
            .find(|n| !seen.contains(n))
        {
            return Err(IrError::MissingPortInOrder(missing.to_string()));
        }
        self.ports = reordered;
        Ok(())
    }

    /// Nodes ordered so every operand precedes its users.
    ///
    /// # Panics
    ///
    /// Panics if the node graph has a cycle, which construction rules out.
    pub fn topo_sort(&self) -> Vec<NodeId> {
        let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
        for (id, _) in self.nodes.iter() {
            index.insert(id, graph.add_node(id));
        }
        for (id, node) in self.nodes.iter() {
            for operand in node.kind.operands() {
                graph.add_edge(index[&operand], index[&id], ());
            }
        }
        match petgraph::algo::toposort(&graph, None) {
            Ok(order) => order.into_iter().map(|i| graph[i]).collect(),
            Err(cycle) => panic!(
                "block '{}' has a cycle through node '{}'",
                self.name,
                self.nodes[graph[cycle.node_id()]].name
            ),
        }
    }

    /// Human-readable dump: registers first, then nodes in topological order.
    pub fn dump_ir(&self) -> String {
        let mut out = format!("block {} {{\n", self.name);
        if let Some(clock) = self.clock_name() {
            out.push_str(&format!("  clock {clock}\n"));
        }
        for (_, reg) in self.registers.iter() {
            let line = match &reg.reset_value {
                Some(v) => format!("  reg {}(bits[{}], reset={v})\n", reg.name, reg.width),
                None => format!("  reg {}(bits[{}])\n", reg.name, reg.width),
            };
            out.push_str(&line);
        }
        for id in self.topo_sort() {
            let node = &self.nodes[id];
            let mut args: Vec<String> = node
                .kind
                .operands()
                .into_iter()
                .map(|op| self.nodes[op].name.clone())
                .collect();
            match &node.kind {
                NodeKind::Literal(v) => args.push(format!("value={v}")),
                NodeKind::RegisterRead { register } | NodeKind::RegisterWrite { register, .. } => {
                    args.push(format!("register={}", self.registers[*register].name))
                }
                _ => {}
            }
            out.push_str(&format!(
                "  {}: bits[{}] = {}({})\n",
                node.name,
                node.width,
                node.kind.mnemonic(),
                args.join(", ")
            ));
        }
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_names(block: &Block) -> Vec<String> {
        block
            .ports()
            .iter()
            .map(|p| block.port_name(p).to_string())
            .collect()
    }

    #[test]
    fn ports_keep_declaration_order() {
        let mut b = Block::new("top");
        b.add_clock_port("clk").unwrap();
        let a = b.add_input_port("a", 8).unwrap();
        b.add_output_port("out", a).unwrap();
        assert_eq!(port_names(&b), vec!["clk", "a", "out"]);
        assert_eq!(b.clock_name(), Some("clk"));
    }

    #[test]
    fn duplicate_port_is_error() {
        let mut b = Block::new("top");
        b.add_input_port("a", 1).unwrap();
        assert_eq!(
            b.add_input_port("a", 1),
            Err(IrError::DuplicatePort("a".into()))
        );
        assert_eq!(b.add_clock_port("a"), Err(IrError::DuplicatePort("a".into())));
    }

    #[test]
    fn invalid_port_name() {
        let mut b = Block::new("top");
        assert_eq!(
            b.add_input_port("a.b", 1),
            Err(IrError::InvalidPortName("a.b".into()))
        );
    }

    #[test]
    fn second_clock_is_error() {
        let mut b = Block::new("top");
        b.add_clock_port("clk").unwrap();
        assert!(matches!(
            b.add_clock_port("clk2"),
            Err(IrError::ClockAlreadyExists { .. })
        ));
    }

    #[test]
    fn port_displaces_internal_node() {
        let mut b = Block::new("top");
        let lit = b.add_literal("x", Bits::from_u64(1, 4));
        assert_eq!(b.node(lit).name, "x");
        let port = b.add_output_port("x", lit).unwrap();
        assert_eq!(b.node(port).name, "x");
        assert_eq!(b.node(lit).name, "x__2");
        assert_eq!(b.node_by_name("x"), Some(port));
        assert_eq!(b.node_by_name("x__2"), Some(lit));
        assert_eq!(b.node_by_name("x__1"), None);
    }

    #[test]
    fn clock_displaces_internal_node() {
        let mut b = Block::new("top");
        let lit = b.add_literal("clk", Bits::from_u64(0, 1));
        b.add_clock_port("clk").unwrap();
        assert_eq!(b.node(lit).name, "clk__1");
    }

    #[test]
    #[should_panic(expected = "collides with another port")]
    fn port_on_port_collision_is_fatal() {
        let mut b = Block::new("top");
        b.add_input_port("a", 1).unwrap();
        let c = b.add_input_port("c", 1).unwrap();
        b.set_port_name_exactly("a", c);
    }

    #[test]
    fn register_validation() {
        let mut b = Block::new("top");
        b.add_register("r", 8, None).unwrap();
        assert_eq!(
            b.add_register("r", 8, None),
            Err(IrError::DuplicateRegister("r".into()))
        );
        assert_eq!(
            b.add_register("z", 0, None),
            Err(IrError::ZeroWidthRegister("z".into()))
        );
        assert!(matches!(
            b.add_register("w", 8, Some(Bits::new(4))),
            Err(IrError::WidthMismatch {
                expected: 8,
                actual: 4,
                ..
            })
        ));
        assert!(b.get_register("r").is_ok());
        assert_eq!(
            b.get_register("nope"),
            Err(IrError::RegisterNotFound("nope".into()))
        );
    }

    #[test]
    fn register_name_must_be_an_identifier() {
        let mut b = Block::new("top");
        assert_eq!(
            b.add_register("pipe.stage-0", 8, None),
            Err(IrError::InvalidRegisterName("pipe.stage-0".into()))
        );
        assert_eq!(
            b.add_register("0stage", 8, None),
            Err(IrError::InvalidRegisterName("0stage".into()))
        );
        assert!(b.registers().next().is_none());
        b.add_register("pipe_stage_0", 8, None).unwrap();
    }

    #[test]
    fn port_name_of_clock_and_data_ports() {
        let mut b = Block::new("top");
        b.add_clock_port("clk").unwrap();
        b.add_input_port("a", 2).unwrap();
        let names: Vec<&str> = b.ports().iter().map(|p| b.port_name(p)).collect();
        assert_eq!(names, ["clk", "a"]);
    }

    #[test]
    fn register_and_port_names_conflict() {
        let mut b = Block::new("top");
        b.add_input_port("a", 1).unwrap();
        assert_eq!(
            b.add_register("a", 1, None),
            Err(IrError::PortRegisterCollision("a".into()))
        );
        b.add_register("r", 1, None).unwrap();
        assert_eq!(
            b.add_input_port("r", 1),
            Err(IrError::PortRegisterCollision("r".into()))
        );
    }

    #[test]
    fn register_read_and_write_lookup() {
        let mut b = Block::new("top");
        let r = b.add_register("r", 8, Some(Bits::new(8))).unwrap();
        assert!(matches!(
            b.register_read(r),
            Err(IrError::NoRegisterAccess { access: "read", .. })
        ));
        let q = b.add_register_read(r).unwrap();
        let d = b.add_input_port("d", 8).unwrap();
        let w = b.add_register_write(r, d, None).unwrap();
        assert_eq!(b.register_read(r), Ok(q));
        assert_eq!(b.register_write(r), Ok(w));

        b.add_register_read(r).unwrap();
        assert!(matches!(
            b.register_read(r),
            Err(IrError::MultipleRegisterAccesses { count: 2, .. })
        ));
    }

    #[test]
    fn register_write_checks_widths() {
        let mut b = Block::new("top");
        let r = b.add_register("r", 8, None).unwrap();
        let narrow = b.add_input_port("narrow", 4).unwrap();
        let d = b.add_input_port("d", 8).unwrap();
        assert!(matches!(
            b.add_register_write(r, narrow, None),
            Err(IrError::WidthMismatch { .. })
        ));
        assert!(matches!(
            b.add_register_write(r, d, Some(d)),
            Err(IrError::WidthMismatch { expected: 1, .. })
        ));
    }

    #[test]
    fn remove_register_in_use() {
        let mut b = Block::new("top");
        let r = b.add_register("r", 4, None).unwrap();
        let q = b.add_register_read(r).unwrap();
        assert_eq!(
            b.remove_register(r),
            Err(IrError::RegisterInUse {
                name: "r".into(),
                users: 1
            })
        );
        b.remove_node(q).unwrap();
        assert_eq!(b.remove_register(r).map(|reg| reg.name), Ok("r".to_string()));
        assert_eq!(b.registers().count(), 0);
    }

    #[test]
    fn remove_node_with_users_fails() {
        let mut b = Block::new("top");
        let a = b.add_input_port("a", 2).unwrap();
        let out = b.add_output_port("out", a).unwrap();
        assert_eq!(
            b.remove_node(a),
            Err(IrError::NodeHasUsers {
                name: "a".into(),
                users: 1
            })
        );
        b.remove_node(out).unwrap();
        b.remove_node(a).unwrap();
        assert!(b.ports().is_empty());
        assert_eq!(b.remove_node(a), Err(IrError::NodeNotFound(a.as_raw())));
    }

    #[test]
    fn trace_argument_count() {
        let mut b = Block::new("top");
        let c = b.add_input_port("c", 1).unwrap();
        let x = b.add_input_port("x", 8).unwrap();
        assert_eq!(
            b.add_trace(c, "x={} y={}", vec![x]),
            Err(IrError::TraceArgumentCount {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(b.add_trace(c, "{", vec![]), Err(IrError::Format(_))));
        assert!(matches!(
            b.add_trace(x, "{}", vec![x]),
            Err(IrError::WidthMismatch { .. })
        ));
        assert!(b.add_trace(c, "x={:#x}", vec![x]).is_ok());
    }

    #[test]
    fn reorder_ports() {
        let mut b = Block::new("top");
        let a = b.add_input_port("a", 1).unwrap();
        b.add_input_port("b", 1).unwrap();
        b.add_output_port("c", a).unwrap();

        b.reorder_ports(&["c", "a", "b"]).unwrap();
        assert_eq!(port_names(&b), vec!["c", "a", "b"]);

        assert_eq!(
            b.reorder_ports(&["a", "b"]),
            Err(IrError::MissingPortInOrder("c".into()))
        );
        assert_eq!(
            b.reorder_ports(&["a", "b", "c", "d"]),
            Err(IrError::UnknownPortInOrder("d".into()))
        );
        assert_eq!(
            b.reorder_ports(&["a", "a", "b", "c"]),
            Err(IrError::DuplicatePortInOrder("a".into()))
        );
        assert_eq!(port_names(&b), vec!["c", "a", "b"]);
    }

    #[test]
    fn dump_lists_registers_then_nodes() {
        let mut b = Block::new("counter");
        b.add_clock_port("clk").unwrap();
        let r = b.add_register("count", 4, Some(Bits::new(4))).unwrap();
        let q = b.add_register_read(r).unwrap();
        let d = b.add_input_port("d", 4).unwrap();
        b.add_register_write(r, d, None).unwrap();
        b.add_output_port("out", q).unwrap();

        let dump = b.dump_ir();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "block counter {");
        assert_eq!(lines[1], "  clock clk");
        assert_eq!(lines[2], "  reg count(bits[4], reset=0)");
        let pos = |needle: &str| {
            lines
                .iter()
                .position(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("missing {needle}"))
        };
        assert!(pos("count_read: bits[4] = register_read(register=count)") < pos("out: bits[4]"));
        assert!(pos("d: bits[4] = input_port()") < pos("count_write: bits[0]"));
        assert_eq!(lines.last(), Some(&"}"));
    }
}
