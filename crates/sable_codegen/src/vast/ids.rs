//! Handles into the arenas of a [`VerilogFile`](super::VerilogFile).

use sable_ir::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// An expression node.
    ExprId
);
define_id!(
    /// A statement node.
    StmtId
);
define_id!(
    /// A `begin ... end` statement block.
    BlockId
);
define_id!(
    /// A signal declaration.
    DefId
);
define_id!(
    /// A module.
    ModuleId
);
define_id!(
    /// A group of module members.
    SectionId
);
define_id!(
    /// A clocked register block.
    FlopId
);
define_id!(
    /// A `localparam` declaration.
    LocalParamId
);
define_id!(
    /// A function definition.
    FunctionId
);
