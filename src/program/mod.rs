pub mod chunk;
pub mod labels;
pub mod opcode;

pub use chunk::Program;
pub use labels::LabelTable;
pub use opcode::{Opcode, OperandKind};
