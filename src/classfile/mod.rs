//! Byte-level classfile structures: the structural source of the analysis

pub mod constpool;
pub mod defs;
pub mod descriptor;
pub mod flag;
pub mod opcodes;
pub mod reader;

pub use constpool::{Constant, ConstantPool};
pub use reader::ClassReader;
