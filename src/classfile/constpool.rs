//! Constant pool model and byte-level reader

use crate::error::{Error, Result};
use super::reader::Cursor;

#[derive(Debug)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
}

mod constant_tags {
    pub const CONSTANT_UTF8: u8 = 1;
    pub const CONSTANT_INTEGER: u8 = 3;
    pub const CONSTANT_FLOAT: u8 = 4;
    pub const CONSTANT_LONG: u8 = 5;
    pub const CONSTANT_DOUBLE: u8 = 6;
    pub const CONSTANT_CLASS: u8 = 7;
    pub const CONSTANT_STRING: u8 = 8;
    pub const CONSTANT_FIELDREF: u8 = 9;
    pub const CONSTANT_METHODREF: u8 = 10;
    pub const CONSTANT_INTERFACEMETHODREF: u8 = 11;
    pub const CONSTANT_NAMEANDTYPE: u8 = 12;
    pub const CONSTANT_METHODHANDLE: u8 = 15;
    pub const CONSTANT_METHODTYPE: u8 = 16;
    pub const CONSTANT_DYNAMIC: u8 = 17;
    pub const CONSTANT_INVOKEDYNAMIC: u8 = 18;
    pub const CONSTANT_MODULE: u8 = 19;
    pub const CONSTANT_PACKAGE: u8 = 20;
}

/// Constant pool of a parsed class. Entries are 1-based; `Long` and `Double`
/// occupy two slots, the second of which is unusable.
#[derive(Debug)]
pub struct ConstantPool {
    constants: Vec<Option<Constant>>,
}

impl ConstantPool {
    pub fn read(cur: &mut Cursor) -> Result<Self> {
        use constant_tags::*;

        let count = cur.u16()?;
        let mut constants: Vec<Option<Constant>> = Vec::with_capacity(count as usize);
        constants.push(None); // slot 0 is reserved

        while constants.len() < count as usize {
            let tag = cur.u8()?;
            let constant = match tag {
                CONSTANT_UTF8 => {
                    let len = cur.u16()? as usize;
                    let bytes = cur.take(len)?;
                    let value = String::from_utf8(bytes.to_vec()).map_err(|_| {
                        Error::malformed(format!(
                            "invalid UTF-8 in constant pool entry {}",
                            constants.len()
                        ))
                    })?;
                    Constant::Utf8(value)
                }
                CONSTANT_INTEGER => Constant::Integer(cur.u32()? as i32),
                CONSTANT_FLOAT => Constant::Float(f32::from_bits(cur.u32()?)),
                CONSTANT_LONG => {
                    let hi = cur.u32()? as u64;
                    let lo = cur.u32()? as u64;
                    Constant::Long(((hi << 32) | lo) as i64)
                }
                CONSTANT_DOUBLE => {
                    let hi = cur.u32()? as u64;
                    let lo = cur.u32()? as u64;
                    Constant::Double(f64::from_bits((hi << 32) | lo))
                }
                CONSTANT_CLASS => Constant::Class(cur.u16()?),
                CONSTANT_STRING => Constant::String(cur.u16()?),
                CONSTANT_FIELDREF => Constant::FieldRef(cur.u16()?, cur.u16()?),
                CONSTANT_METHODREF => Constant::MethodRef(cur.u16()?, cur.u16()?),
                CONSTANT_INTERFACEMETHODREF => {
                    Constant::InterfaceMethodRef(cur.u16()?, cur.u16()?)
                }
                CONSTANT_NAMEANDTYPE => Constant::NameAndType(cur.u16()?, cur.u16()?),
                CONSTANT_METHODHANDLE => Constant::MethodHandle(cur.u8()?, cur.u16()?),
                CONSTANT_METHODTYPE => Constant::MethodType(cur.u16()?),
                CONSTANT_DYNAMIC => Constant::Dynamic(cur.u16()?, cur.u16()?),
                CONSTANT_INVOKEDYNAMIC => Constant::InvokeDynamic(cur.u16()?, cur.u16()?),
                CONSTANT_MODULE => Constant::Module(cur.u16()?),
                CONSTANT_PACKAGE => Constant::Package(cur.u16()?),
                other => {
                    return Err(Error::malformed(format!(
                        "unknown constant pool tag {} at entry {}",
                        other,
                        constants.len()
                    )))
                }
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            constants.push(Some(constant));
            if wide {
                constants.push(None);
            }
        }

        Ok(Self { constants })
    }

    pub fn get(&self, index: u16) -> Result<&Constant> {
        self.constants
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::malformed(format!("invalid constant pool index {}", index)))
    }

    /// Resolve an index expected to be a `CONSTANT_Utf8`.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(Error::malformed(format!(
                "constant pool index {} is not Utf8 (found {:?})",
                index, other
            ))),
        }
    }

    /// Resolve an index expected to be a `CONSTANT_Class` to its internal name.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            other => Err(Error::malformed(format!(
                "constant pool index {} is not a Class (found {:?})",
                index, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes(entries: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&((entries.len() + 1) as u16).to_be_bytes());
        for e in entries {
            out.extend_from_slice(e);
        }
        out
    }

    fn utf8_entry(s: &str) -> Vec<u8> {
        let mut e = vec![1u8];
        e.extend_from_slice(&(s.len() as u16).to_be_bytes());
        e.extend_from_slice(s.as_bytes());
        e
    }

    #[test]
    fn reads_utf8_and_class_entries() {
        let bytes = pool_bytes(&[utf8_entry("test/Component"), vec![7, 0, 1]]);
        let mut cur = Cursor::new(&bytes);
        let pool = ConstantPool::read(&mut cur).expect("Failed to read pool");
        assert_eq!(pool.utf8(1).expect("utf8"), "test/Component");
        assert_eq!(pool.class_name(2).expect("class"), "test/Component");
    }

    #[test]
    fn long_entries_take_two_slots() {
        let mut long_entry = vec![5u8];
        long_entry.extend_from_slice(&42i64.to_be_bytes());
        // Long occupies slots 1-2, the Utf8 lands in slot 3.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&4u16.to_be_bytes());
        bytes.extend_from_slice(&long_entry);
        bytes.extend_from_slice(&utf8_entry("x"));
        let mut cur = Cursor::new(&bytes);
        let pool = ConstantPool::read(&mut cur).expect("Failed to read pool");
        assert!(matches!(pool.get(1), Ok(Constant::Long(42))));
        assert!(pool.get(2).is_err());
        assert_eq!(pool.utf8(3).expect("utf8"), "x");
    }

    #[test]
    fn rejects_unknown_tag() {
        let bytes = pool_bytes(&[vec![99u8]]);
        let mut cur = Cursor::new(&bytes);
        assert!(ConstantPool::read(&mut cur).is_err());
    }
}
