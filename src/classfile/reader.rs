//! ClassReader: parses a compiled unit and drives the analysis visitors.
//!
//! One forward pass over the class image, in the fixed visitation order the
//! walker relies on: header, fields, methods, nested-class declarations,
//! end. Method annotations are decoded through the full recursive
//! element_value grammar; the instruction stream of a `Code` attribute is
//! scanned linearly to surface type instructions.

use once_cell::sync::Lazy;

use crate::analysis::annotation::AttrValue;
use crate::analysis::visitor::{AnnotationVisitor, ClassVisitor, MethodVisitor};
use crate::error::{Error, Result};

use super::constpool::{Constant, ConstantPool};
use super::{defs, opcodes};

/// Bounds-checked big-endian reader over a byte slice.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn truncated(&self, what: &str) -> Error {
        Error::malformed(format!("truncated input reading {} at offset {}", what, self.pos))
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        let value = *self.bytes.get(self.pos).ok_or_else(|| self.truncated("u8"))?;
        self.pos += 1;
        Ok(value)
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.truncated("bytes"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// Structural source over a raw class image.
pub struct ClassReader<'a> {
    bytes: &'a [u8],
}

impl<'a> ClassReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Drive `visitor` through one traversal of the unit. Any structural
    /// parse failure aborts with [`Error::MalformedUnit`]; no callbacks are
    /// replayed or retried.
    pub fn accept(&self, visitor: &mut dyn ClassVisitor) -> Result<()> {
        let mut cur = Cursor::new(self.bytes);

        if cur.u32()? != defs::MAGIC {
            return Err(Error::malformed("bad magic number"));
        }
        let minor = cur.u16()?;
        let major = cur.u16()?;
        let version = ((minor as u32) << 16) | major as u32;

        let pool = ConstantPool::read(&mut cur)?;

        let access = cur.u16()?;
        let this_class = cur.u16()?;
        let name = pool.class_name(this_class)?;
        let super_index = cur.u16()?;
        let super_name = if super_index == 0 {
            None
        } else {
            Some(pool.class_name(super_index)?)
        };

        let interface_count = cur.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(cur.u16()?)?.to_string());
        }

        visitor.visit(version, access, name, super_name, &interfaces);

        let field_count = cur.u16()?;
        for _ in 0..field_count {
            let access = cur.u16()?;
            let name = pool.utf8(cur.u16()?)?;
            let desc = pool.utf8(cur.u16()?)?;
            let attrs = read_attribute_slices(&mut cur, &pool)?;
            let signature = find_signature(&attrs, &pool)?;
            visitor.visit_field(access, name, desc, signature);
        }

        let method_count = cur.u16()?;
        for _ in 0..method_count {
            let access = cur.u16()?;
            let name = pool.utf8(cur.u16()?)?;
            let desc = pool.utf8(cur.u16()?)?;
            let attrs = read_attribute_slices(&mut cur, &pool)?;
            let signature = find_signature(&attrs, &pool)?;
            let exceptions = read_exceptions(&attrs, &pool)?;

            if let Some(mut mv) = visitor.visit_method(access, name, desc, signature, &exceptions)
            {
                read_method_detail(&attrs, &pool, mv.as_mut())?;
                mv.visit_end();
            }
        }

        let class_attrs = read_attribute_slices(&mut cur, &pool)?;
        for (attr_name, data) in &class_attrs {
            if *attr_name == "InnerClasses" {
                read_inner_classes(data, &pool, visitor)?;
            }
        }

        visitor.visit_end();
        Ok(())
    }
}

/// Read an attribute list as `(name, raw bytes)` pairs.
fn read_attribute_slices<'c, 'p>(
    cur: &mut Cursor<'c>,
    pool: &'p ConstantPool,
) -> Result<Vec<(&'p str, &'c [u8])>> {
    let count = cur.u16()?;
    let mut attrs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.utf8(cur.u16()?)?;
        let length = cur.u32()? as usize;
        let data = cur.take(length)?;
        attrs.push((name, data));
    }
    Ok(attrs)
}

fn find_signature<'p>(attrs: &[(&'p str, &[u8])], pool: &'p ConstantPool) -> Result<Option<&'p str>> {
    for (name, data) in attrs {
        if *name == "Signature" {
            let mut cur = Cursor::new(data);
            return Ok(Some(pool.utf8(cur.u16()?)?));
        }
    }
    Ok(None)
}

fn read_exceptions(attrs: &[(&str, &[u8])], pool: &ConstantPool) -> Result<Vec<String>> {
    for (name, data) in attrs {
        if *name == "Exceptions" {
            let mut cur = Cursor::new(data);
            let count = cur.u16()?;
            let mut exceptions = Vec::with_capacity(count as usize);
            for _ in 0..count {
                exceptions.push(pool.class_name(cur.u16()?)?.to_string());
            }
            return Ok(exceptions);
        }
    }
    Ok(Vec::new())
}

/// Feed one method's annotation, instruction and local-variable callbacks in
/// a fixed order, independent of attribute order in the file.
fn read_method_detail(
    attrs: &[(&str, &[u8])],
    pool: &ConstantPool,
    mv: &mut dyn MethodVisitor,
) -> Result<()> {
    for (name, data) in attrs {
        match *name {
            "RuntimeVisibleAnnotations" => read_annotations(data, pool, mv, true)?,
            "RuntimeInvisibleAnnotations" => read_annotations(data, pool, mv, false)?,
            _ => {}
        }
    }
    for (name, data) in attrs {
        match *name {
            "RuntimeVisibleParameterAnnotations" => {
                read_parameter_annotations(data, pool, mv, true)?
            }
            "RuntimeInvisibleParameterAnnotations" => {
                read_parameter_annotations(data, pool, mv, false)?
            }
            _ => {}
        }
    }
    for (name, data) in attrs {
        if *name == "Code" {
            read_code(data, pool, mv)?;
        }
    }
    Ok(())
}

fn read_annotations(
    data: &[u8],
    pool: &ConstantPool,
    mv: &mut dyn MethodVisitor,
    visible: bool,
) -> Result<()> {
    let mut cur = Cursor::new(data);
    let count = cur.u16()?;
    for _ in 0..count {
        let desc = pool.utf8(cur.u16()?)?;
        let mut null = NullSink;
        let mut boxed = mv.visit_annotation(desc, visible);
        let sink: &mut dyn AnnotationVisitor = match boxed.as_mut() {
            Some(av) => av.as_mut(),
            None => &mut null,
        };
        read_annotation_values(&mut cur, pool, sink)?;
        sink.visit_end();
    }
    Ok(())
}

fn read_parameter_annotations(
    data: &[u8],
    pool: &ConstantPool,
    mv: &mut dyn MethodVisitor,
    visible: bool,
) -> Result<()> {
    let mut cur = Cursor::new(data);
    let parameter_count = cur.u8()?;
    for parameter in 0..parameter_count as u16 {
        let count = cur.u16()?;
        for _ in 0..count {
            let desc = pool.utf8(cur.u16()?)?;
            let mut null = NullSink;
            let mut boxed = mv.visit_parameter_annotation(parameter, desc, visible);
            let sink: &mut dyn AnnotationVisitor = match boxed.as_mut() {
                Some(av) => av.as_mut(),
                None => &mut null,
            };
            read_annotation_values(&mut cur, pool, sink)?;
            sink.visit_end();
        }
    }
    Ok(())
}

/// Read the `num_pairs`-prefixed name/value list of one annotation body.
fn read_annotation_values(
    cur: &mut Cursor,
    pool: &ConstantPool,
    av: &mut dyn AnnotationVisitor,
) -> Result<()> {
    let count = cur.u16()?;
    for _ in 0..count {
        let name = pool.utf8(cur.u16()?)?;
        read_element_value(cur, pool, Some(name), av)?;
    }
    Ok(())
}

fn read_element_value(
    cur: &mut Cursor,
    pool: &ConstantPool,
    name: Option<&str>,
    av: &mut dyn AnnotationVisitor,
) -> Result<()> {
    let tag = cur.u8()?;
    match tag {
        b'B' => av.visit(name, AttrValue::Byte(int_constant(pool, cur.u16()?)? as i8)),
        b'C' => av.visit(name, AttrValue::Char(int_constant(pool, cur.u16()?)? as u16)),
        b'S' => av.visit(name, AttrValue::Short(int_constant(pool, cur.u16()?)? as i16)),
        b'Z' => av.visit(name, AttrValue::Boolean(int_constant(pool, cur.u16()?)? != 0)),
        b'I' => av.visit(name, AttrValue::Int(int_constant(pool, cur.u16()?)?)),
        b'J' => match pool.get(cur.u16()?)? {
            Constant::Long(value) => av.visit(name, AttrValue::Long(*value)),
            other => return Err(element_type_error("Long", other)),
        },
        b'F' => match pool.get(cur.u16()?)? {
            Constant::Float(value) => av.visit(name, AttrValue::Float(*value)),
            other => return Err(element_type_error("Float", other)),
        },
        b'D' => match pool.get(cur.u16()?)? {
            Constant::Double(value) => av.visit(name, AttrValue::Double(*value)),
            other => return Err(element_type_error("Double", other)),
        },
        b's' => {
            let value = pool.utf8(cur.u16()?)?;
            av.visit(name, AttrValue::String(value.to_string()));
        }
        b'c' => {
            let value = pool.utf8(cur.u16()?)?;
            av.visit(name, AttrValue::Type(value.to_string()));
        }
        b'e' => {
            let desc = pool.utf8(cur.u16()?)?;
            let value = pool.utf8(cur.u16()?)?;
            av.visit_enum(name, desc, value);
        }
        b'@' => {
            let desc = pool.utf8(cur.u16()?)?;
            let mut null = NullSink;
            let mut boxed = av.visit_annotation(name, desc);
            let sink: &mut dyn AnnotationVisitor = match boxed.as_mut() {
                Some(child) => child.as_mut(),
                None => &mut null,
            };
            read_annotation_values(cur, pool, sink)?;
            sink.visit_end();
        }
        b'[' => {
            let count = cur.u16()?;
            let mut null = NullSink;
            let mut boxed = av.visit_array(name);
            let sink: &mut dyn AnnotationVisitor = match boxed.as_mut() {
                Some(child) => child.as_mut(),
                None => &mut null,
            };
            for _ in 0..count {
                read_element_value(cur, pool, None, sink)?;
            }
            sink.visit_end();
        }
        other => {
            return Err(Error::malformed(format!(
                "unknown element_value tag {:#04x}",
                other
            )))
        }
    }
    Ok(())
}

fn int_constant(pool: &ConstantPool, index: u16) -> Result<i32> {
    match pool.get(index)? {
        Constant::Integer(value) => Ok(*value),
        other => Err(element_type_error("Integer", other)),
    }
}

fn element_type_error(expected: &str, found: &Constant) -> Error {
    Error::malformed(format!(
        "element_value constant is not {} (found {:?})",
        expected, found
    ))
}

/// Sink that swallows an annotation structure the method visitor declined;
/// the bytes still have to be consumed to keep the parse aligned.
struct NullSink;

impl AnnotationVisitor for NullSink {
    fn visit(&mut self, _name: Option<&str>, _value: AttrValue) {}

    fn visit_enum(&mut self, _name: Option<&str>, _desc: &str, _value: &str) {}

    fn visit_annotation(
        &mut self,
        _name: Option<&str>,
        _desc: &str,
    ) -> Option<Box<dyn AnnotationVisitor + '_>> {
        Some(Box::new(NullSink))
    }

    fn visit_array(&mut self, _name: Option<&str>) -> Option<Box<dyn AnnotationVisitor + '_>> {
        Some(Box::new(NullSink))
    }
}

fn read_code(data: &[u8], pool: &ConstantPool, mv: &mut dyn MethodVisitor) -> Result<()> {
    let mut cur = Cursor::new(data);
    let _max_stack = cur.u16()?;
    let _max_locals = cur.u16()?;
    let code_length = cur.u32()? as usize;
    let code = cur.take(code_length)?;
    scan_instructions(code, pool, mv)?;

    let exception_entries = cur.u16()? as usize;
    cur.take(exception_entries * 8)?;

    let attrs = read_attribute_slices(&mut cur, pool)?;

    // Generic signatures live in a sibling table, joined on (start_pc, slot).
    let mut signatures: Vec<((u16, u16), &str)> = Vec::new();
    for (name, table) in &attrs {
        if *name == "LocalVariableTypeTable" {
            let mut c = Cursor::new(table);
            let count = c.u16()?;
            for _ in 0..count {
                let start_pc = c.u16()?;
                let _length = c.u16()?;
                let _name = c.u16()?;
                let signature = pool.utf8(c.u16()?)?;
                let index = c.u16()?;
                signatures.push(((start_pc, index), signature));
            }
        }
    }

    for (name, table) in &attrs {
        if *name == "LocalVariableTable" {
            let mut c = Cursor::new(table);
            let count = c.u16()?;
            for _ in 0..count {
                let start_pc = c.u16()?;
                let _length = c.u16()?;
                let var_name = pool.utf8(c.u16()?)?;
                let desc = pool.utf8(c.u16()?)?;
                let index = c.u16()?;
                let signature = signatures
                    .iter()
                    .find(|(key, _)| *key == (start_pc, index))
                    .map(|(_, sig)| *sig);
                mv.visit_local_variable(var_name, desc, signature, index);
            }
        }
    }

    Ok(())
}

/// Extra operand bytes per opcode; -1 marks opcodes that are invalid or
/// need special handling (`tableswitch`, `lookupswitch`, `wide`).
static OPERAND_LEN: Lazy<[i16; 256]> = Lazy::new(|| {
    let mut table = [-1i16; 256];
    let mut set = |range: std::ops::RangeInclusive<usize>, len: i16| {
        for op in range {
            table[op] = len;
        }
    };
    set(0x00..=0x0f, 0); // nop, consts
    set(0x10..=0x10, 1); // bipush
    set(0x11..=0x11, 2); // sipush
    set(0x12..=0x12, 1); // ldc
    set(0x13..=0x14, 2); // ldc_w, ldc2_w
    set(0x15..=0x19, 1); // loads
    set(0x1a..=0x35, 0); // load shortcuts, array loads
    set(0x36..=0x3a, 1); // stores
    set(0x3b..=0x83, 0); // store shortcuts, stack, arithmetic
    set(0x84..=0x84, 2); // iinc
    set(0x85..=0x98, 0); // conversions, comparisons
    set(0x99..=0xa8, 2); // branches, jsr
    set(0xa9..=0xa9, 1); // ret
    set(0xac..=0xb1, 0); // returns
    set(0xb2..=0xb8, 2); // field access, invokes
    set(0xb9..=0xba, 4); // invokeinterface, invokedynamic
    set(0xbb..=0xbb, 2); // new
    set(0xbc..=0xbc, 1); // newarray
    set(0xbd..=0xbd, 2); // anewarray
    set(0xbe..=0xbf, 0); // arraylength, athrow
    set(0xc0..=0xc1, 2); // checkcast, instanceof
    set(0xc2..=0xc3, 0); // monitors
    set(0xc5..=0xc5, 3); // multianewarray
    set(0xc6..=0xc7, 2); // ifnull, ifnonnull
    set(0xc8..=0xc9, 4); // goto_w, jsr_w
    table
});

/// Linear scan of a method's bytecode, emitting type-instruction callbacks.
fn scan_instructions(code: &[u8], pool: &ConstantPool, mv: &mut dyn MethodVisitor) -> Result<()> {
    let mut pc = 0usize;
    while pc < code.len() {
        let op = code[pc];
        match op {
            opcodes::NEW | opcodes::ANEWARRAY | opcodes::CHECKCAST | opcodes::INSTANCEOF => {
                let index = read_u16_at(code, pc + 1)?;
                mv.visit_type_insn(op, pool.class_name(index)?);
                pc += 3;
            }
            opcodes::TABLESWITCH => {
                let pad = (4 - ((pc + 1) % 4)) % 4;
                let base = pc + 1 + pad;
                let low = read_i32_at(code, base + 4)?;
                let high = read_i32_at(code, base + 8)?;
                if high < low {
                    return Err(Error::malformed("tableswitch bounds inverted"));
                }
                pc = base + 12 + (high as i64 - low as i64 + 1) as usize * 4;
            }
            opcodes::LOOKUPSWITCH => {
                let pad = (4 - ((pc + 1) % 4)) % 4;
                let base = pc + 1 + pad;
                let npairs = read_i32_at(code, base + 4)?;
                if npairs < 0 {
                    return Err(Error::malformed("lookupswitch pair count negative"));
                }
                pc = base + 8 + npairs as usize * 8;
            }
            opcodes::WIDE => {
                let modified = *code
                    .get(pc + 1)
                    .ok_or_else(|| Error::malformed("truncated wide instruction"))?;
                pc += if modified == opcodes::IINC { 6 } else { 4 };
            }
            other => {
                let extra = OPERAND_LEN[other as usize];
                if extra < 0 {
                    return Err(Error::malformed(format!(
                        "unknown opcode {:#04x} at pc {}",
                        other, pc
                    )));
                }
                pc += 1 + extra as usize;
            }
        }
    }
    if pc > code.len() {
        return Err(Error::malformed("truncated final instruction"));
    }
    Ok(())
}

fn read_u16_at(code: &[u8], at: usize) -> Result<u16> {
    match (code.get(at), code.get(at + 1)) {
        (Some(hi), Some(lo)) => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(Error::malformed("truncated instruction operand")),
    }
}

fn read_i32_at(code: &[u8], at: usize) -> Result<i32> {
    if at + 4 > code.len() {
        return Err(Error::malformed("truncated switch payload"));
    }
    Ok(i32::from_be_bytes([
        code[at],
        code[at + 1],
        code[at + 2],
        code[at + 3],
    ]))
}

fn read_inner_classes(
    data: &[u8],
    pool: &ConstantPool,
    visitor: &mut dyn ClassVisitor,
) -> Result<()> {
    let mut cur = Cursor::new(data);
    let count = cur.u16()?;
    for _ in 0..count {
        let inner_index = cur.u16()?;
        let outer_index = cur.u16()?;
        let inner_name_index = cur.u16()?;
        let access = cur.u16()?;

        let inner = pool.class_name(inner_index)?;
        let outer = if outer_index == 0 {
            None
        } else {
            Some(pool.class_name(outer_index)?)
        };
        let simple_name = if inner_name_index == 0 {
            None
        } else {
            Some(pool.utf8(inner_name_index)?)
        };
        visitor.visit_inner_class(inner, outer, simple_name, access);
    }
    Ok(())
}
