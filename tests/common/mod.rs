//! Shared helper for integration tests: builds small class images in memory.
//!
//! `ClassImage` assembles a syntactically valid class file byte by byte, so
//! the tests can exercise the reader and checker end to end without any
//! fixture files on disk.

#![allow(dead_code)]

enum PoolEntry {
    Utf8(String),
    Integer(i32),
    Class(u16),
}

struct Member {
    access: u16,
    name_index: u16,
    desc_index: u16,
    attributes: Vec<(String, Vec<u8>)>,
}

pub struct ClassImage {
    pool: Vec<PoolEntry>,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    inner_classes: Vec<(u16, u16, u16, u16)>,
    attributes: Vec<(String, Vec<u8>)>,
}

impl ClassImage {
    pub fn new(name: &str) -> Self {
        let mut image = Self {
            pool: Vec::new(),
            access: 0x0021, // ACC_PUBLIC | ACC_SUPER
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            attributes: Vec::new(),
        };
        image.this_class = image.class(name);
        image.super_class = image.class("java/lang/Object");
        image
    }

    /// Intern a Utf8 constant, reusing an existing slot when possible.
    pub fn utf8(&mut self, value: &str) -> u16 {
        for (i, entry) in self.pool.iter().enumerate() {
            if let PoolEntry::Utf8(existing) = entry {
                if existing == value {
                    return (i + 1) as u16;
                }
            }
        }
        self.pool.push(PoolEntry::Utf8(value.to_string()));
        self.pool.len() as u16
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.pool.push(PoolEntry::Integer(value));
        self.pool.len() as u16
    }

    /// Intern a Class constant for an internal (slash-separated) name.
    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        for (i, entry) in self.pool.iter().enumerate() {
            if let PoolEntry::Class(existing) = entry {
                if *existing == name_index {
                    return (i + 1) as u16;
                }
            }
        }
        self.pool.push(PoolEntry::Class(name_index));
        self.pool.len() as u16
    }

    pub fn set_super(&mut self, name: &str) {
        self.super_class = self.class(name);
    }

    pub fn add_interface(&mut self, name: &str) {
        let index = self.class(name);
        self.interfaces.push(index);
    }

    pub fn add_field(&mut self, access: u16, name: &str, desc: &str) {
        let name_index = self.utf8(name);
        let desc_index = self.utf8(desc);
        self.fields.push(Member {
            access,
            name_index,
            desc_index,
            attributes: Vec::new(),
        });
    }

    pub fn add_method(&mut self, access: u16, name: &str, desc: &str, attrs: Vec<(&str, Vec<u8>)>) {
        let name_index = self.utf8(name);
        let desc_index = self.utf8(desc);
        self.methods.push(Member {
            access,
            name_index,
            desc_index,
            attributes: attrs
                .into_iter()
                .map(|(name, data)| (name.to_string(), data))
                .collect(),
        });
    }

    /// Declare a nested class in the `InnerClasses` table. `outer` is `None`
    /// for anonymous classes.
    pub fn add_inner_class(
        &mut self,
        inner: &str,
        outer: Option<&str>,
        simple: Option<&str>,
        access: u16,
    ) {
        let inner_index = self.class(inner);
        let outer_index = outer.map(|o| self.class(o)).unwrap_or(0);
        let simple_index = simple.map(|s| self.utf8(s)).unwrap_or(0);
        self.inner_classes
            .push((inner_index, outer_index, simple_index, access));
    }

    pub fn add_class_attribute(&mut self, name: &str, data: Vec<u8>) {
        self.attributes.push((name.to_string(), data));
    }

    pub fn build(&mut self) -> Vec<u8> {
        // Attribute names must resolve through the pool, so intern them
        // before the pool is serialized.
        let mut field_attrs = Vec::new();
        for i in 0..self.fields.len() {
            let attrs = self.fields[i].attributes.clone();
            let mut named = Vec::new();
            for (name, data) in attrs {
                named.push((self.intern_for_build(&name), data));
            }
            field_attrs.push(named);
        }
        let mut method_attrs = Vec::new();
        for i in 0..self.methods.len() {
            let attrs = self.methods[i].attributes.clone();
            let mut named = Vec::new();
            for (name, data) in attrs {
                named.push((self.intern_for_build(&name), data));
            }
            method_attrs.push(named);
        }
        let mut class_attrs: Vec<(u16, Vec<u8>)> = Vec::new();
        if !self.inner_classes.is_empty() {
            let name_index = self.intern_for_build("InnerClasses");
            let mut data = Vec::new();
            data.extend_from_slice(&(self.inner_classes.len() as u16).to_be_bytes());
            for (inner, outer, simple, access) in &self.inner_classes {
                data.extend_from_slice(&inner.to_be_bytes());
                data.extend_from_slice(&outer.to_be_bytes());
                data.extend_from_slice(&simple.to_be_bytes());
                data.extend_from_slice(&access.to_be_bytes());
            }
            class_attrs.push((name_index, data));
        }
        let extra = self.attributes.clone();
        for (name, data) in &extra {
            class_attrs.push((self.intern_for_build(name), data.clone()));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&52u16.to_be_bytes()); // major, Java 8

        out.extend_from_slice(&((self.pool.len() + 1) as u16).to_be_bytes());
        for entry in &self.pool {
            match entry {
                PoolEntry::Utf8(value) => {
                    out.push(1);
                    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
                PoolEntry::Integer(value) => {
                    out.push(3);
                    out.extend_from_slice(&value.to_be_bytes());
                }
                PoolEntry::Class(name_index) => {
                    out.push(7);
                    out.extend_from_slice(&name_index.to_be_bytes());
                }
            }
        }

        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }

        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for (field, attrs) in self.fields.iter().zip(&field_attrs) {
            write_member(&mut out, field, attrs);
        }
        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for (method, attrs) in self.methods.iter().zip(&method_attrs) {
            write_member(&mut out, method, attrs);
        }

        out.extend_from_slice(&(class_attrs.len() as u16).to_be_bytes());
        for (name_index, data) in &class_attrs {
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            out.extend_from_slice(data);
        }
        out
    }

    fn intern_for_build(&mut self, name: &str) -> u16 {
        self.utf8(name)
    }
}

fn write_member(out: &mut Vec<u8>, member: &Member, attrs: &[(u16, Vec<u8>)]) {
    out.extend_from_slice(&member.access.to_be_bytes());
    out.extend_from_slice(&member.name_index.to_be_bytes());
    out.extend_from_slice(&member.desc_index.to_be_bytes());
    out.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
    for (name_index, data) in attrs {
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
    }
}

/// Payload of a `RuntimeVisibleAnnotations`-style attribute.
pub fn annotations_attr(annotations: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for a in annotations {
        out.extend_from_slice(a);
    }
    out
}

/// One `annotation` structure: type descriptor index and name/value pairs.
pub fn annotation(type_index: u16, pairs: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&type_index.to_be_bytes());
    out.extend_from_slice(&(pairs.len() as u16).to_be_bytes());
    for (name_index, value) in pairs {
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(value);
    }
    out
}

/// Payload of a `RuntimeVisibleParameterAnnotations`-style attribute; one
/// inner slice of annotation structures per parameter slot.
pub fn parameter_annotations_attr(parameters: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(parameters.len() as u8);
    for annotations in parameters {
        out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
        for a in annotations {
            out.extend_from_slice(a);
        }
    }
    out
}

pub fn ev_int(const_index: u16) -> Vec<u8> {
    let mut out = vec![b'I'];
    out.extend_from_slice(&const_index.to_be_bytes());
    out
}

pub fn ev_string(utf8_index: u16) -> Vec<u8> {
    let mut out = vec![b's'];
    out.extend_from_slice(&utf8_index.to_be_bytes());
    out
}

pub fn ev_enum(type_index: u16, const_index: u16) -> Vec<u8> {
    let mut out = vec![b'e'];
    out.extend_from_slice(&type_index.to_be_bytes());
    out.extend_from_slice(&const_index.to_be_bytes());
    out
}

pub fn ev_annotation(type_index: u16, pairs: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = vec![b'@'];
    out.extend_from_slice(&annotation(type_index, pairs));
    out
}

pub fn ev_array(elements: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![b'['];
    out.extend_from_slice(&(elements.len() as u16).to_be_bytes());
    for e in elements {
        out.extend_from_slice(e);
    }
    out
}

/// Payload of a `Code` attribute wrapping `code`, with no exception table
/// and no nested attributes.
pub fn code_attr(code: &[u8]) -> Vec<u8> {
    code_attr_with(code, &[])
}

/// `Code` attribute payload with nested attributes (`LocalVariableTable`
/// and friends); `attrs` pairs are (pool index of name, data).
pub fn code_attr_with(code: &[u8], attrs: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&2u16.to_be_bytes()); // max_stack
    out.extend_from_slice(&2u16.to_be_bytes()); // max_locals
    out.extend_from_slice(&(code.len() as u32).to_be_bytes());
    out.extend_from_slice(code);
    out.extend_from_slice(&0u16.to_be_bytes()); // exception table
    out.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
    for (name_index, data) in attrs {
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
    }
    out
}

/// Instruction sequence `new #class_index; dup; pop; return`.
pub fn new_and_return(class_index: u16) -> Vec<u8> {
    let mut code = vec![0xbb]; // new
    code.extend_from_slice(&class_index.to_be_bytes());
    code.push(0x59); // dup
    code.push(0x57); // pop
    code.push(0xb1); // return
    code
}
