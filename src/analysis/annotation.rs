//! Attribute tree: capture and replay of annotation contents.
//!
//! Annotations are captured during the structural traversal into an ordered
//! tree of [`AttrNode`] values and replayed later onto a destination sink,
//! typically a freshly synthesized method or constructor. One variant type
//! serves top-level attributes, nested annotations and array elements alike.

use crate::analysis::visitor::{AnnotationVisitor, MethodVisitor};

/// Scalar value carried by a simple attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class constant, stored as a type descriptor.
    Type(String),
}

/// One attribute of an annotation. `name` is `None` for array elements.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrNode {
    Simple {
        name: Option<String>,
        value: AttrValue,
    },
    EnumRef {
        name: Option<String>,
        desc: String,
        value: String,
    },
    Nested {
        name: Option<String>,
        desc: String,
        values: Vec<AttrNode>,
    },
    Array {
        name: Option<String>,
        values: Vec<AttrNode>,
    },
}

impl AttrNode {
    /// Replay this node onto a destination container, reproducing the
    /// captured call sequence value for value and order for order.
    pub fn replay(&self, av: &mut dyn AnnotationVisitor) {
        match self {
            AttrNode::Simple { name, value } => av.visit(name.as_deref(), value.clone()),
            AttrNode::EnumRef { name, desc, value } => {
                av.visit_enum(name.as_deref(), desc, value)
            }
            AttrNode::Nested { name, desc, values } => {
                if let Some(mut child) = av.visit_annotation(name.as_deref(), desc) {
                    for node in values {
                        node.replay(child.as_mut());
                    }
                    child.visit_end();
                }
            }
            AttrNode::Array { name, values } => {
                if let Some(mut child) = av.visit_array(name.as_deref()) {
                    for node in values {
                        node.replay(child.as_mut());
                    }
                    child.visit_end();
                }
            }
        }
    }
}

/// A captured method- or parameter-level annotation.
///
/// `visible` mirrors the runtime visibility of the source annotation. A
/// descriptor captured with `visible = false` is retain-only: it is replayed
/// with the same marking so a re-analysis still sees it, but the generation
/// pass does not advertise it at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDescriptor {
    desc: String,
    visible: bool,
    values: Vec<AttrNode>,
}

impl AnnotationDescriptor {
    pub fn new(desc: impl Into<String>, visible: bool) -> Self {
        Self {
            desc: desc.into(),
            visible,
            values: Vec::new(),
        }
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn values(&self) -> &[AttrNode] {
        &self.values
    }

    /// Open a capture sink appending into this annotation's value list.
    pub fn capture(&mut self) -> AttributeCapture<'_> {
        AttributeCapture {
            dest: &mut self.values,
        }
    }

    /// Recreate this annotation on a destination method or constructor.
    pub fn replay(&self, mv: &mut dyn MethodVisitor) {
        if let Some(mut av) = mv.visit_annotation(&self.desc, self.visible) {
            for node in &self.values {
                node.replay(av.as_mut());
            }
            av.visit_end();
        }
    }

    /// Recreate this annotation on a parameter slot of a destination method.
    pub fn replay_on_parameter(&self, parameter: u16, mv: &mut dyn MethodVisitor) {
        if let Some(mut av) = mv.visit_parameter_annotation(parameter, &self.desc, self.visible) {
            for node in &self.values {
                node.replay(av.as_mut());
            }
            av.visit_end();
        }
    }

    /// Recreate this annotation inside another attribute container (a nested
    /// annotation slot or an array element).
    pub fn replay_nested(&self, name: Option<&str>, av: &mut dyn AnnotationVisitor) {
        if let Some(mut child) = av.visit_annotation(name, &self.desc) {
            for node in &self.values {
                node.replay(child.as_mut());
            }
            child.visit_end();
        }
    }
}

/// Capture sink building an [`AttrNode`] list in arrival order.
///
/// Child handles returned for nested annotations and arrays borrow the
/// container they append into, so a finished (dropped) container can no
/// longer gain children.
pub struct AttributeCapture<'a> {
    dest: &'a mut Vec<AttrNode>,
}

impl<'a> AttributeCapture<'a> {
    pub fn new(dest: &'a mut Vec<AttrNode>) -> Self {
        Self { dest }
    }
}

impl AnnotationVisitor for AttributeCapture<'_> {
    fn visit(&mut self, name: Option<&str>, value: AttrValue) {
        self.dest.push(AttrNode::Simple {
            name: name.map(str::to_string),
            value,
        });
    }

    fn visit_enum(&mut self, name: Option<&str>, desc: &str, value: &str) {
        self.dest.push(AttrNode::EnumRef {
            name: name.map(str::to_string),
            desc: desc.to_string(),
            value: value.to_string(),
        });
    }

    fn visit_annotation(
        &mut self,
        name: Option<&str>,
        desc: &str,
    ) -> Option<Box<dyn AnnotationVisitor + '_>> {
        self.dest.push(AttrNode::Nested {
            name: name.map(str::to_string),
            desc: desc.to_string(),
            values: Vec::new(),
        });
        match self.dest.last_mut() {
            Some(AttrNode::Nested { values, .. }) => {
                Some(Box::new(AttributeCapture { dest: values }))
            }
            _ => None,
        }
    }

    fn visit_array(&mut self, name: Option<&str>) -> Option<Box<dyn AnnotationVisitor + '_>> {
        self.dest.push(AttrNode::Array {
            name: name.map(str::to_string),
            values: Vec::new(),
        });
        match self.dest.last_mut() {
            Some(AttrNode::Array { values, .. }) => {
                Some(Box::new(AttributeCapture { dest: values }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_preserves_arrival_order_across_kinds() {
        let mut ann = AnnotationDescriptor::new("Ltest/Ann;", true);
        {
            let mut cap = ann.capture();
            cap.visit(Some("a"), AttrValue::Int(1));
            cap.visit_enum(Some("b"), "Ltest/E;", "ONE");
            cap.visit(Some("c"), AttrValue::String("x".into()));
            cap.visit_end();
        }
        let names: Vec<_> = ann
            .values()
            .iter()
            .map(|n| match n {
                AttrNode::Simple { name, .. }
                | AttrNode::EnumRef { name, .. }
                | AttrNode::Nested { name, .. }
                | AttrNode::Array { name, .. } => name.clone(),
            })
            .collect();
        assert_eq!(
            names,
            vec![Some("a".into()), Some("b".into()), Some("c".into())]
        );
    }

    #[test]
    fn array_elements_are_unnamed() {
        let mut ann = AnnotationDescriptor::new("Ltest/Ann;", true);
        {
            let mut cap = ann.capture();
            let mut arr = cap.visit_array(Some("values")).expect("array sink");
            arr.visit(None, AttrValue::Int(1));
            arr.visit(None, AttrValue::Int(2));
            arr.visit_end();
        }
        match &ann.values()[0] {
            AttrNode::Array { name, values } => {
                assert_eq!(name.as_deref(), Some("values"));
                assert_eq!(values.len(), 2);
                assert!(values
                    .iter()
                    .all(|v| matches!(v, AttrNode::Simple { name: None, .. })));
            }
            other => panic!("expected array node, got {:?}", other),
        }
    }
}
