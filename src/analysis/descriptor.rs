//! Per-member records assembled during the structural traversal

use std::collections::BTreeMap;

use crate::analysis::annotation::AnnotationDescriptor;

/// A local variable slot of a captured method, used downstream to resolve
/// parameter names.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub index: u16,
}

/// Record of one eligible method or constructor: name (constructors appear
/// under the `$init` pseudo-name), descriptor, staticness, and the captured
/// annotation metadata needed to recreate the member.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    name: String,
    descriptor: String,
    is_static: bool,
    annotations: Vec<AnnotationDescriptor>,
    parameter_annotations: BTreeMap<u16, Vec<AnnotationDescriptor>>,
    local_variables: Vec<LocalVariable>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>, is_static: bool) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            is_static,
            annotations: Vec::new(),
            parameter_annotations: BTreeMap::new(),
            local_variables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn annotations(&self) -> &[AnnotationDescriptor] {
        &self.annotations
    }

    pub fn parameter_annotations(&self) -> &BTreeMap<u16, Vec<AnnotationDescriptor>> {
        &self.parameter_annotations
    }

    pub fn local_variables(&self) -> &[LocalVariable] {
        &self.local_variables
    }

    /// Append a method-level annotation and hand back its slot so the caller
    /// can open a capture sink on it.
    pub fn add_annotation(&mut self, ann: AnnotationDescriptor) -> &mut AnnotationDescriptor {
        self.annotations.push(ann);
        let last = self.annotations.len() - 1;
        &mut self.annotations[last]
    }

    /// Append an annotation for the given parameter slot.
    pub fn add_parameter_annotation(
        &mut self,
        parameter: u16,
        ann: AnnotationDescriptor,
    ) -> &mut AnnotationDescriptor {
        let slot = self.parameter_annotations.entry(parameter).or_default();
        slot.push(ann);
        let last = slot.len() - 1;
        &mut slot[last]
    }

    pub fn add_local_variable(
        &mut self,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        index: u16,
    ) {
        self.local_variables.push(LocalVariable {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
            index,
        });
    }

    /// Close the descriptor after its member has been fully visited.
    pub fn end(&mut self) {
        self.annotations.shrink_to_fit();
        self.local_variables.shrink_to_fit();
    }
}
