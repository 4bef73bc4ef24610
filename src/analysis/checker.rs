//! Structural walker: checks whether a class is already manipulated and
//! collects the manipulation data about it.
//!
//! The checker is driven once per unit by a structural source and consults
//! the eligibility rules for every member. Qualifying members produce a
//! [`MethodDescriptor`] populated through nested visits; nested-class
//! declarations feed a provisional ownership map that is pruned only once
//! the whole traversal has completed.

use std::collections::HashSet;
use std::sync::Arc;

use crate::analysis::annotation::AnnotationDescriptor;
use crate::analysis::descriptor::MethodDescriptor;
use crate::analysis::eligibility;
use crate::analysis::registry::FieldRegistry;
use crate::analysis::summary::UnitSummary;
use crate::analysis::visitor::{AnnotationVisitor, ClassVisitor, MethodVisitor};
use crate::classfile::{defs, flag, opcodes};
use crate::consts;

#[derive(Debug)]
pub struct ClassChecker {
    registry: Arc<FieldRegistry>,
    class_version: u32,
    class_name: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    already_manipulated: bool,
    methods: Vec<MethodDescriptor>,
    /// Nested classes provisionally owned by this unit, in declaration order.
    inners: Vec<(String, Vec<MethodDescriptor>)>,
    /// Nested classes proven untouchable (declared static, or corrected).
    excluded: HashSet<String>,
    /// Nested-class names constructed in a static context somewhere in this
    /// unit. Folded into `excluded` at finalization; classification is never
    /// final before the whole traversal completes.
    static_new_sites: HashSet<String>,
}

impl ClassChecker {
    pub fn new(registry: Arc<FieldRegistry>) -> Self {
        Self {
            registry,
            class_version: 0,
            class_name: String::new(),
            super_class: None,
            interfaces: Vec::new(),
            already_manipulated: false,
            methods: Vec::new(),
            inners: Vec::new(),
            excluded: HashSet::new(),
            static_new_sites: HashSet::new(),
        }
    }

    /// True if the marker field has been seen so far.
    pub fn is_already_manipulated(&self) -> bool {
        self.already_manipulated
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    fn is_provisional(&self, name: &str) -> bool {
        self.inners.iter().any(|(inner, _)| inner == name)
    }

    /// Finalize the traversal into an immutable [`UnitSummary`]. Applies the
    /// deferred nested-class corrections: a provisionally included class
    /// constructed in a static context is excluded, and exclusion of an
    /// outer class excludes everything lexically inside it.
    pub fn finish(self) -> UnitSummary {
        let mut excluded = self.excluded;
        for site in &self.static_new_sites {
            if self.inners.iter().any(|(name, _)| name == site) {
                excluded.insert(site.clone());
            }
        }

        let inner_classes = self
            .inners
            .into_iter()
            .filter(|(name, _)| !excluded.iter().any(|ex| name.starts_with(ex.as_str())))
            .collect();

        UnitSummary {
            class_version: self.class_version,
            class_name: self.class_name,
            super_class: self.super_class,
            interfaces: self.interfaces,
            already_manipulated: self.already_manipulated,
            methods: self.methods,
            inner_classes,
        }
    }
}

impl ClassVisitor for ClassChecker {
    fn visit(
        &mut self,
        version: u32,
        _access: u16,
        name: &str,
        super_name: Option<&str>,
        interfaces: &[String],
    ) {
        self.class_version = version;
        self.class_name = name.to_string();

        self.super_class = super_name
            .filter(|s| *s != defs::JAVA_LANG_OBJECT)
            .map(|s| s.replace('/', "."));

        for interface in interfaces {
            if interface != consts::POJO_INTERFACE {
                self.interfaces.push(interface.replace('/', "."));
            }
        }
    }

    fn visit_field(&mut self, access: u16, name: &str, desc: &str, _signature: Option<&str>) {
        if name == consts::IM_FIELD && desc == consts::INSTANCE_MANAGER_DESC {
            self.already_manipulated = true;
        }
        self.registry
            .register_field(&self.class_name, name, desc, access);
    }

    fn visit_method(
        &mut self,
        access: u16,
        name: &str,
        desc: &str,
        _signature: Option<&str>,
        _exceptions: &[String],
    ) -> Option<Box<dyn MethodVisitor + '_>> {
        // The static initializer never becomes a descriptor; its instruction
        // stream still matters for the nested-class exclusion rules.
        if name == defs::STATIC_INITIALIZER_METHOD_NAME {
            return Some(Box::new(StaticInitScanner { checker: self }));
        }

        let captured = if name == defs::CONSTRUCTOR_METHOD_NAME {
            if eligibility::is_generated_constructor(name, desc) {
                return None;
            }
            MethodDescriptor::new(consts::CONSTRUCTOR_ALIAS, desc, flag::is_static(access))
        } else {
            if eligibility::is_generated_method(name, desc) {
                return None;
            }
            MethodDescriptor::new(name, desc, flag::is_static(access))
        };

        Some(Box::new(MethodInfoCollector {
            checker: self,
            method: Some(captured),
        }))
    }

    fn visit_inner_class(
        &mut self,
        name: &str,
        outer_name: Option<&str>,
        _inner_name: Option<&str>,
        access: u16,
    ) {
        // Anonymous classes have no named owner; declarations owned by some
        // other class are silently ignored.
        let owned = match outer_name {
            Some(outer) => outer == self.class_name,
            None => true,
        };
        if !owned {
            return;
        }

        if flag::is_static(access) {
            self.excluded.insert(name.to_string());
        } else if !self.is_provisional(name) {
            self.inners.push((name.to_string(), Vec::new()));
        }
    }
}

/// Collects annotations, parameter annotations and local variables of one
/// eligible method, and watches its instruction stream for constructions of
/// provisionally included nested classes.
struct MethodInfoCollector<'a> {
    checker: &'a mut ClassChecker,
    method: Option<MethodDescriptor>,
}

impl MethodVisitor for MethodInfoCollector<'_> {
    fn visit_annotation(
        &mut self,
        desc: &str,
        visible: bool,
    ) -> Option<Box<dyn AnnotationVisitor + '_>> {
        if !visible {
            return None;
        }
        let method = self.method.as_mut()?;
        let ann = method.add_annotation(AnnotationDescriptor::new(desc, true));
        Some(Box::new(ann.capture()))
    }

    fn visit_parameter_annotation(
        &mut self,
        parameter: u16,
        desc: &str,
        visible: bool,
    ) -> Option<Box<dyn AnnotationVisitor + '_>> {
        let method = self.method.as_mut()?;
        if visible {
            let ann =
                method.add_parameter_annotation(parameter, AnnotationDescriptor::new(desc, true));
            return Some(Box::new(ann.capture()));
        }

        // Retain-only exception: keeping injected parameter annotations on
        // the original constructor is harmless and preserves the metadata
        // needed for property resolution when an already-manipulated
        // constructor is analyzed again.
        if method.name() == consts::CONSTRUCTOR_ALIAS {
            let ann =
                method.add_parameter_annotation(parameter, AnnotationDescriptor::new(desc, false));
            return Some(Box::new(ann.capture()));
        }

        None
    }

    fn visit_type_insn(&mut self, opcode: u8, class_name: &str) {
        // An object constructed inside a static method cannot carry an
        // implicit enclosing-instance reference, so a nested class built
        // here has to be treated as static in effect.
        let is_static = self.method.as_ref().map(MethodDescriptor::is_static).unwrap_or(false);
        if is_static && opcode == opcodes::NEW {
            self.checker
                .static_new_sites
                .insert(class_name.to_string());
        }
    }

    fn visit_local_variable(
        &mut self,
        name: &str,
        desc: &str,
        signature: Option<&str>,
        index: u16,
    ) {
        if let Some(method) = self.method.as_mut() {
            method.add_local_variable(name, desc, signature, index);
        }
    }

    fn visit_end(&mut self) {
        if let Some(mut method) = self.method.take() {
            method.end();
            self.checker.methods.push(method);
        }
    }
}

/// Watches `<clinit>` for constructions of nested classes. A class built
/// during static initialization is being assigned into static storage and
/// cannot safely keep a back-reference to an instance. This only arises
/// under certain external bytecode-weaving interactions.
struct StaticInitScanner<'a> {
    checker: &'a mut ClassChecker,
}

impl MethodVisitor for StaticInitScanner<'_> {
    fn visit_type_insn(&mut self, opcode: u8, class_name: &str) {
        if opcode == opcodes::NEW {
            self.checker
                .static_new_sites
                .insert(class_name.to_string());
        }
    }
}
