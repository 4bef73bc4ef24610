//! Aggregate result of one unit traversal

use crate::analysis::descriptor::MethodDescriptor;
use crate::classfile::defs;

/// Everything the generation pass needs to know about one compiled unit.
/// Built exactly once by [`crate::analysis::checker::ClassChecker::finish`]
/// and immutable afterwards.
#[derive(Debug)]
pub struct UnitSummary {
    pub(crate) class_version: u32,
    pub(crate) class_name: String,
    pub(crate) super_class: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) already_manipulated: bool,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) inner_classes: Vec<(String, Vec<MethodDescriptor>)>,
}

impl UnitSummary {
    /// True when the marker field was found: the unit has already been
    /// manipulated and must not be processed again.
    pub fn is_already_manipulated(&self) -> bool {
        self.already_manipulated
    }

    /// Source format version as read (`minor << 16 | major`), needed to pick
    /// a compatible emission strategy downstream.
    pub fn class_version(&self) -> u32 {
        self.class_version
    }

    /// Major format version.
    pub fn major_version(&self) -> u16 {
        defs::major_of(self.class_version)
    }

    /// Internal (slash-separated) name of the unit.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Dotted superclass name, or `None` when the superclass is
    /// `java/lang/Object`.
    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    /// Declared interfaces (dotted, declaration order), without the marker
    /// interface.
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Eligible methods and constructors in declaration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Nested classes owned by this unit and eligible for recursive
    /// processing, with their (possibly still empty) member lists.
    pub fn inner_classes_and_methods(&self) -> &[(String, Vec<MethodDescriptor>)] {
        &self.inner_classes
    }
}
