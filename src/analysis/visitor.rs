//! Visitor seams between the structural source and the analysis pass.
//!
//! The structural source ([`crate::classfile::reader::ClassReader`]) drives a
//! [`ClassVisitor`] in a fixed order: class header, fields, methods,
//! nested-class declarations, end. Method-level detail (annotations,
//! instruction stream, local variables) flows through the [`MethodVisitor`]
//! returned by `visit_method`.
//!
//! [`AnnotationVisitor`] is deliberately the same abstraction on both sides
//! of the engine: the capture pass implements it to build an attribute tree,
//! and the generation pass implements it as the destination onto which a
//! stored tree is replayed.

use crate::analysis::annotation::AttrValue;

/// Callbacks for one compiled unit, in visitation order.
pub trait ClassVisitor {
    /// Class header: version (`minor << 16 | major`), access flags, internal
    /// name, superclass internal name (`None` for `java/lang/Object` itself)
    /// and declared interfaces.
    fn visit(
        &mut self,
        version: u32,
        access: u16,
        name: &str,
        super_name: Option<&str>,
        interfaces: &[String],
    );

    fn visit_field(&mut self, access: u16, name: &str, desc: &str, signature: Option<&str>) {
        let _ = (access, name, desc, signature);
    }

    /// Visit a method declaration. Returning `None` skips the method body;
    /// otherwise the returned visitor receives the method detail callbacks
    /// followed by `visit_end`.
    fn visit_method(
        &mut self,
        access: u16,
        name: &str,
        desc: &str,
        signature: Option<&str>,
        exceptions: &[String],
    ) -> Option<Box<dyn MethodVisitor + '_>> {
        let _ = (access, name, desc, signature, exceptions);
        None
    }

    /// Nested-class declaration. `outer_name` is `None` for anonymous
    /// classes, `inner_name` is `None` when the class has no simple name.
    fn visit_inner_class(
        &mut self,
        name: &str,
        outer_name: Option<&str>,
        inner_name: Option<&str>,
        access: u16,
    ) {
        let _ = (name, outer_name, inner_name, access);
    }

    fn visit_end(&mut self) {}
}

/// Callbacks for one method body.
pub trait MethodVisitor {
    fn visit_annotation(
        &mut self,
        desc: &str,
        visible: bool,
    ) -> Option<Box<dyn AnnotationVisitor + '_>> {
        let _ = (desc, visible);
        None
    }

    fn visit_parameter_annotation(
        &mut self,
        parameter: u16,
        desc: &str,
        visible: bool,
    ) -> Option<Box<dyn AnnotationVisitor + '_>> {
        let _ = (parameter, desc, visible);
        None
    }

    /// A type instruction (`new`, `anewarray`, `checkcast`, `instanceof`)
    /// referencing `class_name` in internal form.
    fn visit_type_insn(&mut self, opcode: u8, class_name: &str) {
        let _ = (opcode, class_name);
    }

    fn visit_local_variable(
        &mut self,
        name: &str,
        desc: &str,
        signature: Option<&str>,
        index: u16,
    ) {
        let _ = (name, desc, signature, index);
    }

    fn visit_end(&mut self) {}
}

/// Sink for the contents of one annotation value container.
///
/// `name` is `None` for array elements, which are positional. A container
/// handle stays usable until `visit_end`; the capture implementation borrows
/// its parent, so the parent cannot be touched while a child is open.
pub trait AnnotationVisitor {
    fn visit(&mut self, name: Option<&str>, value: AttrValue);

    fn visit_enum(&mut self, name: Option<&str>, desc: &str, value: &str);

    fn visit_annotation(
        &mut self,
        name: Option<&str>,
        desc: &str,
    ) -> Option<Box<dyn AnnotationVisitor + '_>>;

    fn visit_array(&mut self, name: Option<&str>) -> Option<Box<dyn AnnotationVisitor + '_>>;

    fn visit_end(&mut self) {}
}
