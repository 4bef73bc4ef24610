//! Structural analysis and annotation capture

pub mod annotation;
pub mod checker;
pub mod descriptor;
pub mod eligibility;
pub mod registry;
pub mod summary;
pub mod visitor;

pub use annotation::{AnnotationDescriptor, AttrNode, AttrValue, AttributeCapture};
pub use checker::ClassChecker;
pub use descriptor::{LocalVariable, MethodDescriptor};
pub use registry::{FieldRegistry, RegisteredField};
pub use summary::UnitSummary;
pub use visitor::{AnnotationVisitor, ClassVisitor, MethodVisitor};
