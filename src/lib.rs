//! classcheck
//!
//! Structural analysis and annotation capture for compiled-class
//! manipulation. The engine walks a compiled unit once, decides which
//! members are genuine source content (as opposed to members synthesized by
//! a previous manipulation pass), and builds an intermediate model precise
//! enough to drive member generation, including a replayable tree of every
//! retained annotation.
//!
//! ## Architecture
//!
//! - **classfile**: byte-level structural source (constant pool, descriptor
//!   parsing, the `ClassReader` that drives the visitors)
//! - **analysis**: the walker (`ClassChecker`), eligibility rules, the
//!   attribute tree, and the shared field registry
//! - **consts**: the fixed naming contract shared with the generation pass
//! - **bin**: command-line interface for inspecting compiled classes
//!
//! ## Analysis Flow
//!
//! ```text
//! .class bytes → ClassReader → ClassChecker → UnitSummary
//!                                   ↓
//!                          FieldRegistry (batch-wide)
//! ```

pub mod analysis;
pub mod classfile;
pub mod consts;
pub mod error;

pub use analysis::{
    AnnotationDescriptor, AttrNode, AttrValue, ClassChecker, FieldRegistry, MethodDescriptor,
    UnitSummary,
};
pub use classfile::ClassReader;
pub use error::{Error, Result};

use std::sync::Arc;

/// Analyze one compiled unit.
///
/// Runs a single forward traversal over `bytes`, registering every field
/// with `registry` and returning the unit's immutable summary. Fails with
/// [`Error::MalformedUnit`] when the image cannot be parsed; no partial
/// summary is produced.
pub fn analyze(bytes: &[u8], registry: &Arc<FieldRegistry>) -> Result<UnitSummary> {
    let mut checker = ClassChecker::new(Arc::clone(registry));
    ClassReader::new(bytes).accept(&mut checker)?;
    Ok(checker.finish())
}

/// Analyze a batch of compiled units and close the registration phase.
///
/// All field registrations of every unit complete before this function
/// returns, so generation may start consuming the registry for any unit
/// afterwards. The first malformed unit aborts the batch.
pub fn analyze_batch(units: &[&[u8]], registry: &Arc<FieldRegistry>) -> Result<Vec<UnitSummary>> {
    let mut summaries = Vec::with_capacity(units.len());
    for bytes in units {
        summaries.push(analyze(bytes, registry)?);
    }
    registry.freeze();
    Ok(summaries)
}
