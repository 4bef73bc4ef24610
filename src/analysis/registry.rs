//! Process-wide field registry shared by all unit analyses of a batch.
//!
//! Every field visited during analysis is recorded here so the generation
//! pass can decide how to rewrite field access across the whole batch. The
//! registry is the only state shared between independent unit analyses;
//! `freeze` marks the batch-wide barrier between registration and
//! generation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One field discovered during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredField {
    pub name: String,
    pub descriptor: String,
    pub access: u16,
}

/// Thread-safe accumulator of `(owner, field)` tuples.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Mutex<BTreeMap<String, Vec<RegisteredField>>>,
    frozen: AtomicBool,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one field of `owner`. Called once per field visited; has no
    /// observable result. Registrations arriving after `freeze` are dropped.
    pub fn register_field(&self, owner: &str, name: &str, descriptor: &str, access: u16) {
        if self.frozen.load(Ordering::Acquire) {
            debug_assert!(false, "field registered after analysis barrier");
            return;
        }
        let mut fields = self.fields.lock().unwrap_or_else(|e| e.into_inner());
        fields
            .entry(owner.to_string())
            .or_default()
            .push(RegisteredField {
                name: name.to_string(),
                descriptor: descriptor.to_string(),
                access,
            });
    }

    /// Close the registration phase. All unit analyses of a batch must have
    /// completed before generation starts consuming the registry.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Fields registered for one owning unit, in registration order.
    pub fn fields_of(&self, owner: &str) -> Vec<RegisteredField> {
        let fields = self.fields.lock().unwrap_or_else(|e| e.into_inner());
        fields.get(owner).cloned().unwrap_or_default()
    }

    /// Full view of the registry, keyed by owning unit.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<RegisteredField>> {
        let fields = self.fields.lock().unwrap_or_else(|e| e.into_inner());
        fields.clone()
    }
}
