//! Predicates deciding whether a member was synthesized by a previous
//! manipulation pass.
//!
//! Running the engine over an already-manipulated class must not re-capture
//! synthesized members as if they were source code; these checks are
//! evaluated before any descriptor is created. A descriptor that cannot be
//! parsed never matches, so odd members fall through to normal capture.

use crate::classfile::descriptor::{argument_types, return_type, returns_void};
use crate::classfile::defs;
use crate::consts;

/// True for constructors synthesized by a previous pass: `<init>` taking the
/// runtime support type as its first argument.
pub fn is_generated_constructor(name: &str, desc: &str) -> bool {
    name == defs::CONSTRUCTOR_METHOD_NAME && first_argument_is_instance_manager(desc)
}

/// True when the first argument of `desc` is the runtime support type.
pub fn first_argument_is_instance_manager(desc: &str) -> bool {
    argument_types(desc)
        .map(|args| args.first().map(String::as_str) == Some(consts::INSTANCE_MANAGER_DESC))
        .unwrap_or(false)
}

/// True for any method synthesized by a previous pass.
pub fn is_generated_method(name: &str, desc: &str) -> bool {
    is_getter_method(name, desc)
        || is_setter_method(name, desc)
        || is_set_instance_manager_method(name)
        || is_get_component_instance_method(name, desc)
        || is_manipulated_method(name)
}

// TYPE __getX()
fn is_getter_method(name: &str, desc: &str) -> bool {
    name.starts_with(consts::GETTER_PREFIX)
        && argument_types(desc).map(|args| args.is_empty()).unwrap_or(false)
        && !returns_void(desc)
}

// void __setX(TYPE)
fn is_setter_method(name: &str, desc: &str) -> bool {
    name.starts_with(consts::SETTER_PREFIX)
        && argument_types(desc).map(|args| args.len() == 1).unwrap_or(false)
        && returns_void(desc)
}

fn is_set_instance_manager_method(name: &str) -> bool {
    name.starts_with(consts::SET_INSTANCE_MANAGER_PREFIX)
}

fn is_get_component_instance_method(name: &str, desc: &str) -> bool {
    name.starts_with(consts::GET_COMPONENT_INSTANCE_PREFIX)
        && return_type(desc) == Some(consts::COMPONENT_INSTANCE_DESC)
}

fn is_manipulated_method(name: &str) -> bool {
    name.starts_with(consts::MANIPULATION_PREFIX)
}
