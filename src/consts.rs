//! Fixed naming contract shared with the member-generation pass.
//!
//! These identities are not configurable: they are how a manipulated class
//! is recognized across repeated runs of the engine, and how source members
//! are told apart from members synthesized by a previous pass.

/// Field injected into every manipulated class; its presence means the class
/// has already been processed and must not be processed again.
pub const IM_FIELD: &str = "__IM";

/// Descriptor of the runtime support type carried by `IM_FIELD` and taken as
/// the first argument of synthesized constructors.
pub const INSTANCE_MANAGER_DESC: &str = "Lorg/apache/felix/ipojo/InstanceManager;";

/// Return type of the synthesized component-instance accessor.
pub const COMPONENT_INSTANCE_DESC: &str = "Lorg/apache/felix/ipojo/ComponentInstance;";

/// Marker interface added to manipulated classes; filtered out of the
/// collected interface list.
pub const POJO_INTERFACE: &str = "org/apache/felix/ipojo/Pojo";

/// Prefix of synthesized field getters (`TYPE __getX()`).
pub const GETTER_PREFIX: &str = "__get";

/// Prefix of synthesized field setters (`void __setX(TYPE)`).
pub const SETTER_PREFIX: &str = "__set";

/// Prefix of the synthesized support-object setter.
pub const SET_INSTANCE_MANAGER_PREFIX: &str = "_setInstanceManager";

/// Prefix of the synthesized component-instance getter.
pub const GET_COMPONENT_INSTANCE_PREFIX: &str = "getComponentInstance";

/// Prefix applied to relocated original method bodies.
pub const MANIPULATION_PREFIX: &str = "__M_";

/// Pseudo-name under which original constructors are captured.
pub const CONSTRUCTOR_ALIAS: &str = "$init";
