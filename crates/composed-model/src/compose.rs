//! Composition engine: merge and extend
//!
//! Merging happens once, when a template is defined. It produces the ordered
//! protocol list replayed on every construction, the merged prototype surface
//! and the merged static surface. Everything merges last-wins in list order.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::class::{Class, ClassParts};
use crate::config::EngineConfig;
use crate::errors::{ComposeError, ObjectResult};
use crate::instance::Instance;
use crate::member::{MemberTable, StaticTable};
use crate::protocol::Protocol;
use crate::value::Value;

/// Compose protocol units with the global configuration.
///
/// ```
/// use composed_model::{compose_protocols, ProtocolBuilder, Value};
///
/// let a = ProtocolBuilder::new("A").field("x", 1).build();
/// let b = ProtocolBuilder::new("B").field("x", 2).build();
///
/// let template = compose_protocols(&[a.clone(), b.clone()]).unwrap();
/// let instance = template.construct().unwrap();
/// assert_eq!(instance.get("x").unwrap(), Value::from(2));
/// assert!(a.is_implemented_in(&instance) && b.is_implemented_in(&instance));
/// ```
pub fn compose_protocols(protocols: &[Protocol]) -> Result<ComposedTemplate, ComposeError> {
    compose_protocols_with(EngineConfig::global(), protocols)
}

/// Compose protocol units with an explicit configuration
pub fn compose_protocols_with(
    config: &EngineConfig,
    protocols: &[Protocol],
) -> Result<ComposedTemplate, ComposeError> {
    config.validate()?;
    if protocols.is_empty() {
        return Err(ComposeError::EmptyComposition);
    }

    let mut prototype = MemberTable::new();
    let mut statics = StaticTable::new();
    let mut supplied: HashSet<&str> = HashSet::new();
    let mut requirements = BTreeSet::new();
    for protocol in protocols {
        prototype.merge_from(&protocol.members().behavior(), &config.prototype_deny_list);
        statics.merge_from(protocol.statics(), &config.static_deny_list);
        supplied.extend(protocol.members().names());
        requirements.extend(protocol.requirements().iter().cloned());
    }
    requirements.retain(|name: &String| !supplied.contains(name.as_str()));

    let name = protocols
        .iter()
        .map(Protocol::name)
        .collect::<Vec<_>>()
        .join(" & ");

    debug!(
        template = %name,
        protocols = protocols.len(),
        prototype = prototype.len(),
        statics = statics.len(),
        "composed protocol template"
    );

    let class = Class::from_parts(ClassParts {
        name,
        arity: 0,
        parent: None,
        protocols: protocols.to_vec(),
        members: MemberTable::new(),
        protocol_surface: prototype,
        statics,
        requirements,
        super_args: None,
        constructor: None,
        strict_arity: config.strict_arity,
    });

    Ok(ComposedTemplate {
        class,
        config: config.clone(),
    })
}

/// Compose protocol units given as expressions yielding `Protocol` or `&Protocol`.
///
/// ```
/// use composed_model::{compose, ProtocolBuilder};
///
/// let a = ProtocolBuilder::new("A").field("a", true).build();
/// let b = ProtocolBuilder::new("B").field("b", true).build();
/// let template = compose!(a, &b).unwrap();
/// assert_eq!(template.protocols().len(), 2);
/// ```
#[macro_export]
macro_rules! compose {
    ($($protocol:expr),+ $(,)?) => {
        $crate::compose_protocols(&[$($crate::Protocol::clone(&$protocol)),+])
    };
}

/// Template built from an ordered protocol list, constructible with no arguments
#[derive(Clone, Debug)]
pub struct ComposedTemplate {
    class: Class,
    config: EngineConfig,
}

impl ComposedTemplate {
    /// Construct an instance carrying every protocol's defaults and brand
    pub fn construct(&self) -> ObjectResult<Instance> {
        self.class.construct(&[])
    }

    /// The template as a class, for subclassing with [`crate::ClassBuilder`]
    pub fn as_class(&self) -> &Class {
        &self.class
    }

    /// Source protocols in composition order
    pub fn protocols(&self) -> &[Protocol] {
        self.class.protocols()
    }

    /// Merged prototype surface (methods and accessors)
    pub fn prototype(&self) -> MemberTable {
        self.class.prototype()
    }

    /// Merged static surface
    pub fn statics(&self) -> &StaticTable {
        self.class.statics()
    }

    /// Read a static value
    pub fn static_value(&self, name: &str) -> Value {
        self.class.static_value(name)
    }

    /// Invoke a merged static function
    pub fn call_static(&self, name: &str, args: &[Value]) -> ObjectResult<Value> {
        self.class.call_static(name, args)
    }

    /// Requirements no composed protocol supplies
    pub fn requirements(&self) -> Vec<String> {
        self.class.unresolved_requirements()
    }

    /// Re-parent the template onto `base`.
    ///
    /// The result takes the base's name and arity, forwards its arguments to
    /// the base unchanged, then applies every composed protocol. Neither the
    /// base nor this template is modified.
    pub fn extend(&self, base: &Class) -> ExtendedTemplate {
        let mut statics = StaticTable::new();
        statics.merge_from(self.class.statics(), &self.config.static_deny_list);
        let mut prototype = MemberTable::new();
        prototype.merge_from(&self.class.prototype(), &self.config.prototype_deny_list);

        debug!(
            template = self.class.name(),
            base = base.name(),
            "extended protocol template"
        );

        let class = Class::from_parts(ClassParts {
            name: base.name().to_string(),
            arity: base.arity(),
            parent: Some(base.clone()),
            protocols: self.class.protocols().to_vec(),
            members: MemberTable::new(),
            protocol_surface: prototype,
            statics,
            requirements: BTreeSet::new(),
            super_args: None,
            constructor: None,
            strict_arity: self.config.strict_arity,
        });
        ExtendedTemplate { class }
    }
}

/// A composed template re-parented onto a base class
#[derive(Clone, Debug)]
pub struct ExtendedTemplate {
    class: Class,
}

impl ExtendedTemplate {
    /// Construct with the base class's arguments
    pub fn construct(&self, args: &[Value]) -> ObjectResult<Instance> {
        self.class.construct(args)
    }

    /// The template as a class, for subclassing with [`crate::ClassBuilder`]
    pub fn as_class(&self) -> &Class {
        &self.class
    }

    /// The base class this template was re-parented onto
    pub fn base(&self) -> &Class {
        self.class.parent().unwrap_or(&self.class)
    }

    /// Source protocols in composition order
    pub fn protocols(&self) -> &[Protocol] {
        self.class.protocols()
    }

    /// Merged prototype surface (methods and accessors)
    pub fn prototype(&self) -> MemberTable {
        self.class.prototype()
    }

    /// Merged static surface
    pub fn statics(&self) -> &StaticTable {
        self.class.statics()
    }

    /// Read a static value, falling back to the base class
    pub fn static_value(&self, name: &str) -> Value {
        self.class.static_value(name)
    }

    /// Invoke a static function, falling back to the base class
    pub fn call_static(&self, name: &str, args: &[Value]) -> ObjectResult<Value> {
        self.class.call_static(name, args)
    }

    /// Requirements neither the protocols nor the base supply
    pub fn requirements(&self) -> Vec<String> {
        self.class.unresolved_requirements()
    }
}
