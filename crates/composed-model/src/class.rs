//! Constructible classes
//!
//! A class is a stage in a construction chain. Constructing it runs, in
//! order: the parent stage (with mapped arguments), this stage's protocols,
//! this stage's own members, and finally its constructor body. Every later
//! write wins, so subclass members override inherited ones and protocol
//! defaults override whatever the base constructor set.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::errors::{ComposeError, ObjectError, ObjectResult};
use crate::identifiers::ClassId;
use crate::instance::Instance;
use crate::member::{Accessor, Member, MemberTable, StaticMember, StaticTable};
use crate::protocol::Protocol;
use crate::value::Value;

/// Maps a subclass's construction arguments to its parent's
pub type ArgsMapper = Arc<dyn Fn(&[Value]) -> Vec<Value> + Send + Sync>;

/// Constructor body, run after all inherited and own members are in place
pub type ConstructorFn = Arc<dyn Fn(&mut Instance, &[Value]) -> ObjectResult<()> + Send + Sync>;

pub(crate) struct ClassParts {
    pub name: String,
    pub arity: usize,
    pub parent: Option<Class>,
    pub protocols: Vec<Protocol>,
    pub members: MemberTable,
    pub protocol_surface: MemberTable,
    pub statics: StaticTable,
    pub requirements: BTreeSet<String>,
    pub super_args: Option<ArgsMapper>,
    pub constructor: Option<ConstructorFn>,
    pub strict_arity: bool,
}

struct ClassInner {
    id: ClassId,
    parts: ClassParts,
}

/// Shareable handle to a class definition
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    pub(crate) fn from_parts(parts: ClassParts) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                id: ClassId::next(),
                parts,
            }),
        }
    }

    /// Nominal identity
    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.inner.parts.name
    }

    /// Number of required construction arguments
    pub fn arity(&self) -> usize {
        self.inner.parts.arity
    }

    /// Direct parent class
    pub fn parent(&self) -> Option<&Class> {
        self.inner.parts.parent.as_ref()
    }

    /// Protocol units applied at this stage
    pub fn protocols(&self) -> &[Protocol] {
        &self.inner.parts.protocols
    }

    /// Own static surface (not including inherited statics)
    pub fn statics(&self) -> &StaticTable {
        &self.inner.parts.statics
    }

    /// Prototype view: merged protocol behavior, then own behavior
    pub fn prototype(&self) -> MemberTable {
        let mut table = self.inner.parts.protocol_surface.clone();
        table.merge_from(&self.inner.parts.members.behavior(), &[]);
        table
    }

    /// Whether `self` is `other` or derives from it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestors().any(|c| c.id() == other.id())
    }

    /// This class followed by every ancestor, most derived first
    pub fn ancestors(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |c| c.parent())
    }

    /// Nominal check: whether `instance` was constructed through this class
    pub fn is_instance(&self, instance: &Instance) -> bool {
        instance.is_instance_of_id(self.id())
    }

    /// Read a static value. `name` and `length` report the class identity.
    pub fn static_value(&self, name: &str) -> Value {
        match name {
            "name" => return Value::from(self.name()),
            "length" => return Value::Number(self.arity() as f64),
            _ => {}
        }
        match self.find_static(name) {
            Some(StaticMember::Value(value)) => value.clone(),
            Some(StaticMember::Function(_)) | None => Value::Undefined,
        }
    }

    /// Invoke a static function, searching the class then its ancestors
    pub fn call_static(&self, name: &str, args: &[Value]) -> ObjectResult<Value> {
        match self.find_static(name) {
            Some(StaticMember::Function(f)) => f(args),
            _ => Err(ObjectError::not_callable(name)),
        }
    }

    fn find_static(&self, name: &str) -> Option<&StaticMember> {
        self.ancestors().find_map(|c| c.inner.parts.statics.get(name))
    }

    /// Requirements declared anywhere in the lineage that nothing supplies
    pub fn unresolved_requirements(&self) -> Vec<String> {
        let mut required = BTreeSet::new();
        let mut supplied: HashSet<&str> = HashSet::new();
        for class in self.ancestors() {
            let parts = &class.inner.parts;
            required.extend(parts.requirements.iter().map(String::as_str));
            supplied.extend(parts.members.names());
            for protocol in &parts.protocols {
                required.extend(protocol.requirements().iter().map(String::as_str));
                supplied.extend(protocol.members().names());
            }
        }
        required
            .into_iter()
            .filter(|name| !supplied.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Whether abstract members remain unsupplied
    pub fn is_abstract(&self) -> bool {
        !self.unresolved_requirements().is_empty()
    }

    /// Construct an instance
    pub fn construct(&self, args: &[Value]) -> ObjectResult<Instance> {
        let parts = &self.inner.parts;
        let args = fit_arity(&parts.name, parts.arity, parts.strict_arity, args.to_vec())?;
        let mut instance = Instance::new();
        self.initialize(&mut instance, &args)?;
        Ok(instance)
    }

    pub(crate) fn initialize(&self, instance: &mut Instance, args: &[Value]) -> ObjectResult<()> {
        let parts = &self.inner.parts;
        if let Some(parent) = &parts.parent {
            let forwarded = match &parts.super_args {
                Some(map) => map(args),
                None => args.to_vec(),
            };
            let forwarded =
                fit_arity(parent.name(), parent.arity(), parts.strict_arity, forwarded)?;
            parent.initialize(instance, &forwarded)?;
        }
        instance.enter_class(self.id());
        apply_protocols(&parts.protocols, instance)?;
        instance.define_all(&parts.members);
        if let Some(constructor) = &parts.constructor {
            constructor(instance, args)?;
        }
        Ok(())
    }
}

/// Enforce a class arity on its arguments.
///
/// Strict mode rejects short argument lists; lenient mode pads them with
/// `Undefined` so constructors can index up to the arity.
fn fit_arity(
    class: &str,
    arity: usize,
    strict: bool,
    mut args: Vec<Value>,
) -> ObjectResult<Vec<Value>> {
    if args.len() < arity {
        if strict {
            return Err(ObjectError::MissingArguments {
                class: class.to_string(),
                expected: arity,
                actual: args.len(),
            });
        }
        args.resize(arity, Value::Undefined);
    }
    Ok(args)
}

/// Instantiate each protocol bare and copy it onto `instance`, in list order
pub(crate) fn apply_protocols(protocols: &[Protocol], instance: &mut Instance) -> ObjectResult<()> {
    for protocol in protocols {
        trace!(protocol = protocol.name(), "applying protocol defaults");
        let bare = protocol.instantiate().map_err(|err| {
            debug!(protocol = protocol.name(), error = %err, "protocol initializer failed");
            err
        })?;
        instance.adopt(bare);
    }
    Ok(())
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = &self.inner.parts;
        f.debug_struct("Class")
            .field("id", &self.inner.id)
            .field("name", &parts.name)
            .field("arity", &parts.arity)
            .field("parent", &parts.parent.as_ref().map(Class::name))
            .field(
                "protocols",
                &parts.protocols.iter().map(Protocol::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for base classes and subclasses of templates
pub struct ClassBuilder {
    name: String,
    arity: usize,
    parent: Option<Class>,
    members: MemberTable,
    statics: StaticTable,
    super_args: Option<ArgsMapper>,
    constructor: Option<ConstructorFn>,
    is_abstract: bool,
    config: EngineConfig,
}

impl ClassBuilder {
    /// Start a class definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: 0,
            parent: None,
            members: MemberTable::new(),
            statics: StaticTable::new(),
            super_args: None,
            constructor: None,
            is_abstract: false,
            config: EngineConfig::global().clone(),
        }
    }

    /// Derive from `parent`
    pub fn extends(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Required construction argument count
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Use a specific engine configuration
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Allow requirements to remain unsupplied
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Declare a field with its initial value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name, Member::Field(value.into()));
        self
    }

    /// Declare a method
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> ObjectResult<Value> + Send + Sync + 'static,
    {
        self.members.insert(name, Member::Method(Arc::new(body)));
        self
    }

    /// Declare the read half of an accessor
    pub fn getter<F>(mut self, name: impl Into<String>, get: F) -> Self
    where
        F: Fn(&Instance) -> ObjectResult<Value> + Send + Sync + 'static,
    {
        self.members.insert_getter(name, Arc::new(get));
        self
    }

    /// Declare the write half of an accessor
    pub fn setter<F>(mut self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut Instance, Value) -> ObjectResult<()> + Send + Sync + 'static,
    {
        self.members.insert_setter(name, Arc::new(set));
        self
    }

    /// Declare a getter/setter pair in one record
    pub fn accessor<G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&Instance) -> ObjectResult<Value> + Send + Sync + 'static,
        S: Fn(&mut Instance, Value) -> ObjectResult<()> + Send + Sync + 'static,
    {
        self.members.insert(
            name,
            Member::Accessor(Accessor {
                get: Some(Arc::new(get)),
                set: Some(Arc::new(set)),
            }),
        );
        self
    }

    /// Declare a static value
    pub fn static_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(name, StaticMember::Value(value.into()));
        self
    }

    /// Declare a static function
    pub fn static_method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> ObjectResult<Value> + Send + Sync + 'static,
    {
        self.statics.insert(name, StaticMember::Function(Arc::new(body)));
        self
    }

    /// Map this class's arguments onto the parent's. Defaults to forwarding.
    pub fn super_args<F>(mut self, map: F) -> Self
    where
        F: Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static,
    {
        self.super_args = Some(Arc::new(map));
        self
    }

    /// Constructor body
    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> ObjectResult<()> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(body));
        self
    }

    /// Finish the definition.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::MissingRequirements`] when a concrete class
    /// leaves a protocol requirement unsupplied.
    pub fn build(self) -> Result<Class, ComposeError> {
        let is_abstract = self.is_abstract;
        let class = Class::from_parts(ClassParts {
            name: self.name,
            arity: self.arity,
            parent: self.parent,
            protocols: Vec::new(),
            members: self.members,
            protocol_surface: MemberTable::new(),
            statics: self.statics,
            requirements: BTreeSet::new(),
            super_args: self.super_args,
            constructor: self.constructor,
            strict_arity: self.config.strict_arity,
        });

        if !is_abstract {
            let missing = class.unresolved_requirements();
            if !missing.is_empty() {
                return Err(ComposeError::MissingRequirements {
                    class: class.name().to_string(),
                    missing,
                });
            }
        }

        debug!(
            class = class.name(),
            parent = class.parent().map(Class::name),
            "class defined"
        );
        Ok(class)
    }
}
