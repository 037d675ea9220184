//! Protocol units
//!
//! A protocol is an independently authored bundle of field defaults, methods
//! and accessors, plus a capability check. Protocols never reference each
//! other; they meet only inside a composition.
//!
//! ```
//! use composed_model::{ProtocolBuilder, Value};
//!
//! let loading = ProtocolBuilder::new("WithLoading")
//!     .field("$loading", false)
//!     .build();
//!
//! let bare = loading.instantiate().unwrap();
//! assert_eq!(bare.get("$loading").unwrap(), Value::Bool(false));
//! assert!(loading.is_implemented_in(&bare));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::errors::ObjectResult;
use crate::identifiers::Brand;
use crate::instance::{Branded, Instance};
use crate::member::{Accessor, Member, MemberTable, StaticMember, StaticTable};
use crate::value::Value;

/// Name of the capability-check static every protocol carries
pub const IS_IMPLEMENTED_IN: &str = "isImplementedIn";

/// Extra initialization hook run on the bare instance
pub type InitFn = Arc<dyn Fn(&mut Instance) -> ObjectResult<()> + Send + Sync>;

struct ProtocolInner {
    name: String,
    brand: Brand,
    members: MemberTable,
    statics: StaticTable,
    requirements: BTreeSet<String>,
    initializer: Option<InitFn>,
}

/// An immutable, shareable protocol unit
#[derive(Clone)]
pub struct Protocol {
    inner: Arc<ProtocolInner>,
}

impl Protocol {
    /// Display name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Unique marker installed on every instance built with this protocol
    pub fn brand(&self) -> Brand {
        self.inner.brand
    }

    /// Declared members: field defaults, methods and accessors
    pub fn members(&self) -> &MemberTable {
        &self.inner.members
    }

    /// Static surface, including the capability check
    pub fn statics(&self) -> &StaticTable {
        &self.inner.statics
    }

    /// Abstract members a sibling protocol or the final class must supply
    pub fn requirements(&self) -> &BTreeSet<String> {
        &self.inner.requirements
    }

    /// Build the bare standalone instance.
    ///
    /// Declared members go in first, then the initializer hook runs, then the
    /// brand is written. An initializer error is returned as-is.
    pub fn instantiate(&self) -> ObjectResult<Instance> {
        let mut bare = Instance::new();
        bare.define_all(&self.inner.members);
        if let Some(init) = &self.inner.initializer {
            init(&mut bare)?;
        }
        bare.mark(self.inner.brand);
        Ok(bare)
    }

    /// Capability check. Never fails; ill-formed candidates yield `false`.
    pub fn is_implemented_in<B: Branded + ?Sized>(&self, candidate: &B) -> bool {
        candidate
            .brand_set()
            .is_some_and(|brands| brands.contains(self.inner.brand))
    }

    /// Whether two handles refer to the same protocol unit
    pub fn same_as(&self, other: &Protocol) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protocol")
            .field("name", &self.inner.name)
            .field("brand", &self.inner.brand)
            .field("members", &self.inner.members.names().collect::<Vec<_>>())
            .field("requirements", &self.inner.requirements)
            .finish()
    }
}

/// Typed handle for a protocol unit defined once per process.
///
/// Implementors usually back [`ProtocolUnit::protocol`] with a
/// `once_cell::sync::Lazy` static.
pub trait ProtocolUnit {
    /// The shared protocol definition
    fn protocol() -> &'static Protocol;

    /// Capability check against this unit
    fn is_implemented_in<B: Branded + ?Sized>(candidate: &B) -> bool {
        Self::protocol().is_implemented_in(candidate)
    }
}

/// Builder for [`Protocol`]
pub struct ProtocolBuilder {
    name: String,
    members: MemberTable,
    statics: StaticTable,
    requirements: BTreeSet<String>,
    initializer: Option<InitFn>,
}

impl ProtocolBuilder {
    /// Start a protocol definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: MemberTable::new(),
            statics: StaticTable::new(),
            requirements: BTreeSet::new(),
            initializer: None,
        }
    }

    /// Declare a field with its default value
    pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.members.insert(name, Member::Field(default.into()));
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

    /// Declare an abstract member supplied elsewhere
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.requirements.insert(name.into());
        self
    }

    /// Extra hook run on the bare instance after defaults are applied
    pub fn initializer<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Instance) -> ObjectResult<()> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(init));
        self
    }

    /// Finish the definition and allocate its brand
    pub fn build(mut self) -> Protocol {
        let brand = Brand::next();
        self.statics.insert(
            IS_IMPLEMENTED_IN,
            StaticMember::Function(Arc::new(move |args: &[Value]| {
                let hit = args
                    .first()
                    .and_then(Branded::brand_set)
                    .is_some_and(|brands| brands.contains(brand));
                Ok(Value::Bool(hit))
            })),
        );

        Protocol {
            inner: Arc::new(ProtocolInner {
                name: self.name,
                brand,
                members: self.members,
                statics: self.statics,
                requirements: self.requirements,
                initializer: self.initializer,
            }),
        }
    }
}
