//! Constructed instances and the capability-marker set
//!
//! An instance owns an ordered table of slots plus a hidden set of protocol
//! brands. Brands never show up in [`Instance::keys`], so two protocols may
//! collide on business field names without colliding on their markers.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::errors::{ObjectError, ObjectResult};
use crate::identifiers::{Brand, ClassId};
use crate::member::{Member, MemberTable};
use crate::value::Value;

/// Set of protocol brands carried by an instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandSet {
    brands: HashSet<Brand>,
}

impl BrandSet {
    /// Whether `brand` is present
    pub fn contains(&self, brand: Brand) -> bool {
        self.brands.contains(&brand)
    }

    /// Number of distinct brands
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    /// Whether no brand is present
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    pub(crate) fn insert(&mut self, brand: Brand) {
        self.brands.insert(brand);
    }

    pub(crate) fn extend(&mut self, other: &BrandSet) {
        self.brands.extend(other.brands.iter().copied());
    }
}

/// Anything a capability check can be asked about.
///
/// Values that cannot carry brands report `None`, which makes every check on
/// them come out false.
pub trait Branded {
    /// Brand set carried by this candidate, if any
    fn brand_set(&self) -> Option<&BrandSet>;
}

impl Branded for Instance {
    fn brand_set(&self) -> Option<&BrandSet> {
        Some(&self.brands)
    }
}

impl Branded for Value {
    fn brand_set(&self) -> Option<&BrandSet> {
        match self {
            Value::Object(obj) => Some(&obj.brands),
            _ => None,
        }
    }
}

impl Branded for () {
    fn brand_set(&self) -> Option<&BrandSet> {
        None
    }
}

impl<T: Branded> Branded for Option<T> {
    fn brand_set(&self) -> Option<&BrandSet> {
        self.as_ref().and_then(Branded::brand_set)
    }
}

impl<T: Branded + ?Sized> Branded for &T {
    fn brand_set(&self) -> Option<&BrandSet> {
        (**self).brand_set()
    }
}

impl<T: Branded + ?Sized> Branded for Box<T> {
    fn brand_set(&self) -> Option<&BrandSet> {
        (**self).brand_set()
    }
}

impl<T: Branded + ?Sized> Branded for Arc<T> {
    fn brand_set(&self) -> Option<&BrandSet> {
        (**self).brand_set()
    }
}

impl<T: Branded + ?Sized> Branded for Rc<T> {
    fn brand_set(&self) -> Option<&BrandSet> {
        (**self).brand_set()
    }
}

/// A constructed object
#[derive(Clone, Default)]
pub struct Instance {
    slots: MemberTable,
    brands: BrandSet,
    lineage: Vec<ClassId>,
}

impl Instance {
    /// Create an empty instance with no class lineage
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a member.
    ///
    /// Data slots return their value and accessors run their getter. Missing
    /// names, write-only accessors and methods read as `Undefined`.
    pub fn get(&self, name: &str) -> ObjectResult<Value> {
        match self.slots.get(name) {
            Some(Member::Field(value)) => Ok(value.clone()),
            Some(Member::Accessor(acc)) => match &acc.get {
                Some(get) => get(self),
                None => Ok(Value::Undefined),
            },
            Some(Member::Method(_)) | None => Ok(Value::Undefined),
        }
    }

    /// Write a member.
    ///
    /// Accessors route through their setter; anything else becomes a data slot.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ObjectResult<()> {
        let value = value.into();
        if let Some(Member::Accessor(acc)) = self.slots.get(name) {
            let set = acc.set.clone().ok_or_else(|| ObjectError::read_only(name))?;
            return set(self, value);
        }
        self.slots.insert(name, Member::Field(value));
        Ok(())
    }

    /// Invoke a method slot
    pub fn call(&mut self, name: &str, args: &[Value]) -> ObjectResult<Value> {
        let method = match self.slots.get(name) {
            Some(Member::Method(method)) => method.clone(),
            _ => return Err(ObjectError::not_callable(name)),
        };
        method(self, args)
    }

    /// Whether a slot of this name exists
    pub fn has(&self, name: &str) -> bool {
        self.slots.contains(name)
    }

    /// Visible member names in definition order. Brands are never listed.
    pub fn keys(&self) -> Vec<String> {
        self.slots.names().map(str::to_string).collect()
    }

    /// Raw slot record for a member
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.slots.get(name)
    }

    /// Whether this instance was constructed through `class` or a subclass
    pub fn is_instance_of_id(&self, class: ClassId) -> bool {
        self.lineage.contains(&class)
    }

    /// Class identities from root base to most derived
    pub fn lineage(&self) -> &[ClassId] {
        &self.lineage
    }

    /// Install a full member table, last entry wins
    pub(crate) fn define_all(&mut self, members: &MemberTable) {
        self.slots.merge_from(members, &[]);
    }

    /// Copy every slot and brand of a bare instance onto this one
    pub(crate) fn adopt(&mut self, bare: Instance) {
        self.slots.merge_from(&bare.slots, &[]);
        self.brands.extend(&bare.brands);
    }

    pub(crate) fn mark(&mut self, brand: Brand) {
        self.brands.insert(brand);
    }

    pub(crate) fn enter_class(&mut self, class: ClassId) {
        self.lineage.push(class);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("slots", &self.keys())
            .field("brands", &self.brands.len())
            .field("lineage", &self.lineage)
            .finish()
    }
}
