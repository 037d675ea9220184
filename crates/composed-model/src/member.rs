//! Member implementation records and ordered member tables
//!
//! A member table maps a name to exactly one implementation record (field
//! default, method or accessor pair). Merging two tables overwrites on name
//! collision regardless of kind, so the table merged last wins.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::errors::ObjectResult;
use crate::instance::Instance;
use crate::value::Value;

/// Method body, invoked with the receiving instance and call arguments
pub type MethodFn = Arc<dyn Fn(&mut Instance, &[Value]) -> ObjectResult<Value> + Send + Sync>;

/// Accessor getter
pub type GetterFn = Arc<dyn Fn(&Instance) -> ObjectResult<Value> + Send + Sync>;

/// Accessor setter
pub type SetterFn = Arc<dyn Fn(&mut Instance, Value) -> ObjectResult<()> + Send + Sync>;

/// Static function on a template's own surface
pub type StaticFn = Arc<dyn Fn(&[Value]) -> ObjectResult<Value> + Send + Sync>;

/// Getter/setter pair; either half may be absent
#[derive(Clone, Default)]
pub struct Accessor {
    /// Read half
    pub get: Option<GetterFn>,
    /// Write half
    pub set: Option<SetterFn>,
}

/// Implementation record for one named member
#[derive(Clone)]
pub enum Member {
    /// Data field holding a value
    Field(Value),
    /// Callable method
    Method(MethodFn),
    /// Computed accessor
    Accessor(Accessor),
}

impl Member {
    /// Short kind label used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Member::Field(_) => "field",
            Member::Method(_) => "method",
            Member::Accessor(_) => "accessor",
        }
    }

    /// Whether this record carries behavior rather than data
    pub fn is_behavior(&self) -> bool {
        !matches!(self, Member::Field(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Field(value) => write!(f, "Field({value:?})"),
            Member::Method(_) => write!(f, "Method"),
            Member::Accessor(acc) => write!(
                f,
                "Accessor(get: {}, set: {})",
                acc.get.is_some(),
                acc.set.is_some()
            ),
        }
    }
}

/// Ordered name → member mapping
#[derive(Clone, Default, Debug)]
pub struct MemberTable {
    entries: IndexMap<String, Member>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a member. A replaced name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        self.entries.insert(name.into(), member);
    }

    /// Install one half of an accessor, pairing it with an existing half
    pub(crate) fn insert_getter(&mut self, name: impl Into<String>, get: GetterFn) {
        let name = name.into();
        match self.entries.get_mut(&name) {
            Some(Member::Accessor(acc)) => acc.get = Some(get),
            _ => {
                self.entries.insert(
                    name,
                    Member::Accessor(Accessor {
                        get: Some(get),
                        set: None,
                    }),
                );
            }
        }
    }

    pub(crate) fn insert_setter(&mut self, name: impl Into<String>, set: SetterFn) {
        let name = name.into();
        match self.entries.get_mut(&name) {
            Some(Member::Accessor(acc)) => acc.set = Some(set),
            _ => {
                self.entries.insert(
                    name,
                    Member::Accessor(Accessor {
                        get: None,
                        set: Some(set),
                    }),
                );
            }
        }
    }

    /// Look up a member
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.entries.get(name)
    }

    /// Whether a member of this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Member names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` over this table, skipping `deny`.
    pub fn merge_from(&mut self, other: &MemberTable, deny: &[String]) {
        for (name, member) in &other.entries {
            if deny.iter().any(|d| d == name) {
                trace!(member = %name, "skipping deny-listed prototype member");
                continue;
            }
            self.entries.insert(name.clone(), member.clone());
        }
    }

    /// Behavior-only view (methods and accessors)
    pub fn behavior(&self) -> MemberTable {
        MemberTable {
            entries: self
                .entries
                .iter()
                .filter(|(_, m)| m.is_behavior())
                .map(|(k, m)| (k.clone(), m.clone()))
                .collect(),
        }
    }
}

/// Entry on a template's static surface
#[derive(Clone)]
pub enum StaticMember {
    /// Plain static value
    Value(Value),
    /// Static function
    Function(StaticFn),
}

impl fmt::Debug for StaticMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticMember::Value(value) => write!(f, "Value({value:?})"),
            StaticMember::Function(_) => write!(f, "Function"),
        }
    }
}

/// Ordered name → static member mapping
#[derive(Clone, Default, Debug)]
pub struct StaticTable {
    entries: IndexMap<String, StaticMember>,
}

impl StaticTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a static member
    pub fn insert(&mut self, name: impl Into<String>, member: StaticMember) {
        self.entries.insert(name.into(), member);
    }

    /// Look up a static member
    pub fn get(&self, name: &str) -> Option<&StaticMember> {
        self.entries.get(name)
    }

    /// Whether a static member of this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Static member names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of static members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` over this table, skipping `deny`.
    pub fn merge_from(&mut self, other: &StaticTable, deny: &[String]) {
        for (name, member) in &other.entries {
            if deny.iter().any(|d| d == name) {
                trace!(member = %name, "skipping deny-listed static member");
                continue;
            }
            self.entries.insert(name.clone(), member.clone());
        }
    }
}
