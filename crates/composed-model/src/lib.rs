//! Composed Model - protocol composition engine
//!
//! Builds constructible class templates out of independently authored
//! protocol units (field defaults, methods, accessors and a capability check),
//! optionally re-parented onto an existing base class.
//!
//! # Construction order
//!
//! - Composed template: every protocol's defaults, in composition order.
//! - Extended template: the base constructor with the caller's arguments,
//!   then every protocol's defaults.
//! - Subclass: its parent's chain, then its own members, then its
//!   constructor body.
//!
//! On any name collision the later write wins, for fields, methods,
//! accessors and statics alike.
//!
//! # Abstract members
//!
//! Protocols may declare members they expect a sibling protocol or the final
//! class to supply. A concrete [`ClassBuilder::build`] rejects a lineage that
//! leaves one unsupplied.

#![forbid(unsafe_code)]

/// Constructible classes and subclass builder
pub mod class;

/// Merge and extend
pub mod compose;

/// Engine configuration
pub mod config;

/// Error types
pub mod errors;

/// Brand and class identities
pub mod identifiers;

/// Instances and capability markers
pub mod instance;

/// Member records and tables
pub mod member;

/// Protocol units
pub mod protocol;

/// Dynamic values
pub mod value;

pub use class::{Class, ClassBuilder};
pub use compose::{compose_protocols, compose_protocols_with, ComposedTemplate, ExtendedTemplate};
pub use config::EngineConfig;
pub use errors::{ComposeError, ObjectError, ObjectResult};
pub use identifiers::{Brand, ClassId};
pub use instance::{BrandSet, Branded, Instance};
pub use member::{Accessor, Member, MemberTable, StaticMember, StaticTable};
pub use protocol::{Protocol, ProtocolBuilder, ProtocolUnit, IS_IMPLEMENTED_IN};
pub use value::Value;
