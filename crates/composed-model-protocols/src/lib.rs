//! Reusable protocol units for composed models
//!
//! Each unit is a [`ProtocolUnit`] type backed by a process-wide definition:
//!
//! ```
//! use composed_model::{compose, ProtocolUnit, Value};
//! use composed_model_protocols::{Paged, WithLoading};
//!
//! let template = compose!(Paged::protocol(), WithLoading::protocol()).unwrap();
//! let model = template.construct().unwrap();
//! assert!(Paged::is_implemented_in(&model));
//! assert_eq!(model.get("$loading").unwrap(), Value::Bool(false));
//! ```

#![forbid(unsafe_code)]

use composed_model::{Protocol, ProtocolUnit};

mod paged;
mod with_loading;

pub use paged::{Paged, DEFAULT_PAGE_SIZE};
pub use with_loading::WithLoading;

/// Every protocol unit shipped by this crate
pub fn protocols() -> Vec<&'static Protocol> {
    vec![Paged::protocol(), WithLoading::protocol()]
}
