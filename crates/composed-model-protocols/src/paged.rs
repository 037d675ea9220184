//! Offset-based pagination state

use composed_model::{Instance, ObjectResult, Protocol, ProtocolBuilder, ProtocolUnit, Value};
use once_cell::sync::Lazy;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u32 = 20;

static PAGED: Lazy<Protocol> = Lazy::new(|| {
    ProtocolBuilder::new("Paged")
        .field("$offset", 0)
        .field("$total", 0)
        .field("$pageSize", DEFAULT_PAGE_SIZE)
        .getter("$page", page)
        .getter("$pageCount", page_count)
        .build()
});

/// Pagination protocol: `$offset`, `$total`, `$pageSize`, plus the derived
/// `$page` and `$pageCount`.
pub struct Paged;

impl ProtocolUnit for Paged {
    fn protocol() -> &'static Protocol {
        &PAGED
    }
}

/// current page number, since 1
fn page(this: &Instance) -> ObjectResult<Value> {
    let offset = this.get("$offset")?.to_number();
    let size = this.get("$pageSize")?.to_number();
    Ok(Value::Number((1.0 + offset / size).floor()))
}

/// page count based on `$total` and `$pageSize`
fn page_count(this: &Instance) -> ObjectResult<Value> {
    let total = this.get("$total")?.to_number();
    let size = this.get("$pageSize")?.to_number();
    Ok(Value::Number((total / size).ceil()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let bare = Paged::protocol().instantiate().unwrap();
        assert_eq!(bare.get("$offset").unwrap(), Value::from(0));
        assert_eq!(bare.get("$total").unwrap(), Value::from(0));
        assert_eq!(bare.get("$pageSize").unwrap(), Value::from(20));
        assert_eq!(bare.get("$page").unwrap(), Value::from(1));
        assert_eq!(bare.get("$pageCount").unwrap(), Value::from(0));
    }

    #[test]
    fn derived_values_follow_mutation() {
        let mut bare = Paged::protocol().instantiate().unwrap();
        bare.set("$offset", 40).unwrap();
        bare.set("$total", 41).unwrap();
        assert_eq!(bare.get("$page").unwrap(), Value::from(3));
        assert_eq!(bare.get("$pageCount").unwrap(), Value::from(3));
    }

    #[test]
    fn derived_values_are_read_only() {
        let mut bare = Paged::protocol().instantiate().unwrap();
        assert!(bare.set("$page", 2).is_err());
    }

    #[test]
    fn missing_fields_yield_nan() {
        let inst = Instance::new();
        assert!(page(&inst).unwrap().to_number().is_nan());
    }
}
