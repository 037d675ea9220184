//! Loading flag

use composed_model::{Protocol, ProtocolBuilder, ProtocolUnit};
use once_cell::sync::Lazy;

static WITH_LOADING: Lazy<Protocol> =
    Lazy::new(|| ProtocolBuilder::new("WithLoading").field("$loading", false).build());

/// Loading protocol: a single `$loading` flag, initially `false`.
pub struct WithLoading;

impl ProtocolUnit for WithLoading {
    fn protocol() -> &'static Protocol {
        &WITH_LOADING
    }
}
