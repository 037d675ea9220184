//! Shared helpers for composed-model integration tests

#![allow(dead_code)]

use std::sync::Once;

use composed_model::{Protocol, ProtocolBuilder, Value};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary (honours `RUST_LOG`)
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Protocol with an abstract `foo`, a constructor-set flag and members over `foo`
pub fn abs1() -> Protocol {
    ProtocolBuilder::new("Abs1")
        .requires("foo")
        .initializer(|this| this.set("isAbs1", true))
        .method("fnFromAbs1", |this, _| this.get("foo"))
        .getter("getterFromAbs1", |this| this.get("foo"))
        .setter("setterFromAbs1", |this, value| this.set("foo", value))
        .build()
}

/// Protocol with an abstract `bar`
pub fn abs2() -> Protocol {
    ProtocolBuilder::new("Abs2")
        .requires("bar")
        .field("isAbs2", true)
        .method("fnFromAbs2", |this, _| this.get("bar"))
        .build()
}

/// Protocol declaring a single field `name` with `default`
pub fn with_field(label: &str, name: &str, default: impl Into<Value>) -> Protocol {
    ProtocolBuilder::new(label).field(name, default).build()
}
