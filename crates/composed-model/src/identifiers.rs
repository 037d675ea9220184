//! Opaque identities for protocols and classes
//!
//! Both are assigned from process-wide monotonic counters, so two protocols
//! never share a brand even when they declare identical member names.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BRAND: AtomicU64 = AtomicU64::new(1);
static NEXT_CLASS: AtomicU64 = AtomicU64::new(1);

/// Hidden marker identifying one protocol unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Brand(u64);

impl Brand {
    /// Allocate a fresh brand
    pub fn next() -> Self {
        Self(NEXT_BRAND.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw token value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "brand#{}", self.0)
    }
}

/// Nominal identity of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    /// Allocate a fresh class identity
    pub fn next() -> Self {
        Self(NEXT_CLASS.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}
