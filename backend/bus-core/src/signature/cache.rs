//! Process-wide memo of encoded descriptors.
//!
//! Keyed by structural descriptor identity and capabilities. Writers never
//! replace an existing entry, so concurrent encoders of the same descriptor
//! converge on one value.

use crate::signature::Capabilities;

use models::TypeDescriptor;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use log::trace;
use once_cell::sync::Lazy;

type CacheKey = (TypeDescriptor, Capabilities);

static SIGNATURE_CACHE: Lazy<RwLock<HashMap<CacheKey, Vec<String>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub(crate) fn lookup(descriptor: &TypeDescriptor, capabilities: Capabilities) -> Option<Vec<String>> {
    let cache = SIGNATURE_CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    cache.get(&(descriptor.clone(), capabilities)).cloned()
}

pub(crate) fn insert(descriptor: &TypeDescriptor, capabilities: Capabilities, encoded: Vec<String>) {
    let mut cache = SIGNATURE_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    cache
        .entry((descriptor.clone(), capabilities))
        .or_insert_with(|| {
            trace!("Caching signature for {descriptor}");
            encoded
        });
}

/// Drop every cached encoding.
pub fn clear() {
    SIGNATURE_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

/// Number of cached encodings.
pub fn len() -> usize {
    SIGNATURE_CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

pub fn is_empty() -> bool {
    len() == 0
}
