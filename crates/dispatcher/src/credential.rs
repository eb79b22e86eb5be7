//! Shared access credential, read by the worker at delivery time.

use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle to the current access token
///
/// Clones share the same slot, so a token set through one handle is seen
/// by the delivery worker holding another.
#[derive(Debug, Clone, Default)]
pub struct Credential(Arc<RwLock<String>>);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(token.into())))
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = token.into();
    }

    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}
