use std::sync::{Arc, RwLock};

use roster_auth::RoleRegistry;

use super::StoreError;

/// Process-wide role registry.
///
/// Reads run concurrently; reseeding takes the write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedRoleRegistry {
    inner: Arc<RwLock<RoleRegistry>>,
}

impl SharedRoleRegistry {
    pub fn new(registry: RoleRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(RoleRegistry::seeded())
    }

    /// Run `f` against the current registry.
    pub fn read<R>(&self, f: impl FnOnce(&RoleRegistry) -> R) -> Result<R, StoreError> {
        let registry = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(f(&registry))
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut RoleRegistry) -> R) -> Result<R, StoreError> {
        let mut registry = self.inner.write().map_err(|_| StoreError::poisoned())?;
        Ok(f(&mut registry))
    }

    /// Restore the canonical roles.
    pub fn reseed(&self) -> Result<(), StoreError> {
        self.write(RoleRegistry::seed)
    }
}
