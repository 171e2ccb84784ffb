use std::any::Any;
use std::collections::HashMap;

use thiserror::Error;

/// Process-wide resource store shared by every pipeline run.
///
/// Populated exactly once while the service is constructed (parser list,
/// PRNG seed, static lexical data) and read-only afterwards; requests share
/// it behind an `Arc` and never mutate it.
#[derive(Default)]
pub struct Registry {
    resources: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no resource registered under key: {0}")]
    Missing(&'static str),
    #[error("resource {0} has an unexpected type")]
    WrongType(&'static str),
    #[error("resource already registered under key: {0}")]
    AlreadyRegistered(&'static str),
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource under `key`. Population happens once at service
    /// construction; re-registering a key is a wiring bug.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] when the key is taken.
    pub fn register<T: Any + Send + Sync>(
        &mut self,
        key: &'static str,
        resource: T,
    ) -> Result<(), RegistryError> {
        if self.resources.contains_key(key) {
            return Err(RegistryError::AlreadyRegistered(key));
        }
        self.resources.insert(key, Box::new(resource));
        Ok(())
    }

    /// Typed read access to a registered resource.
    ///
    /// # Errors
    /// Returns [`RegistryError::Missing`] for unknown keys and
    /// [`RegistryError::WrongType`] when the stored resource is not a `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &'static str) -> Result<&T, RegistryError> {
        self.resources
            .get(key)
            .ok_or(RegistryError::Missing(key))?
            .downcast_ref::<T>()
            .ok_or(RegistryError::WrongType(key))
    }

    #[must_use]
    pub fn contains(&self, key: &'static str) -> bool {
        self.resources.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_get_roundtrips() {
        let mut registry = Registry::new();
        registry.register("seed", 42u64).expect("register");
        assert_eq!(*registry.get::<u64>("seed").expect("get"), 42);
    }

    #[test]
    fn missing_key_is_reported() {
        let registry = Registry::new();
        assert!(matches!(
            registry.get::<u64>("seed"),
            Err(RegistryError::Missing("seed"))
        ));
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut registry = Registry::new();
        registry.register("seed", 42u64).expect("register");
        assert!(matches!(
            registry.get::<String>("seed"),
            Err(RegistryError::WrongType("seed"))
        ));
    }

    #[test]
    fn double_registration_is_rejected() {
        let mut registry = Registry::new();
        registry.register("seed", 1u64).expect("register");
        assert!(matches!(
            registry.register("seed", 2u64),
            Err(RegistryError::AlreadyRegistered("seed"))
        ));
    }
}
