//! Name-to-factory resolution for pluggable field types and rules.
//!
//! A registry is an ordered list of scopes, each holding named factories.
//! Plain names search the scopes in registration order and the earliest
//! match wins; a dotted name such as `foo.bar` confines the search to the
//! `foo` scope. Successful resolutions are memoized and never invalidated.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

struct Scope<T: ?Sized> {
    namespace: Option<String>,
    entries: HashMap<String, Factory<T>>,
}

pub struct TypeRegistry<T: ?Sized> {
    scopes: Vec<Scope<T>>,
    resolved: RwLock<HashMap<String, Factory<T>>>,
}

impl<T: ?Sized> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> TypeRegistry<T> {
    /// An empty registry holding only the anonymous default scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                namespace: None,
                entries: HashMap::new(),
            }],
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Appends a named scope if it is not already present and returns the
    /// ordered scope list; the default scope shows up as an empty string.
    pub fn add_scope(&mut self, namespace: impl Into<String>) -> Vec<String> {
        let namespace = namespace.into();
        let present = self
            .scopes
            .iter()
            .any(|scope| scope.namespace.as_deref() == Some(namespace.as_str()));
        if !present {
            self.scopes.push(Scope {
                namespace: Some(namespace),
                entries: HashMap::new(),
            });
        }
        self.scopes
            .iter()
            .map(|scope| scope.namespace.clone().unwrap_or_default())
            .collect()
    }

    /// Registers a factory. A dotted name lands in (and creates) the named
    /// scope; a plain name lands in the default scope.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let factory: Factory<T> = Arc::new(factory);
        match name.split_once('.') {
            Some((namespace, base)) => {
                self.add_scope(namespace);
                let scope = self
                    .scopes
                    .iter_mut()
                    .find(|scope| scope.namespace.as_deref() == Some(namespace))
                    .unwrap_or_else(|| unreachable!("scope was just added"));
                scope.entries.insert(base.to_string(), factory);
            }
            None => {
                self.scopes[0].entries.insert(name.to_string(), factory);
            }
        }
    }

    /// Resolves a type name to its factory. A miss is an ordinary `None` so
    /// callers can fall back to an alternate type.
    pub fn load_type(&self, name: &str) -> Option<Factory<T>> {
        {
            let resolved = match self.resolved.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(factory) = resolved.get(name) {
                return Some(factory.clone());
            }
        }

        let found = match name.split_once('.') {
            Some((namespace, base)) => self
                .scopes
                .iter()
                .find(|scope| scope.namespace.as_deref() == Some(namespace))
                .and_then(|scope| scope.entries.get(base)),
            None => self
                .scopes
                .iter()
                .find_map(|scope| scope.entries.get(name)),
        };

        match found {
            Some(factory) => {
                let factory = factory.clone();
                let mut resolved = match self.resolved.write() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                resolved.insert(name.to_string(), factory.clone());
                Some(factory)
            }
            None => {
                log::debug!("no registered type matches {name}");
                None
            }
        }
    }

    /// Resolves and instantiates in one step.
    pub fn create(&self, name: &str) -> Option<Box<T>> {
        self.load_type(name).map(|factory| factory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> &'static str;
    }

    struct A;
    struct B;

    impl Named for A {
        fn name(&self) -> &'static str {
            "a"
        }
    }

    impl Named for B {
        fn name(&self) -> &'static str {
            "b"
        }
    }

    #[test]
    fn earliest_scope_wins_for_plain_names() {
        let mut registry: TypeRegistry<dyn Named> = TypeRegistry::new();
        registry.register("thing", || Box::new(A));
        registry.register("custom.thing", || Box::new(B));
        let created = registry.create("thing").expect("plain name resolves");
        assert_eq!(created.name(), "a");
    }

    #[test]
    fn dotted_name_targets_its_scope() {
        let mut registry: TypeRegistry<dyn Named> = TypeRegistry::new();
        registry.register("thing", || Box::new(A));
        registry.register("custom.thing", || Box::new(B));
        let created = registry.create("custom.thing").expect("dotted name resolves");
        assert_eq!(created.name(), "b");
    }

    #[test]
    fn miss_is_none_not_an_error() {
        let registry: TypeRegistry<dyn Named> = TypeRegistry::new();
        assert!(registry.load_type("ghost").is_none());
        assert!(registry.create("missing.ghost").is_none());
    }

    #[test]
    fn add_scope_is_idempotent_and_ordered() {
        let mut registry: TypeRegistry<dyn Named> = TypeRegistry::new();
        let first = registry.add_scope("custom");
        let second = registry.add_scope("custom");
        assert_eq!(first, vec!["".to_string(), "custom".to_string()]);
        assert_eq!(first, second);
    }

    #[test]
    fn resolution_is_memoized() {
        let mut registry: TypeRegistry<dyn Named> = TypeRegistry::new();
        registry.register("thing", || Box::new(A));
        assert!(registry.load_type("thing").is_some());
        // A second lookup is served from the cache; same factory identity.
        let cached = registry.load_type("thing").expect("cached entry");
        let fresh = registry.load_type("thing").expect("cached entry");
        assert!(Arc::ptr_eq(&cached, &fresh));
    }
}
