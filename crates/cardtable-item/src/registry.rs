//! The item registry: which factory builds which element.
//!
//! When a composite meets a child element it didn't declare, it asks the
//! registry for a blank item of that type. Keys are the pair
//! `(item_type, sub_type)`, so one element name (say `command`) can map to
//! many shapes told apart by their `type` attribute.
//!
//! # Lifecycle
//!
//! ```text
//! RegistryBuilder::register() × N ──→ build() ──→ Registry (read-only)
//! ```
//!
//! All registration happens in the builder, before any parsing starts.
//! The finished [`Registry`] has no mutating methods at all, so sharing it
//! between connections (`&'static`, `Arc`) needs no locking.

use std::collections::HashMap;

use crate::Item;

/// Produces a blank item ready to be parsed into.
///
/// A plain function pointer: factories capture nothing, and non-capturing
/// closures coerce to this type.
pub type Factory = fn() -> Item;

/// Collects factories before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    factories: HashMap<String, HashMap<String, Factory>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `(item_type, sub_type)`.
    ///
    /// Registering a key twice replaces the earlier factory. That is
    /// allowed but almost always a mistake, so it is logged.
    pub fn register(
        &mut self,
        item_type: impl Into<String>,
        sub_type: impl Into<String>,
        factory: Factory,
    ) -> &mut Self {
        let item_type = item_type.into();
        let sub_type = sub_type.into();

        let by_sub_type = self.factories.entry(item_type.clone()).or_default();
        if by_sub_type.insert(sub_type.clone(), factory).is_some() {
            tracing::warn!(
                %item_type,
                %sub_type,
                "item factory registered twice, keeping the last one"
            );
        }
        self
    }

    /// Freezes the table.
    pub fn build(self) -> Registry {
        let registry = Registry {
            factories: self.factories,
        };
        tracing::debug!(entries = registry.len(), "item registry built");
        registry
    }
}

/// A frozen table of item factories.
#[derive(Debug, Default)]
pub struct Registry {
    factories: HashMap<String, HashMap<String, Factory>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Builds a blank item for `<item_type type="sub_type">`.
    ///
    /// Returns `None` for keys nobody registered. That is an expected
    /// outcome (newer peers send types older builds don't know), not an
    /// error.
    pub fn create(&self, item_type: &str, sub_type: &str) -> Option<Item> {
        let factory = self.factories.get(item_type)?.get(sub_type)?;
        Some(factory())
    }

    pub fn contains(&self, item_type: &str, sub_type: &str) -> bool {
        self.factories
            .get(item_type)
            .is_some_and(|by_sub_type| by_sub_type.contains_key(sub_type))
    }

    /// Number of registered `(item_type, sub_type)` keys.
    pub fn len(&self) -> usize {
        self.factories.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
