//! Namespace registry: short prefixes to base authorities.
//!
//! Prefixes are normalized to lowercase on insert and on lookup, so
//! `PMDCo`, `pmdco` and `PMDCO` all name the same namespace.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::NamespaceError;
use crate::graph::Iri;

/// One registered namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Lowercase prefix.
    pub prefix: String,
    /// Base authority that local names are appended to.
    pub authority: String,
    /// Location of a reference ontology used for enrichment, if tracked.
    pub reference: Option<String>,
}

/// Typed prefix table for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceRegistry {
    entries: BTreeMap<String, Namespace>,
}

impl NamespaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that already binds the ontology's own name to its base authority.
    #[must_use]
    pub fn for_ontology(name: &str, base_iri: &str) -> Self {
        let mut registry = Self::new();
        registry.register(name, base_iri);
        registry
    }

    /// Registers `prefix -> authority`. Returns the previous binding, if any.
    pub fn register(&mut self, prefix: &str, authority: &str) -> Option<Namespace> {
        self.insert(Namespace {
            prefix: prefix.to_lowercase(),
            authority: authority.to_owned(),
            reference: None,
        })
    }

    /// Registers a namespace that also tracks a reference ontology location.
    pub fn register_with_reference(
        &mut self,
        prefix: &str,
        authority: &str,
        reference: &str,
    ) -> Option<Namespace> {
        let reference = reference.trim();
        self.insert(Namespace {
            prefix: prefix.to_lowercase(),
            authority: authority.to_owned(),
            reference: (!reference.is_empty()).then(|| reference.to_owned()),
        })
    }

    fn insert(&mut self, namespace: Namespace) -> Option<Namespace> {
        let previous = self.entries.insert(namespace.prefix.clone(), namespace);
        if let Some(prev) = &previous {
            if let Some(current) = self.entries.get(&prev.prefix) {
                if current.authority != prev.authority {
                    warn!(
                        prefix = %prev.prefix,
                        previous = %prev.authority,
                        current = %current.authority,
                        "namespace prefix rebound to a different authority"
                    );
                }
            }
        }
        previous
    }

    /// Looks up the authority bound to `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError`] if the prefix was never registered.
    pub fn resolve(&self, prefix: &str) -> Result<&str, NamespaceError> {
        self.get(prefix)
            .map(|ns| ns.authority.as_str())
            .ok_or_else(|| NamespaceError {
                prefix: prefix.to_owned(),
            })
    }

    /// Qualifies `local` under the authority bound to `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError`] if the prefix was never registered.
    pub fn qualify(&self, prefix: &str, local: &str) -> Result<Iri, NamespaceError> {
        self.resolve(prefix).map(|authority| Iri::join(authority, local))
    }

    /// Returns the full entry for `prefix`, if registered.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&Namespace> {
        self.entries.get(&prefix.to_lowercase())
    }

    /// Returns true if `prefix` is registered.
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.get(prefix).is_some()
    }

    /// Iterates over every namespace, ordered by prefix.
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.entries.values()
    }

    /// Number of registered prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
