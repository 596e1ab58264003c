//! Serializers for built and merged ontology graphs.
//!
//! Four output formats are supported:
//! - **N-Triples** ([`ntriples`]) for bulk loading and diff-friendly storage
//! - **Turtle** ([`turtle`]) for RDF tooling
//! - **JSON-LD** ([`jsonld`]) with the namespace bindings as `@context`
//! - **DOT** ([`dot`]) for a class-hierarchy visualization

pub mod dot;
pub mod jsonld;
pub mod ntriples;
pub mod turtle;

use std::collections::BTreeMap;

use crate::graph::Graph;
use crate::model::iris::STANDARD_PREFIXES;

/// Prefix table used to compact IRIs to `prefix:local`.
///
/// Holds the standard vocabularies plus every binding of the graph; a graph
/// binding replaces a standard one with the same prefix. Prefixes that are
/// not valid Turtle prefix names are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    bindings: BTreeMap<String, String>,
}

impl PrefixMap {
    /// Builds the table for `graph`.
    #[must_use]
    pub fn for_graph(graph: &Graph) -> Self {
        let mut bindings: BTreeMap<String, String> = STANDARD_PREFIXES
            .iter()
            .map(|(prefix, authority)| ((*prefix).to_owned(), (*authority).to_owned()))
            .collect();
        for (prefix, authority) in graph.prefixes() {
            if is_prefix_name(prefix) {
                bindings.insert(prefix.clone(), authority.clone());
            }
        }
        Self { bindings }
    }

    /// Iterates over `(prefix, authority)` pairs ordered by prefix.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    /// Compacts `iri` using the longest matching authority whose remainder is
    /// a safe local name.
    #[must_use]
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.bindings
            .iter()
            .filter_map(|(prefix, authority)| {
                let local = iri.strip_prefix(authority.as_str())?;
                is_local_name(local).then_some((authority.len(), prefix, local))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, prefix, local)| format!("{prefix}:{local}"))
    }
}

fn is_prefix_name(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A conservative subset of Turtle's `PN_LOCAL`.
fn is_local_name(local: &str) -> bool {
    !local.is_empty()
        && !local.starts_with('-')
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
