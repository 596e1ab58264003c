//! Triple graph used by every building phase.
//!
//! A [`Graph`] is a set of [`Triple`]s plus the prefix bindings that the
//! serializers use as `@prefix` lines and JSON-LD `@context` entries. Adding a
//! triple twice has no observable effect. Storage is a `BTreeSet`, so iteration
//! order is deterministic and independent of insertion order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A fully-qualified identifier: namespace authority followed by a local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    /// Wraps an already-qualified identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Concatenates a namespace authority and a local name.
    ///
    /// Characters that may not appear in an IRI (spaces, controls and
    /// ``<>"{}|^`\``) are percent-encoded in `local`.
    #[must_use]
    pub fn join(authority: &str, local: &str) -> Self {
        let mut value = String::with_capacity(authority.len() + local.len());
        value.push_str(authority);
        value.push_str(&encode_iri(local));
        Self(value)
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Percent-encodes the characters an `IRIREF` may not contain. `%` itself is
/// left alone, so encoding twice is a no-op.
#[must_use]
pub fn encode_iri(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        if c <= ' ' || c == '\u{7f}' || "<>\"{}|^`\\".contains(c) {
            encoded.push_str(&format!("%{:02X}", u32::from(c)));
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// An RDF literal.
///
/// Plain string literals carry neither a datatype nor a language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// Lexical form.
    pub lexical: String,
    /// Datatype IRI, `None` for plain strings.
    pub datatype: Option<Iri>,
    /// Language tag, if any.
    pub language: Option<String>,
}

impl Literal {
    /// A plain string literal.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }
}

/// Subject or object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A named resource.
    Iri(Iri),
    /// A blank node label (without the `_:` prefix).
    Blank(String),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Shorthand for a plain string literal.
    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(lexical))
    }

    /// Returns the IRI if this term is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the lexical form if this term is a literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal(lit) => Some(&lit.lexical),
            _ => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<&Iri> for Term {
    fn from(iri: &Iri) -> Self {
        Term::Iri(iri.clone())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => f.write_str(iri.as_str()),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => write!(f, "\"{}\"", lit.lexical),
        }
    }
}

/// A subject–predicate–object statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// Subject.
    pub subject: Term,
    /// Predicate.
    pub predicate: Iri,
    /// Object.
    pub object: Term,
}

impl Triple {
    /// Builds a triple from its three components.
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A set of triples with prefix bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
    prefixes: BTreeMap<String, String>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a triple. Returns `false` when it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Inserts a triple by components.
    pub fn add(&mut self, subject: impl Into<Term>, predicate: &str, object: impl Into<Term>) -> bool {
        self.insert(Triple::new(subject, Iri::from(predicate), object))
    }

    /// Returns true if the exact triple is present.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Returns true if `(subject, predicate, object)` is present.
    #[must_use]
    pub fn has(&self, subject: &Iri, predicate: &str, object: &Term) -> bool {
        self.contains(&Triple::new(subject, Iri::from(predicate), object.clone()))
    }

    /// Number of distinct triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph holds no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterates over all triples in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples whose subject is `subject` and, when given, whose predicate is `predicate`.
    pub fn triples_matching<'a>(
        &'a self,
        subject: &'a Term,
        predicate: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| {
            &t.subject == subject && predicate.map_or(true, |p| t.predicate.as_str() == p)
        })
    }

    /// Objects of every `(subject, predicate, _)` triple.
    pub fn objects<'a>(&'a self, subject: &'a Iri, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples.iter().filter_map(move |t| {
            (t.subject.as_iri() == Some(subject) && t.predicate.as_str() == predicate)
                .then_some(&t.object)
        })
    }

    /// IRI subjects of every `(_, predicate, object)` triple, deduplicated.
    #[must_use]
    pub fn subjects_with(&self, predicate: &str, object: &Term) -> Vec<&Iri> {
        let subjects: BTreeSet<&Iri> = self
            .triples
            .iter()
            .filter(|t| t.predicate.as_str() == predicate && &t.object == object)
            .filter_map(|t| t.subject.as_iri())
            .collect();
        subjects.into_iter().collect()
    }

    /// Keeps only the triples for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Triple) -> bool) {
        self.triples.retain(keep);
    }

    /// Binds a prefix to a namespace authority, replacing any earlier binding.
    pub fn bind(&mut self, prefix: impl Into<String>, authority: impl Into<String>) {
        self.prefixes.insert(prefix.into(), authority.into());
    }

    /// Prefix bindings, ordered by prefix.
    #[must_use]
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Set union of two graphs. Bindings from `self` win on conflicting prefixes.
    #[must_use]
    pub fn union(mut self, other: Graph) -> Graph {
        self.triples.extend(other.triples);
        for (prefix, authority) in other.prefixes {
            self.prefixes.entry(prefix).or_insert(authority);
        }
        self
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Graph {
            triples: iter.into_iter().collect(),
            prefixes: BTreeMap::new(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Triple {
        Triple::new(
            Iri::new("http://example.org/a#Sample"),
            "http://www.w3.org/2000/01/rdf-schema#label",
            Term::literal("Sample"),
        )
    }

    #[test]
    fn duplicate_insert_is_idempotent() {
        let mut graph = Graph::new();
        assert!(graph.insert(sample()));
        assert!(!graph.insert(sample()));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn union_is_commutative_on_triples() {
        let mut a = Graph::new();
        a.insert(sample());
        let mut b = Graph::new();
        b.add(
            Iri::new("http://example.org/b#Other"),
            "http://www.w3.org/2000/01/rdf-schema#label",
            Term::literal("Other"),
        );
        let ab: Vec<Triple> = a.clone().union(b.clone()).into_iter().collect();
        let ba: Vec<Triple> = b.union(a).into_iter().collect();
        assert_eq!(ab, ba);
    }

    #[test]
    fn union_keeps_left_binding_on_conflict() {
        let mut a = Graph::new();
        a.bind("ex", "http://example.org/a#");
        let mut b = Graph::new();
        b.bind("ex", "http://example.org/b#");
        b.bind("other", "http://example.org/o#");
        let merged = a.union(b);
        assert_eq!(merged.prefixes()["ex"], "http://example.org/a#");
        assert_eq!(merged.prefixes()["other"], "http://example.org/o#");
    }

    #[test]
    fn objects_filters_by_subject_and_predicate() {
        let mut graph = Graph::new();
        graph.insert(sample());
        let subject = Iri::new("http://example.org/a#Sample");
        let labels: Vec<&Term> = graph
            .objects(&subject, "http://www.w3.org/2000/01/rdf-schema#label")
            .collect();
        assert_eq!(labels, vec![&Term::literal("Sample")]);
    }

    #[test]
    fn join_encodes_illegal_local_characters() {
        assert_eq!(Iri::join("http://x.org/a#", "Solar Cell").as_str(), "http://x.org/a#Solar%20Cell");
        assert_eq!(Iri::join("http://x.org/a#", "a<b>|c").as_str(), "http://x.org/a#a%3Cb%3E%7Cc");
        assert_eq!(encode_iri("Solar%20Cell"), "Solar%20Cell");
    }
}
