//! Graph merger: union of ontology graphs plus ownership metadata.
//!
//! Per-input ontology roots (subjects containing `#Ontology`) are stripped
//! before a merged root is attached with [`add_ownership_metadata`]. Terms that
//! share a local fragment under different bases are reported as
//! [`IdentifierCollision`]s and kept.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::{info, warn};

use crate::graph::{Graph, Iri, Term};
use crate::model::iris::*;

/// Marker identifying per-input ontology root subjects.
pub const ONTOLOGY_ROOT_MARKER: &str = "#Ontology";

/// Default title of a merged ontology.
pub const DEFAULT_TITLE: &str = "merged_ontology";
/// Default base authority of a merged ontology.
pub const DEFAULT_BASE_URI: &str = "https://mergedontology#";
/// Default version of a merged ontology.
pub const DEFAULT_VERSION: &str = "1.0";
/// Default description of a merged ontology.
pub const DEFAULT_DESCRIPTION: &str = "This is the merged ontology of all the input sheets";

/// Two subjects share a local fragment under different bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierCollision {
    /// Shared local fragment.
    pub fragment: String,
    /// Base the fragment was first seen under.
    pub first_base: String,
    /// Conflicting base.
    pub other_base: String,
}

impl fmt::Display for IdentifierCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "identifier `{}` is defined under both `{}` and `{}`",
            self.fragment, self.first_base, self.other_base
        )
    }
}

/// A merged graph and the collisions found in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged triples.
    pub graph: Graph,
    /// Non-fatal collision diagnostics.
    pub collisions: Vec<IdentifierCollision>,
}

/// Splits an identifier into `(base, fragment)` at the first `#`, or else
/// after the last `/`. The separator stays with the base.
#[must_use]
pub fn split_identifier(iri: &str) -> (&str, &str) {
    if let Some(at) = iri.find('#') {
        return iri.split_at(at + 1);
    }
    match iri.rfind('/') {
        Some(at) => iri.split_at(at + 1),
        None => ("", iri),
    }
}

/// Merges two graphs. Collisions are logged; see [`merge_reporting`] to
/// inspect them.
#[must_use]
pub fn merge(a: Graph, b: Graph) -> Graph {
    merge_reporting(a, b).graph
}

/// Merges two graphs and returns the collisions alongside the result.
#[must_use]
pub fn merge_reporting(a: Graph, b: Graph) -> MergeOutcome {
    finish(a.union(b))
}

/// Folds any number of graphs through the merger. Returns `None` for no input.
///
/// Collisions are detected once, on the final union, not per pairwise step.
/// Subjects are visited in IRI order, so `first_base` of a collision is the
/// lexically smallest base carrying the fragment, whatever order the inputs
/// were given in. A pairwise fold would instead name the base of the earliest
/// input. Each colliding `(fragment, base)` pair is reported once.
#[must_use]
pub fn merge_all<I>(graphs: I) -> Option<MergeOutcome>
where
    I: IntoIterator<Item = Graph>,
{
    graphs.into_iter().reduce(Graph::union).map(finish)
}

fn finish(mut graph: Graph) -> MergeOutcome {
    let before = graph.len();
    graph.retain(|t| !t.subject.to_string().contains(ONTOLOGY_ROOT_MARKER));
    let collisions = find_collisions(&graph);
    for collision in &collisions {
        warn!(
            fragment = %collision.fragment,
            first = %collision.first_base,
            other = %collision.other_base,
            "identifier collision"
        );
    }
    info!(
        triples = graph.len(),
        stripped = before - graph.len(),
        collisions = collisions.len(),
        "merged graphs"
    );
    MergeOutcome { graph, collisions }
}

/// Finds fragments bound to more than one base among the graph's subjects.
///
/// Each distinct subject is checked once, in sorted order.
#[must_use]
pub fn find_collisions(graph: &Graph) -> Vec<IdentifierCollision> {
    let subjects: BTreeSet<&Iri> = graph.iter().filter_map(|t| t.subject.as_iri()).collect();
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut collisions = Vec::new();
    for subject in subjects {
        let (base, fragment) = split_identifier(subject.as_str());
        if fragment.is_empty() {
            continue;
        }
        match seen.get(fragment) {
            Some(&first) if first != base => collisions.push(IdentifierCollision {
                fragment: fragment.to_owned(),
                first_base: first.to_owned(),
                other_base: base.to_owned(),
            }),
            Some(_) => {}
            None => {
                seen.insert(fragment, base);
            }
        }
    }
    collisions
}

/// Ownership of a merged ontology. Omitted fields take the `DEFAULT_*` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipMetadata {
    /// Base authority of the merged root.
    pub base_uri: Option<String>,
    /// Title, also bound as a prefix for the base authority.
    pub title: Option<String>,
    /// Version string.
    pub version: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl OwnershipMetadata {
    /// Base authority with the default applied.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        self.base_uri.as_deref().unwrap_or(DEFAULT_BASE_URI)
    }

    /// Title with the default applied.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Version with the default applied.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Description with the default applied.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// The merged root identifier, `<base>Ontology`.
    #[must_use]
    pub fn root_iri(&self) -> Iri {
        Iri::join(self.base_uri(), "Ontology")
    }
}

/// Attaches a fresh ontology root to `graph`.
#[must_use]
pub fn add_ownership_metadata(mut graph: Graph, metadata: &OwnershipMetadata) -> Graph {
    let root = metadata.root_iri();
    graph.bind(metadata.title(), metadata.base_uri());
    graph.add(&root, RDF_TYPE, Iri::from(OWL_ONTOLOGY));
    graph.add(&root, DCTERMS_TITLE, Term::literal(metadata.title()));
    graph.add(&root, DCTERMS_HAS_VERSION, Term::literal(metadata.version()));
    graph.add(&root, OWL_VERSION_INFO, Term::literal(metadata.version()));
    graph.add(&root, DCTERMS_DESCRIPTION, Term::literal(metadata.description()));
    info!(root = %root, title = metadata.title(), "attached ownership metadata");
    graph
}
