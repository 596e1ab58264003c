//! External enrichment from reference ontologies.
//!
//! For every namespace that tracks a reference ontology and is used by at
//! least one subject of the local graph, the reference graph is loaded and the
//! documentation triples of matching identifiers are copied over. Only
//! [`COPIED_PREDICATES`] are copied; labels stay as curated locally.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use sophia_api::source::TripleSource;
use sophia_api::term::{SimpleTerm, Term as RdfTerm, TermKind};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{Graph, Iri, Literal, Term, Triple};
use crate::model::iris::{DCTERMS_DESCRIPTION, SKOS_ALT_LABEL, SKOS_DEFINITION, XSD_STRING};
use crate::namespace::{Namespace, NamespaceRegistry};

/// Predicates copied from a reference ontology onto local identifiers.
pub const COPIED_PREDICATES: [&str; 3] = [SKOS_DEFINITION, DCTERMS_DESCRIPTION, SKOS_ALT_LABEL];

/// Failure to load one reference ontology.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read reference ontology `{}`", .path.display())]
    Io {
        /// Resolved path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid Turtle / N-Triples.
    #[error("failed to parse reference ontology `{location}`: {message}")]
    Parse {
        /// Location as given.
        location: String,
        /// Parser message.
        message: String,
    },

    /// The location is remote and this loader does not fetch.
    #[error("remote reference ontology `{location}` is not fetched")]
    Remote {
        /// Location as given.
        location: String,
    },
}

/// Source of reference graphs, keyed by the location recorded in the
/// namespace table.
pub trait ReferenceLoader {
    /// Loads the reference graph at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the graph cannot be obtained.
    fn load(&self, location: &str) -> Result<Graph, LoadError>;
}

/// Loads Turtle or N-Triples files relative to a base directory.
#[derive(Debug, Clone)]
pub struct TurtleFileLoader {
    base_dir: PathBuf,
}

impl TurtleFileLoader {
    /// Creates a loader resolving relative locations against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory relative locations are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ReferenceLoader for TurtleFileLoader {
    fn load(&self, location: &str) -> Result<Graph, LoadError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Err(LoadError::Remote {
                location: location.to_owned(),
            });
        }
        let path = self
            .base_dir
            .join(location.strip_prefix("file://").unwrap_or(location));
        let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        parse_turtle(location, &text)
    }
}

/// Parses a Turtle (or N-Triples) document into a [`Graph`].
///
/// Typed `xsd:string` literals become plain literals. Quoted triples and
/// variables are dropped.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] on a syntax error.
pub fn parse_turtle(location: &str, text: &str) -> Result<Graph, LoadError> {
    let triples: Vec<[SimpleTerm<'static>; 3]> = sophia_turtle::parser::turtle::parse_str(text)
        .collect_triples()
        .map_err(|e| LoadError::Parse {
            location: location.to_owned(),
            message: e.to_string(),
        })?;

    let mut graph = Graph::new();
    for [s, p, o] in &triples {
        let (Some(subject), Some(predicate), Some(object)) = (convert(s), p.iri(), convert(o)) else {
            continue;
        };
        graph.insert(Triple::new(subject, Iri::new(predicate.as_str()), object));
    }
    Ok(graph)
}

fn convert<T: RdfTerm>(term: &T) -> Option<Term> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Term::Iri(Iri::new(iri.as_str()))),
        TermKind::BlankNode => term.bnode_id().map(|id| Term::Blank(id.as_str().to_owned())),
        TermKind::Literal => {
            let form = term.lexical_form()?;
            let language = term.language_tag().map(|tag| tag.as_str().to_owned());
            let datatype = match &language {
                Some(_) => None,
                None => term
                    .datatype()
                    .map(|dt| dt.as_str().to_owned())
                    .filter(|dt| dt != XSD_STRING)
                    .map(Iri::new),
            };
            Some(Term::Literal(Literal {
                lexical: String::from(&*form),
                datatype,
                language,
            }))
        }
        _ => None,
    }
}

/// A reference ontology that could not be loaded. Enrichment skips that
/// namespace and continues with the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalOntologyLoadFailure {
    /// Namespace prefix.
    pub prefix: String,
    /// Reference location.
    pub location: String,
    /// Loader message.
    pub reason: String,
}

impl fmt::Display for ExternalOntologyLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipping enrichment from `{}` ({}): {}",
            self.prefix, self.location, self.reason
        )
    }
}

/// Outcome of one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Prefixes whose reference ontology was loaded.
    pub enriched: Vec<String>,
    /// Reference ontologies that were skipped.
    pub failures: Vec<ExternalOntologyLoadFailure>,
    /// Number of new triples copied into the graph.
    pub copied: usize,
}

/// Copies documentation triples from reference ontologies into `graph`.
///
/// Load failures never abort; they are logged and collected in the report.
pub fn enrich(
    mut graph: Graph,
    registry: &NamespaceRegistry,
    loader: &dyn ReferenceLoader,
) -> (Graph, EnrichmentReport) {
    let mut report = EnrichmentReport::default();

    for namespace in registry.iter() {
        let Some(location) = &namespace.reference else {
            continue;
        };
        let variants = scheme_variants(&namespace.authority);
        let locals = referenced_locals(&graph, &variants);
        if locals.is_empty() {
            debug!(prefix = %namespace.prefix, "namespace not referenced, skipping enrichment");
            continue;
        }

        let reference = match loader.load(location) {
            Ok(reference) => reference,
            Err(err) => {
                let skipped = load_failure(namespace, location, &err);
                warn!(prefix = %skipped.prefix, location = %skipped.location, "{}", skipped.reason);
                report.failures.push(skipped);
                continue;
            }
        };

        let mut copied = 0usize;
        for (subject, local) in &locals {
            for authority in &variants {
                let external = Term::Iri(Iri::join(authority, local));
                for predicate in COPIED_PREDICATES {
                    let objects: Vec<Term> = reference
                        .triples_matching(&external, Some(predicate))
                        .map(|t| t.object.clone())
                        .collect();
                    for object in objects {
                        copied += usize::from(graph.add(subject, predicate, object));
                    }
                }
            }
        }

        debug!(prefix = %namespace.prefix, subjects = locals.len(), copied, "enriched namespace");
        report.copied += copied;
        report.enriched.push(namespace.prefix.clone());
    }

    info!(
        enriched = report.enriched.len(),
        skipped = report.failures.len(),
        copied = report.copied,
        "external enrichment finished"
    );
    (graph, report)
}

fn load_failure(namespace: &Namespace, location: &str, err: &LoadError) -> ExternalOntologyLoadFailure {
    ExternalOntologyLoadFailure {
        prefix: namespace.prefix.clone(),
        location: location.to_owned(),
        reason: err.to_string(),
    }
}

/// The authority itself plus its `http`/`https` counterpart.
fn scheme_variants(authority: &str) -> Vec<String> {
    let mut variants = vec![authority.to_owned()];
    if let Some(rest) = authority.strip_prefix("https://") {
        variants.push(format!("http://{rest}"));
    } else if let Some(rest) = authority.strip_prefix("http://") {
        variants.push(format!("https://{rest}"));
    }
    variants
}

/// Subjects of `graph` under any of `authorities`, with their local part.
fn referenced_locals(graph: &Graph, authorities: &[String]) -> BTreeSet<(Iri, String)> {
    graph
        .iter()
        .filter_map(|t| t.subject.as_iri())
        .filter_map(|iri| {
            authorities.iter().find_map(|authority| {
                iri.as_str()
                    .strip_prefix(authority.as_str())
                    .filter(|local| !local.is_empty())
                    .map(|local| (iri.clone(), local.to_owned()))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::model::iris::{OWL_CLASS, RDFS_LABEL, RDF_TYPE};

    const PMD: &str = "https://w3id.org/pmd/co/";

    #[derive(Default)]
    struct MapLoader {
        graphs: HashMap<String, Graph>,
        requested: RefCell<Vec<String>>,
    }

    impl ReferenceLoader for MapLoader {
        fn load(&self, location: &str) -> Result<Graph, LoadError> {
            self.requested.borrow_mut().push(location.to_owned());
            self.graphs.get(location).cloned().ok_or_else(|| LoadError::Remote {
                location: location.to_owned(),
            })
        }
    }

    fn local_graph(subject: &str) -> Graph {
        let mut graph = Graph::new();
        let subject = Iri::new(subject);
        graph.add(&subject, RDF_TYPE, Iri::from(OWL_CLASS));
        graph.add(&subject, RDFS_LABEL, Term::literal("Local label"));
        graph
    }

    fn reference(subject: &str) -> Graph {
        let subject = Iri::new(subject);
        let mut graph = Graph::new();
        graph.add(&subject, RDFS_LABEL, Term::literal("Reference label"));
        graph.add(&subject, SKOS_DEFINITION, Term::literal("A unit of mass."));
        graph.add(&subject, SKOS_ALT_LABEL, Term::literal("g"));
        graph.add(&subject, DCTERMS_DESCRIPTION, Term::literal("SI derived."));
        graph
    }

    #[test]
    fn copies_documentation_but_not_labels() {
        let mut registry = NamespaceRegistry::new();
        registry.register_with_reference("pmdco", PMD, "pmdco.ttl");
        let mut loader = MapLoader::default();
        loader
            .graphs
            .insert("pmdco.ttl".into(), reference("https://w3id.org/pmd/co/Gram"));

        let (graph, report) = enrich(local_graph("https://w3id.org/pmd/co/Gram"), &registry, &loader);

        let gram = Iri::new("https://w3id.org/pmd/co/Gram");
        assert!(graph.has(&gram, SKOS_DEFINITION, &Term::literal("A unit of mass.")));
        assert!(graph.has(&gram, SKOS_ALT_LABEL, &Term::literal("g")));
        assert!(graph.has(&gram, DCTERMS_DESCRIPTION, &Term::literal("SI derived.")));
        assert!(!graph.has(&gram, RDFS_LABEL, &Term::literal("Reference label")));
        assert_eq!(report.copied, 3);
        assert_eq!(report.enriched, vec!["pmdco"]);
    }

    #[test]
    fn matches_across_http_and_https() {
        let mut registry = NamespaceRegistry::new();
        registry.register_with_reference("pmdco", PMD, "pmdco.ttl");
        let mut loader = MapLoader::default();
        loader
            .graphs
            .insert("pmdco.ttl".into(), reference("http://w3id.org/pmd/co/Gram"));

        let (graph, _) = enrich(local_graph("https://w3id.org/pmd/co/Gram"), &registry, &loader);
        let gram = Iri::new("https://w3id.org/pmd/co/Gram");
        assert!(graph.has(&gram, SKOS_DEFINITION, &Term::literal("A unit of mass.")));
    }

    #[test]
    fn load_failure_skips_only_that_namespace() {
        let mut registry = NamespaceRegistry::new();
        registry.register_with_reference("pmdco", PMD, "pmdco.ttl");
        registry.register_with_reference("qudt", "http://qudt.org/schema/qudt/", "missing.ttl");
        let mut loader = MapLoader::default();
        loader
            .graphs
            .insert("pmdco.ttl".into(), reference("https://w3id.org/pmd/co/Gram"));

        let mut graph = local_graph("https://w3id.org/pmd/co/Gram");
        graph.extend(local_graph("http://qudt.org/schema/qudt/Unit"));
        let (graph, report) = enrich(graph, &registry, &loader);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].prefix, "qudt");
        assert_eq!(report.enriched, vec!["pmdco"]);
        let gram = Iri::new("https://w3id.org/pmd/co/Gram");
        assert!(graph.has(&gram, SKOS_DEFINITION, &Term::literal("A unit of mass.")));
    }

    #[test]
    fn unreferenced_namespace_is_not_loaded() {
        let mut registry = NamespaceRegistry::new();
        registry.register_with_reference("pmdco", PMD, "pmdco.ttl");
        let loader = MapLoader::default();
        let (graph, report) = enrich(local_graph("http://example.com/ontology#Sample"), &registry, &loader);
        assert!(loader.requested.borrow().is_empty());
        assert_eq!(graph.len(), 2);
        assert_eq!(report, EnrichmentReport::default());
    }

    #[test]
    fn parses_turtle_literals() {
        let text = r#"
            @prefix skos: <http://www.w3.org/2004/02/skos/core#> .
            @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
            <http://x.org/a#Gram> skos:definition "mass"^^xsd:string ;
                skos:altLabel "Gramm"@de ;
                <http://x.org/a#factor> "1"^^xsd:integer .
        "#;
        let graph = parse_turtle("inline", text).expect("valid turtle");
        let gram = Iri::new("http://x.org/a#Gram");
        assert_eq!(graph.len(), 3);
        assert!(graph.has(&gram, SKOS_DEFINITION, &Term::literal("mass")));
        assert!(graph.has(
            &gram,
            SKOS_ALT_LABEL,
            &Term::Literal(Literal {
                lexical: "Gramm".into(),
                datatype: None,
                language: Some("de".into()),
            })
        ));
        assert!(graph.has(
            &gram,
            "http://x.org/a#factor",
            &Term::Literal(Literal {
                lexical: "1".into(),
                datatype: Some(Iri::new(crate::model::iris::XSD_INTEGER)),
                language: None,
            })
        ));
    }

    #[test]
    fn parse_error_is_reported() {
        let err = parse_turtle("broken.ttl", "<http://x.org/a> <http://x.org/b> .").expect_err("invalid turtle");
        assert!(matches!(err, LoadError::Parse { location, .. } if location == "broken.ttl"));
    }

    #[test]
    fn file_loader_reads_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("ref.nt"),
            "<http://x.org/a#B> <http://www.w3.org/2004/02/skos/core#definition> \"b\" .\n",
        )
        .expect("write reference");
        let loader = TurtleFileLoader::new(dir.path());
        let graph = loader.load("ref.nt").expect("loadable");
        assert_eq!(graph.len(), 1);

        assert!(matches!(loader.load("missing.ttl"), Err(LoadError::Io { .. })));
        assert!(matches!(
            loader.load("https://w3id.org/pmd/co/pmdco.ttl"),
            Err(LoadError::Remote { .. })
        ));
    }
}
