//! Build pipeline for one sheet group.
//!
//! Root metadata, namespace registry, entity hierarchy, relationship binding
//! and (optionally) external enrichment run in that order. The graph is moved
//! into each phase and handed back by it.

use tracing::{info, warn};

use crate::binder::RelationshipBinder;
use crate::enrich::{enrich, EnrichmentReport, ReferenceLoader};
use crate::error::BuildError;
use crate::graph::{Graph, Iri, Term};
use crate::hierarchy::{EntityTable, HierarchyBuilder};
use crate::model::iris::*;
use crate::model::{OntologyInfo, RelationshipDefinition, RelationshipIndex};
use crate::namespace::NamespaceRegistry;
use crate::sheets::{NamespaceRow, SheetTables};

/// Build switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Copy documentation triples from tracked reference ontologies.
    pub enrich: bool,
}

/// Everything produced by [`build_ontology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltOntology {
    /// Ontology header.
    pub info: OntologyInfo,
    /// The finished graph.
    pub graph: Graph,
    /// Namespaces used for the build.
    pub registry: NamespaceRegistry,
    /// Resolved entities.
    pub entities: EntityTable,
    /// Declared object and data properties.
    pub relationships: Vec<RelationshipDefinition>,
    /// Outgoing object-property edges per domain entity.
    pub index: RelationshipIndex,
    /// Enrichment outcome, when enrichment ran.
    pub enrichment: Option<EnrichmentReport>,
}

/// Builds the graph of one sheet group.
///
/// # Errors
///
/// Returns the first [`BuildError`] raised by the hierarchy builder or the
/// relationship binder. Enrichment failures are never errors.
pub fn build_ontology(
    tables: &SheetTables,
    options: &BuildOptions,
    loader: &dyn ReferenceLoader,
) -> Result<BuiltOntology, BuildError> {
    let info = tables.info.clone();
    let registry = build_registry(&info, &tables.namespaces);

    let graph = root_metadata(&info, Graph::new());
    let graph = bind_namespaces(&info, &tables.namespaces, graph);

    let (graph, entities) = HierarchyBuilder::new(&registry, &info).build(&tables.entities, graph)?;
    let (graph, bindings) = RelationshipBinder::new(&registry, &info, &entities).bind(
        &tables.relationships,
        &tables.value_types,
        graph,
    )?;

    let (graph, enrichment) = if options.enrich {
        let (graph, report) = enrich(graph, &registry, loader);
        (graph, Some(report))
    } else {
        (graph, None)
    };

    info!(
        ontology = %info.name,
        triples = graph.len(),
        entities = entities.len(),
        properties = bindings.definitions.len(),
        "built ontology"
    );

    Ok(BuiltOntology {
        info,
        graph,
        registry,
        entities,
        relationships: bindings.definitions,
        index: bindings.index,
        enrichment,
    })
}

/// Registers the ontology's own name and every namespace row.
///
/// The own name always stays bound to the base authority; a namespace row
/// reusing it is ignored with a warning.
#[must_use]
pub fn build_registry(info: &OntologyInfo, rows: &[NamespaceRow]) -> NamespaceRegistry {
    let mut registry = NamespaceRegistry::for_ontology(&info.name, &info.base_iri);
    for (prefix, url, row) in namespace_rows(info, rows) {
        registry.register_with_reference(prefix, url, &row.info);
    }
    registry
}

/// Adds the `<base>Ontology` declaration with title, version, creators and
/// description.
#[must_use]
pub fn root_metadata(info: &OntologyInfo, mut graph: Graph) -> Graph {
    let root = info.root_iri();
    graph.add(&root, RDF_TYPE, Iri::from(OWL_ONTOLOGY));
    graph.add(&root, RDFS_LABEL, Term::literal(&info.name));
    graph.add(&root, DCTERMS_TITLE, Term::literal(&info.name));
    graph.add(&root, OWL_VERSION_INFO, Term::literal(&info.version));
    for author in info.authors.iter().filter(|a| !a.is_empty()) {
        graph.add(&root, DCTERMS_CREATOR, Term::literal(author));
    }
    graph.add(&root, DCTERMS_DESCRIPTION, Term::literal(&info.description));
    graph
}

fn bind_namespaces(info: &OntologyInfo, rows: &[NamespaceRow], mut graph: Graph) -> Graph {
    for (prefix, url, _) in namespace_rows(info, rows) {
        graph.bind(prefix.to_lowercase(), url);
    }
    graph.bind(info.name.as_str(), info.base_iri.as_str());
    graph
}

/// Usable namespace rows as trimmed `(prefix, url, row)`, minus any row that
/// rebinds the ontology's own name.
fn namespace_rows<'r>(
    info: &'r OntologyInfo,
    rows: &'r [NamespaceRow],
) -> impl Iterator<Item = (&'r str, &'r str, &'r NamespaceRow)> {
    let own = info.name.trim();
    rows.iter().filter_map(move |row| {
        let (prefix, url) = (row.prefix.trim(), row.url.trim());
        if prefix.is_empty() || url.is_empty() {
            return None;
        }
        if prefix.eq_ignore_ascii_case(own) {
            warn!(prefix, url, "namespace row rebinds the ontology's own name; ignored");
            return None;
        }
        Some((prefix, url, row))
    })
}
