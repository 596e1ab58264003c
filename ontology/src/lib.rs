//! FAIR ontology sheets encoded as typed triple graphs.
//!
//! The `fairsheet-ontology` crate turns a group of five spreadsheet tables
//! (ontology header, namespaces, entities, relationships and value types)
//! into a [`Graph`] of OWL/RDFS/SKOS triples, merges several such graphs into
//! one consolidated ontology, and serializes graphs as N-Triples, Turtle,
//! JSON-LD and DOT.
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use fairsheet_ontology::{build_ontology, BuildOptions, SheetTables, TurtleFileLoader};
//!
//! let folder = Path::new("sheets");
//! let tables = SheetTables::load(folder, "PVModule").expect("sheet tables");
//! let built = build_ontology(&tables, &BuildOptions::default(), &TurtleFileLoader::new(folder))
//!     .expect("well-formed sheets");
//! let turtle = fairsheet_ontology::serializer::turtle::to_turtle(&built.graph);
//! ```
//!
//! # Merging
//!
//! ```
//! use fairsheet_ontology::{add_ownership_metadata, merge, Graph, OwnershipMetadata};
//!
//! let merged = merge(Graph::new(), Graph::new());
//! let merged = add_ownership_metadata(merged, &OwnershipMetadata::default());
//! assert_eq!(merged.len(), 5);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod binder;
pub mod builder;
pub mod enrich;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod merge;
pub mod model;
pub mod namespace;
pub mod render;
pub mod serializer;
pub mod sheets;

pub use binder::{literal_type, Bindings, RelationshipBinder};
pub use builder::{build_ontology, BuildOptions, BuiltOntology};
pub use enrich::{
    enrich, parse_turtle, EnrichmentReport, ExternalOntologyLoadFailure, LoadError,
    ReferenceLoader, TurtleFileLoader,
};
pub use error::{BuildError, NamespaceError};
pub use graph::{Graph, Iri, Literal, Term, Triple};
pub use hierarchy::{EntityTable, HierarchyBuilder};
pub use merge::{
    add_ownership_metadata, find_collisions, merge, merge_all, merge_reporting,
    IdentifierCollision, MergeOutcome, OwnershipMetadata,
};
pub use model::{Entity, OntologyInfo, PropertyKind, RelationshipDefinition, RelationshipIndex};
pub use namespace::{Namespace, NamespaceRegistry};
pub use render::render_token;
pub use serializer::dot::DotOptions;
pub use sheets::{discover_groups, SheetError, SheetTables, Table};
