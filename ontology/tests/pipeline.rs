//! Sheet folder → graph → merge → serializers.

use std::fs;
use std::path::Path;

use fairsheet_ontology::model::iris::*;
use fairsheet_ontology::serializer::{dot, jsonld, ntriples, turtle};
use fairsheet_ontology::{
    add_ownership_metadata, build_ontology, discover_groups, merge_all, parse_turtle, BuildError,
    BuildOptions, BuiltOntology, DotOptions, Iri, OwnershipMetadata, SheetError, SheetTables, Term,
    TurtleFileLoader,
};
use tempfile::TempDir;

const PV: &str = "http://example.com/pv#";
const INVERTER: &str = "http://example.com/inverter#";
const PMDCO: &str = "https://w3id.org/pmd/co/";

const ENTITY_HEADER: &str =
    "Variable Name,Belongs to Ontology,Parent Variable,Definition of Variable,Alternative Name(s),Unit,fullName\n";
const RELATIONSHIP_HEADER: &str =
    "Relationship Name,Belongs to Ontology,Domain,Range,Definition,Alternative Name(s),fullName\n";
const VALUE_TYPE_HEADER: &str =
    "ValueType Name,Belongs to Ontology,Domain,Range,Definition of Property,Alternative Name(s),fullName\n";

struct Group<'a> {
    name: &'a str,
    base: &'a str,
    namespaces: &'a str,
    entities: &'a str,
    relationships: &'a str,
    value_types: &'a str,
}

fn write_group(folder: &Path, group: &Group<'_>) {
    let file = |table: &str| folder.join(format!("{}- {table}.csv", group.name));
    let info = format!(
        "Ontology Name,{name}\nOntology URI,{base}\nOntology Version,1.0\nOntology Author(s),\"Ada, Grace\"\nOntology Description,{name} ontology\n",
        name = group.name,
        base = group.base,
    );
    let guidance = "(guidance row)\n";
    fs::write(file("OntologyInfo"), info).expect("write info");
    fs::write(
        file("NameSpace"),
        format!("Prefix Name,Ontology URL,Ontology Info\n{guidance}{}", group.namespaces),
    )
    .expect("write namespaces");
    fs::write(file("VariableDefinitions"), format!("{ENTITY_HEADER}{guidance}{}", group.entities)).expect("write entities");
    fs::write(
        file("RelationshipDefinitions"),
        format!("{RELATIONSHIP_HEADER}{guidance}{}", group.relationships),
    )
    .expect("write relationships");
    fs::write(
        file("ValueTypeDefinitions"),
        format!("{VALUE_TYPE_HEADER}{guidance}{}", group.value_types),
    )
    .expect("write value types");
}

fn pv_group() -> Group<'static> {
    Group {
        name: "PVModule",
        base: PV,
        namespaces: "PMDCo,https://w3id.org/pmd/co/,pmdco.ttl\n",
        entities: "Cell,,PVModule:Module,Smallest active unit,\"solar cell, PV cell\",,Cell\n\
                   Module,,,Assembly of cells,,,PVModule:Module\n\
                   Sample,,,,,PMDCo:gram,Sample\n\
                   Gram,PMDCo,,,,,PMDCo:Gram\n",
        relationships: "hasCell,,PVModule:Module,Cell,Composition,,hasCell(Module)\n\
                        hasCell,,PVModule:Module,Cell,Composition,,hasCell(Module)\n",
        value_types: "power,,PVModule:Module,xsd:float,Rated power,Pmax,power(Module)\n",
    }
}

fn inverter_group() -> Group<'static> {
    Group {
        name: "Inverter",
        base: INVERTER,
        namespaces: "",
        entities: "Cell,,,Inverter cell,,,Cell\nInverter,,,,,,Inverter\n",
        relationships: "feeds,,Inverter,Cell,,,feeds(Inverter)\n",
        value_types: "",
    }
}

fn sheet_folder() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_group(dir.path(), &pv_group());
    write_group(dir.path(), &inverter_group());
    fs::write(
        dir.path().join("pmdco.ttl"),
        "@prefix skos: <http://www.w3.org/2004/02/skos/core#> .\n\
         @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
         <http://w3id.org/pmd/co/Gram> rdfs:label \"gram\"@en ;\n\
             skos:definition \"Unit of mass.\" ;\n\
             skos:altLabel \"g\" .\n",
    )
    .expect("write reference ontology");
    dir
}

fn build(folder: &Path, group: &str, enrich: bool) -> BuiltOntology {
    let tables = SheetTables::load(folder, group).expect("readable group");
    build_ontology(&tables, &BuildOptions { enrich }, &TurtleFileLoader::new(folder)).expect("buildable group")
}

fn iri(base: &str, local: &str) -> Iri {
    Iri::join(base, local)
}

#[test]
fn discovers_every_group_once() {
    let dir = sheet_folder();
    let groups = discover_groups(dir.path()).expect("listable");
    assert_eq!(groups, vec!["Inverter", "PVModule"]);
}

#[test]
fn builds_hierarchy_and_relationships_from_csv() {
    let dir = sheet_folder();
    let built = build(dir.path(), "PVModule", false);
    let graph = &built.graph;

    assert_eq!(built.entities.resolution_order(), &["PVModule:Module", "Cell", "Sample", "PMDCo:Gram"]);
    assert!(graph.has(&iri(PV, "Cell"), RDFS_SUBCLASS_OF, &Term::Iri(iri(PV, "Module"))));
    assert!(graph.has(&iri(PV, "Cell"), SKOS_ALT_LABEL, &Term::literal("PV cell")));
    assert!(graph.has(&iri(PV, "Sample"), PMD_UNIT, &Term::Iri(iri(PMDCO, "gram"))));
    assert!(graph.has(&iri(PMDCO, "Gram"), RDF_TYPE, &Term::Iri(Iri::new(OWL_CLASS))));

    let has_cell = iri(PV, "hasCell");
    assert_eq!(graph.objects(&has_cell, RDF_TYPE).count(), 1);
    assert_eq!(graph.objects(&has_cell, RDFS_DOMAIN).count(), 1);
    assert_eq!(built.index.outgoing("PVModule:Module").len(), 1);

    let power = iri(PV, "power");
    assert!(graph.has(&power, SKOS_DEFINITION, &Term::literal("Rated power")));
    assert!(graph.has(&power, RDFS_RANGE, &Term::Iri(Iri::new(XSD_FLOAT))));

    let root = iri(PV, "Ontology");
    assert_eq!(graph.objects(&root, DCTERMS_CREATOR).count(), 2);
}

#[test]
fn enrichment_copies_reference_documentation() {
    let dir = sheet_folder();
    let built = build(dir.path(), "PVModule", true);
    let gram = iri(PMDCO, "Gram");
    assert!(built.graph.has(&gram, SKOS_DEFINITION, &Term::literal("Unit of mass.")));
    assert!(built.graph.has(&gram, SKOS_ALT_LABEL, &Term::literal("g")));
    let labels: Vec<&Term> = built.graph.objects(&gram, RDFS_LABEL).collect();
    assert_eq!(labels, vec![&Term::literal("Gram")]);
    let report = built.enrichment.expect("enrichment ran");
    assert_eq!(report.enriched, vec!["pmdco"]);
    assert!(report.failures.is_empty());
}

#[test]
fn missing_reference_file_is_not_fatal() {
    let dir = sheet_folder();
    fs::remove_file(dir.path().join("pmdco.ttl")).expect("remove reference");
    let built = build(dir.path(), "PVModule", true);
    let report = built.enrichment.expect("enrichment ran");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].prefix, "pmdco");
}

#[test]
fn merges_groups_with_collision_diagnostics() {
    let dir = sheet_folder();
    let pv = build(dir.path(), "PVModule", false);
    let inverter = build(dir.path(), "Inverter", false);

    let outcome = merge_all(vec![pv.graph.clone(), inverter.graph.clone()]).expect("two inputs");
    assert!(outcome
        .graph
        .iter()
        .all(|t| !t.subject.to_string().contains("#Ontology")));
    assert!(outcome.collisions.iter().any(|c| c.fragment == "Cell"));
    assert!(outcome.graph.has(&iri(PV, "Cell"), RDF_TYPE, &Term::Iri(Iri::new(OWL_CLASS))));
    assert!(outcome.graph.has(&iri(INVERTER, "Cell"), RDF_TYPE, &Term::Iri(Iri::new(OWL_CLASS))));

    let reversed = merge_all(vec![inverter.graph, pv.graph]).expect("two inputs");
    assert_eq!(
        outcome.graph.iter().collect::<Vec<_>>(),
        reversed.graph.iter().collect::<Vec<_>>()
    );

    let merged = add_ownership_metadata(
        outcome.graph,
        &OwnershipMetadata {
            title: Some("solar".into()),
            base_uri: Some("http://example.com/solar#".into()),
            ..OwnershipMetadata::default()
        },
    );
    let root = Iri::new("http://example.com/solar#Ontology");
    assert!(merged.has(&root, DCTERMS_TITLE, &Term::literal("solar")));
    assert_eq!(merged.prefixes().get("solar").map(String::as_str), Some("http://example.com/solar#"));
}

#[test]
fn serializations_agree() {
    let dir = sheet_folder();
    let graph = build(dir.path(), "PVModule", false).graph;

    let from_turtle = parse_turtle("pv.ttl", &turtle::to_turtle(&graph)).expect("valid turtle");
    let from_ntriples = parse_turtle("pv.nt", &ntriples::to_ntriples(&graph)).expect("valid n-triples");
    assert_eq!(from_turtle.iter().collect::<Vec<_>>(), graph.iter().collect::<Vec<_>>());
    assert_eq!(from_ntriples.iter().collect::<Vec<_>>(), graph.iter().collect::<Vec<_>>());

    let doc = jsonld::to_json_ld(&graph);
    assert_eq!(doc["@context"]["PVModule"], serde_json::json!(PV));
    assert_eq!(doc["@context"]["pmdco"], serde_json::json!(PMDCO));

    let rendered = dot::to_dot(&graph, &DotOptions { include_value_types: true });
    assert!(rendered.contains("arrowhead=empty"));
    assert!(rendered.contains("[label=\"power\", arrowhead=odot];"));
}

#[test]
fn spaced_names_survive_serialization() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_group(
        dir.path(),
        &Group {
            entities: "Solar Cell,,,,,,Solar Cell\nModule,,,,,,Module\n",
            relationships: "has cell,,Module,Solar Cell,,,has cell(Module)\n",
            value_types: "",
            namespaces: "",
            ..pv_group()
        },
    );
    let graph = build(dir.path(), "PVModule", false).graph;
    let cell = iri(PV, "Solar Cell");
    assert_eq!(cell.as_str(), "http://example.com/pv#Solar%20Cell");
    assert!(graph.has(&cell, RDFS_LABEL, &Term::literal("Solar Cell")));

    let from_turtle = parse_turtle("pv.ttl", &turtle::to_turtle(&graph)).expect("valid turtle");
    let from_ntriples = parse_turtle("pv.nt", &ntriples::to_ntriples(&graph)).expect("valid n-triples");
    assert_eq!(from_turtle.iter().collect::<Vec<_>>(), graph.iter().collect::<Vec<_>>());
    assert_eq!(from_ntriples.iter().collect::<Vec<_>>(), graph.iter().collect::<Vec<_>>());
}

#[test]
fn unknown_literal_type_aborts_the_group() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_group(
        dir.path(),
        &Group {
            value_types: "power,,Module,xsd:double,,,power(Module)\n",
            entities: "Module,,,,,,Module\n",
            relationships: "",
            ..pv_group()
        },
    );
    let tables = SheetTables::load(dir.path(), "PVModule").expect("readable group");
    let err = build_ontology(&tables, &BuildOptions::default(), &TurtleFileLoader::new(dir.path()))
        .expect_err("xsd:double is not a supported literal type");
    assert_eq!(
        err,
        BuildError::UnknownLiteralType {
            property: "power".into(),
            range: "xsd:double".into(),
        }
    );
}

#[test]
fn missing_table_is_reported() {
    let dir = sheet_folder();
    fs::remove_file(dir.path().join("Inverter- NameSpace.csv")).expect("remove table");
    let err = SheetTables::load(dir.path(), "Inverter").expect_err("incomplete group");
    assert!(matches!(err, SheetError::MissingTable { .. }));
}
