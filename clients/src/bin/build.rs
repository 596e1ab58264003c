//! `fairsheet-build` — Builds one ontology per sheet group found in a folder
//! and, when there is more than one group, a merged ontology.
//!
//! **Outputs** (per group, and for the merged ontology under its title):
//! - `<out>/<group>.ttl` — Turtle 1.1
//! - `<out>/<group>.nt` — N-Triples
//! - `<out>/<group>.jsonld` — JSON-LD 1.1
//! - `<out>/<group>.dot` — class hierarchy for Graphviz
//! - `<out>/<group>.relationships.json` — relationship index
//!
//! **Usage:**
//! ```text
//! fairsheet-build --folder <path> [--out <path>] [--enrich] [--include-value-types]
//!                 [--merge-title <t>] [--merge-base-uri <uri>]
//!                 [--merge-version <v>] [--merge-description <d>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fairsheet_clients::{init_tracing, merged_stem, write_artifacts, write_index};
use fairsheet_ontology::{
    add_ownership_metadata, build_ontology, discover_groups, merge_all, BuildOptions, DotOptions,
    OwnershipMetadata, SheetTables, TurtleFileLoader,
};
use tracing::warn;

/// Build ontology artifacts from FAIR sheet groups.
#[derive(Parser)]
#[command(name = "fairsheet-build", about = "Build ontologies from FAIR sheet groups")]
struct Args {
    /// Folder holding the sheet CSV files.
    #[arg(long)]
    folder: PathBuf,

    /// Output directory for generated artifacts.
    #[arg(long, default_value = "public")]
    out: PathBuf,

    /// Copy definitions and alternate labels from tracked reference ontologies.
    #[arg(long)]
    enrich: bool,

    /// Draw data properties in the DOT output.
    #[arg(long)]
    include_value_types: bool,

    /// Title of the merged ontology.
    #[arg(long)]
    merge_title: Option<String>,

    /// Base authority of the merged ontology.
    #[arg(long)]
    merge_base_uri: Option<String>,

    /// Version of the merged ontology.
    #[arg(long)]
    merge_version: Option<String>,

    /// Description of the merged ontology.
    #[arg(long)]
    merge_description: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let groups = discover_groups(&args.folder)
        .with_context(|| format!("Failed to list sheet groups in {}", args.folder.display()))?;
    if groups.is_empty() {
        bail!("No sheet groups found in {}", args.folder.display());
    }

    let options = BuildOptions {
        enrich: args.enrich,
    };
    let dot_options = DotOptions {
        include_value_types: args.include_value_types,
    };
    let loader = TurtleFileLoader::new(&args.folder);

    let mut graphs = Vec::with_capacity(groups.len());
    for group in &groups {
        let tables = SheetTables::load(&args.folder, group)
            .with_context(|| format!("Failed to read sheet group `{group}`"))?;
        let built = build_ontology(&tables, &options, &loader)
            .with_context(|| format!("Failed to build ontology for sheet group `{group}`"))?;

        println!(
            "{} v{}: {} triples, {} entities, {} properties",
            built.info.name,
            built.info.version,
            built.graph.len(),
            built.entities.len(),
            built.relationships.len()
        );
        if let Some(report) = &built.enrichment {
            for failure in &report.failures {
                println!("  Skipped: {failure}");
            }
        }

        for path in write_artifacts(&built.graph, &args.out, group, &dot_options)? {
            println!("  Written: {}", path.display());
        }
        let index_path = write_index(&built.index, &args.out, group)?;
        println!("  Written: {}", index_path.display());

        graphs.push(built.graph);
    }

    if graphs.len() > 1 {
        let metadata = OwnershipMetadata {
            base_uri: args.merge_base_uri,
            title: args.merge_title,
            version: args.merge_version,
            description: args.merge_description,
        };
        if let Some(outcome) = merge_all(graphs) {
            if !outcome.collisions.is_empty() {
                warn!(count = outcome.collisions.len(), "merged ontology has identifier collisions");
            }
            let merged = add_ownership_metadata(outcome.graph, &metadata);
            println!("Merged {} groups: {} triples", groups.len(), merged.len());
            let stem = merged_stem(metadata.title(), &groups);
            for path in write_artifacts(&merged, &args.out, &stem, &dot_options)? {
                println!("  Written: {}", path.display());
            }
        }
    }

    println!("Build complete.");
    Ok(())
}
