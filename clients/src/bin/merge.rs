//! `fairsheet-merge` — Merges serialized ontologies into one consolidated
//! ontology with ownership metadata.
//!
//! Inputs are Turtle or N-Triples files. Per-input ontology roots are dropped
//! and a single root is attached under `--base-uri`.
//!
//! **Usage:**
//! ```text
//! fairsheet-merge <file>... [--out <path>] [--title <t>] [--base-uri <uri>]
//!                 [--version-info <v>] [--description <d>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fairsheet_clients::{file_stem, init_tracing, write_artifacts};
use fairsheet_ontology::{add_ownership_metadata, merge_all, parse_turtle, DotOptions, OwnershipMetadata};

/// Merge ontology files into one.
#[derive(Parser)]
#[command(name = "fairsheet-merge", about = "Merge ontology files into one consolidated ontology")]
struct Args {
    /// Turtle or N-Triples files to merge.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory for generated artifacts.
    #[arg(long, default_value = "public")]
    out: PathBuf,

    /// Title of the merged ontology.
    #[arg(long)]
    title: Option<String>,

    /// Base authority of the merged ontology.
    #[arg(long)]
    base_uri: Option<String>,

    /// Version of the merged ontology.
    #[arg(long)]
    version_info: Option<String>,

    /// Description of the merged ontology.
    #[arg(long)]
    description: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut graphs = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let text = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
        let location = file.display().to_string();
        let graph = parse_turtle(&location, &text).with_context(|| format!("Failed to parse {location}"))?;
        println!("Loaded {location}: {} triples", graph.len());
        graphs.push(graph);
    }

    let metadata = OwnershipMetadata {
        base_uri: args.base_uri,
        title: args.title,
        version: args.version_info,
        description: args.description,
    };
    let Some(outcome) = merge_all(graphs) else {
        return Ok(());
    };
    for collision in &outcome.collisions {
        println!("  Collision: {collision}");
    }

    let merged = add_ownership_metadata(outcome.graph, &metadata);
    println!("Merged {} files: {} triples", args.files.len(), merged.len());
    let stem = file_stem(metadata.title());
    for path in write_artifacts(&merged, &args.out, &stem, &DotOptions::default())? {
        println!("  Written: {}", path.display());
    }

    println!("Merge complete.");
    Ok(())
}
