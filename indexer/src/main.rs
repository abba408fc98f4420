mod display;

use anyhow::Result;
use boolean_index_core::algebra::{intersect_terms, plan_and};
use boolean_index_core::{parse_query, BuildOutput, DocId, FileSource, IndexBuilder, Normalization, Query};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::path::Path;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an in-memory inverted index and answer boolean queries", long_about = None)]
struct Cli {
    /// Tokenize and index documents on parallel workers
    #[arg(long, global = true, default_value_t = false)]
    parallel: bool,
    /// Apply NFKC compatibility folding before lower-casing terms
    #[arg(long, global = true, default_value_t = false)]
    nfkc: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Document file, or directory scanned for *.txt; repeatable. Ids follow the order given.
    #[arg(long, required = true)]
    input: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the term-document incidence matrix
    Matrix {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print the inverted index
    Show {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Intersect the postings of all given terms, smallest list first
    And {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(required = true)]
        terms: Vec<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Evaluate a boolean query, e.g. "brutus AND (caesar OR calpurnia) AND NOT noble"
    Query {
        #[command(flatten)]
        inputs: Inputs,
        expr: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Matrix, index listing and an AND query in one run, with elapsed time
    Demo {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, num_args = 1.., default_values = ["brutus", "caesar", "noble", "window"])]
        terms: Vec<String>,
    },
}

#[derive(Serialize)]
struct AndOutput<'a> {
    terms: &'a [String],
    plan: Vec<&'a str>,
    result: Vec<DocId>,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: String,
    parsed: &'a Query,
    result: Vec<DocId>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let normalization = if cli.nfkc { Normalization::NfkcLowercase } else { Normalization::Lowercase };
    let opts = BuildOpts { parallel: cli.parallel, normalization };

    match cli.command {
        Commands::Matrix { inputs } => {
            let out = build_index(&inputs.input, &opts);
            print!("{}", display::render_matrix(&out.index));
        }
        Commands::Show { inputs, json } => {
            let out = build_index(&inputs.input, &opts);
            if json {
                println!("{}", serde_json::to_string_pretty(&out.index)?);
            } else {
                print!("{}", display::render_index(&out.index));
            }
        }
        Commands::And { inputs, terms, json } => {
            let out = build_index(&inputs.input, &opts);
            let plan = plan_and(&out.index, &terms);
            let result = intersect_terms(&out.index, &terms);
            if json {
                println!("{}", serde_json::to_string_pretty(&AndOutput { terms: &terms, plan, result })?);
            } else {
                println!("plan: {plan:?}");
                println!("result: {result:?}");
            }
        }
        Commands::Query { inputs, expr, json } => {
            let query = parse_query(&expr)?;
            let out = build_index(&inputs.input, &opts);
            let result = query.evaluate(&out.index);
            if json {
                let rec = QueryOutput { query: query.to_string(), parsed: &query, result };
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                println!("{query}: {result:?}");
            }
        }
        Commands::Demo { inputs, terms } => {
            let start = Instant::now();
            let out = build_index(&inputs.input, &opts);
            print!("{}", display::render_matrix(&out.index));
            println!();
            print!("{}", display::render_index(&out.index));
            let result = intersect_terms(&out.index, &terms);
            println!("\nResult of INTERSECT operation for terms {terms:?}: {result:?}");
            println!("Time taken: {} milliseconds", start.elapsed().as_millis());
        }
    }
    Ok(())
}

struct BuildOpts {
    parallel: bool,
    normalization: Normalization,
}

fn build_index(inputs: &[String], opts: &BuildOpts) -> BuildOutput {
    let sources = collect_sources(inputs);
    tracing::info!(documents = sources.len(), parallel = opts.parallel, "building index");

    let builder = IndexBuilder::new().with_normalization(opts.normalization);
    let out = if opts.parallel {
        builder.build_from_sources_parallel(&sources)
    } else {
        builder.build_from_sources(&sources)
    };
    if !out.warnings.is_empty() {
        eprintln!("indexer: {} warning(s) while building:", out.warnings.len());
        for w in &out.warnings {
            eprintln!("  {w}");
        }
    }
    out
}

/// Expand inputs into file sources. Directories contribute their *.txt files in
/// path order; anything else is taken as a file, so a missing path surfaces as
/// an unavailable document rather than an error.
fn collect_sources(inputs: &[String]) -> Vec<FileSource> {
    let mut sources = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                    sources.push(FileSource::new(p));
                }
            }
        } else {
            sources.push(FileSource::new(path));
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn directories_expand_to_sorted_txt_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "caesar").unwrap();
        fs::write(dir.path().join("a.txt"), "brutus").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        let missing = dir.path().join("missing.txt").to_string_lossy().to_string();

        let inputs = vec![dir.path().to_string_lossy().to_string(), missing];
        let sources = collect_sources(&inputs);
        let names: Vec<String> = sources
            .iter()
            .map(|s| s.path().file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "missing.txt"]);

        let out = build_index(&inputs, &BuildOpts { parallel: true, normalization: Normalization::Lowercase });
        assert_eq!(out.index.num_docs(), 3);
        assert_eq!(out.index.postings("caesar"), &[2]);
        assert_eq!(out.warnings.len(), 1);
    }
}
