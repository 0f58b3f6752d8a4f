//! Simple CLI for loading record batches into the B+ tree index.
//!
//! Usage:
//!   bplus_cli --max-degree 4 --input december.csv --input february.csv --report
//!   bplus_cli --generate 1000 --search 42 --diagram tree.txt
//!   bplus_cli --input data.csv --scan --json
//!
//! Each `--input` file is one batch of `id,payload` lines. Records sharing an
//! id are grouped before insertion; an id already loaded by an earlier batch
//! aborts the run.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::exit;

use bplus_index::batch::{load_records, read_records};
use bplus_index::{BPlusTree, IndexConfig, Narrative, Result, DEFAULT_MAX_DEGREE};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "bplus_cli", about = "Load record batches into an in-memory B+ tree index")]
struct Args {
    /// Maximum keys per node before a split (at least 3)
    #[arg(short = 'k', long, default_value_t = DEFAULT_MAX_DEGREE)]
    max_degree: usize,

    /// Batch file of `id,payload` lines; repeat for several batches
    #[arg(short, long = "input")]
    inputs: Vec<PathBuf>,

    /// Insert this many generated records after the input batches
    #[arg(long)]
    generate: Option<i64>,

    /// Look up a key and print its records; repeatable
    #[arg(short, long = "search")]
    searches: Vec<i64>,

    /// Print every key in ascending order
    #[arg(long)]
    scan: bool,

    /// Write the tree diagram to this file
    #[arg(long)]
    diagram: Option<PathBuf>,

    /// Print the tree structure as JSON
    #[arg(long)]
    json: bool,

    /// Print the run narrative
    #[arg(long)]
    report: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("ERROR: {}", e);
        exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut tree: BPlusTree<i64, Vec<String>> =
        BPlusTree::with_config(IndexConfig::new(args.max_degree))?;
    let mut narrative = Narrative::new();

    for path in &args.inputs {
        let reader = BufReader::new(File::open(path)?);
        let records: Vec<(i64, String)> = read_records(reader)?;
        narrative.record(format!("{}: {} records read", path.display(), records.len()));

        let summary = load_records(&mut tree, records)?;
        narrative.record_load(&path.display().to_string(), &summary);
    }

    if let Some(count) = args.generate {
        let start = tree.last_key_value().map_or(0, |(k, _)| k + 1);
        let records = (start..start + count).map(|id| (id, format!("generated_{}", id)));
        let summary = load_records(&mut tree, records)?;
        narrative.record_load("generated", &summary);
    }

    narrative.record_stats(&tree.stats());

    for key in &args.searches {
        match tree.search(key) {
            Some(records) => {
                println!("{}: {} record(s)", key, records.len());
                for record in records {
                    println!("  {}", record);
                }
            }
            None => println!("{}: NOT_FOUND", key),
        }
    }

    if args.scan {
        println!("COUNT: {}", tree.len());
        let keys: Vec<String> = tree.keys().map(ToString::to_string).collect();
        println!("{}", keys.join(" "));
    }

    if args.json {
        println!("{}", tree.to_json()?);
    }

    if let Some(path) = &args.diagram {
        tree.write_diagram_to_file(path)?;
        narrative.record(format!("Tree was output to {}", path.display()));
        println!("Tree was output to {}", path.display());
    }

    if args.report {
        println!("\nNarrative contents:\n");
        print!("{}", narrative);
    }

    Ok(())
}
