//! `lir-dump`: print a saved ranking file as a table.
//!
//! Usage:
//!   lir-dump <file> [out]
//!
//! The table is appended to `out` when given, printed to stdout otherwise.
//! `LIR_LOG` sets the log level (`trace` .. `error`, default `warn`) and
//! `LIR_OPTIONS` may hold a JSON document of collection options.

use std::path::Path;

use insertion_ranking::{RankedCollection, RankingOptions};
use tracing::Level;

fn main() {
    let level = std::env::var("LIR_LOG")
        .ok()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1) {
        Some(p) => p.clone(),
        None => {
            eprintln!("First argument must be a ranking file.");
            std::process::exit(1);
        }
    };
    let out = args.get(2).map(Path::new);

    let options = match std::env::var("LIR_OPTIONS") {
        Ok(json) => match RankingOptions::from_json_str(&json) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("LIR_OPTIONS: {e}");
                std::process::exit(1);
            }
        },
        Err(_) => RankingOptions::default(),
    };

    let result = RankedCollection::with_options(&path, options).and_then(|mut collection| {
        collection.load()?;
        collection.dump(out)
    });
    if let Err(e) = result {
        eprintln!("{path}: {e}");
        std::process::exit(1);
    }
}
