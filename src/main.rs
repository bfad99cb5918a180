//! # Jurisdiction CLI Driver
//!
//! ## Purpose
//! Thin command-line front end over the jurisdiction graph core: loads the
//! configured seed data and exposes hierarchy resolution, filter
//! construction, and document enrichment as subcommands, printing JSON.
//!
//! ## Input/Output Specification
//! - **Input**: configuration file, seed data, subcommand arguments, JSONL
//!   document files for enrichment
//! - **Output**: resolved chains / filters / enriched documents as JSON on
//!   stdout
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Load the region graph from seed data
//! 4. Dispatch the subcommand against the graph snapshot

use clap::{Arg, ArgAction, Command};
use std::io::BufRead;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use jurisdiction_search::{
    config::Config,
    enrich::{JurisdictionEnricher, LegalDocument},
    errors::{JurisdictionError, Result},
    filter::FilterBuilder,
    resolver::HierarchyResolver,
    seed,
};

fn main() -> Result<()> {
    let matches = Command::new("jurisdiction-cli")
        .version("0.1.0")
        .author("Legal Search Team")
        .about("Jurisdiction hierarchy resolution and search-filter construction")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve the jurisdiction chain for a region")
                .arg(Arg::new("region").required(true).help("Region id, e.g. GA-ATLANTA"))
                .arg(
                    Arg::new("primary-only")
                        .long("primary-only")
                        .help("Collapse multi-county branches to the primary county")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("filter")
                .about("Build the search filter disjunction for a region")
                .arg(Arg::new("region").required(true).help("Region id, e.g. GA-GWINNETT"))
                .arg(
                    Arg::new("region-only")
                        .long("region-only")
                        .help("Exclude parent jurisdictions (only exact region)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("sql")
                        .long("sql")
                        .help("Print the rendered SQL clause instead of JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("enrich")
                .about("Enrich JSONL documents with jurisdiction annotations")
                .arg(Arg::new("file").required(true).help("Path to a JSONL document file")),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");
    let config = Config::from_file(config_path)?;

    init_logging(&config)?;
    info!("loading region graph from {:?}", config.graph.seed_path);
    let graph = seed::load_graph(&config.graph.seed_path)?;

    match matches.subcommand() {
        Some(("resolve", sub)) => {
            let region = required_arg(sub, "region")?;
            let include_all = !sub.get_flag("primary-only");
            let chain = HierarchyResolver::new(&graph)
                .with_max_depth(config.graph.max_depth)
                .resolve(region, include_all)?;
            println!("{}", serde_json::to_string_pretty(&chain)?);
        }
        Some(("filter", sub)) => {
            let region = required_arg(sub, "region")?;
            let include_parents = !sub.get_flag("region-only");
            let filter = FilterBuilder::new(&graph)
                .with_max_depth(config.graph.max_depth)
                .build(region, include_parents)?;
            if sub.get_flag("sql") {
                let (clause, params) = filter.to_sql();
                println!("{}", clause);
                println!("params: {}", serde_json::to_string(&params)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&filter)?);
            }
        }
        Some(("enrich", sub)) => {
            let file = required_arg(sub, "file")?;
            enrich_file(&graph, &config, file)?;
        }
        _ => {
            return Err(JurisdictionError::Config {
                message: "no subcommand given; see --help".to_string(),
            });
        }
    }

    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let log_level: tracing::Level =
        config
            .logging
            .level
            .parse()
            .map_err(|_| JurisdictionError::Config {
                message: format!("invalid log level: {}", config.logging.level),
            })?;
    let filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    }
    Ok(())
}

fn required_arg<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| JurisdictionError::Config {
            message: format!("missing required argument '{}'", name),
        })
}

/// Enrich every JSONL record in `path`, one JSON document per output line
fn enrich_file(
    graph: &jurisdiction_search::RegionGraph,
    config: &Config,
    path: &str,
) -> Result<()> {
    let enricher = JurisdictionEnricher::new(
        graph,
        &config.detection,
        &config.general.default_region,
    );

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut processed = 0usize;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let document: LegalDocument = serde_json::from_str(&line)?;
        let enriched = enricher.enrich(document)?;
        println!("{}", serde_json::to_string(&enriched)?);
        processed += 1;
    }

    info!(processed, "document enrichment complete");
    Ok(())
}
