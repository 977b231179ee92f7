#![forbid(unsafe_code)]

//! snil-graph CLI - compile SNIL dialogue scripts into control-flow graphs.
//!
//! # Commands
//!
//! - `parse`: Output the parse summary, or every section graph, as JSON
//! - `sections`: List sections with their node and edge counts
//! - `dialogues`: List `name:` declarations with their line numbers
//! - `config`: Print the effective node type configuration

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sg_core::NodeTypeConfig;
use sg_parser::{LineClassifier, extract_dialogues, parse_evidence_json, parse_with_classifier};
use tracing::{debug, info, warn};

/// snil-graph CLI - compile SNIL dialogue scripts into control-flow graphs.
#[derive(Debug, Parser)]
#[command(
    name = "snil-graph",
    version,
    about = "snil-graph CLI - compile SNIL dialogue scripts into control-flow graphs",
    long_about = "Splits a SNIL script into '---'-delimited sections and builds one\n\
        directed graph of typed statement nodes per section."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a script and output its graphs as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Node type configuration JSON. Built-in node types are used if omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Output every section graph (default is summary)
        #[arg(long)]
        full: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the sections of a script.
    Sections {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Node type configuration JSON. Built-in node types are used if omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List dialogue `name:` declarations and their lines.
    Dialogues {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective node type configuration as JSON.
    Config {
        /// Node type configuration JSON. Built-in node types are used if omitted.
        #[arg(short, long)]
        config: Option<String>,
    },
}

/// Per-section row of the `sections` command.
#[derive(Debug, Serialize)]
struct SectionSummary {
    name: String,
    node_count: usize,
    edge_count: usize,
    condition_count: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse {
            input,
            config,
            full,
            pretty,
        } => cmd_parse(&input, config.as_deref(), full, pretty),

        Command::Sections {
            input,
            config,
            json,
        } => cmd_sections(&input, config.as_deref(), json),

        Command::Dialogues { input, json } => cmd_dialogues(&input, json),

        Command::Config { config } => cmd_config(config.as_deref()),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline script text
        Ok(input.to_string())
    }
}

/// Read the node type configuration, falling back to the built-in node types
/// when the file is missing or cannot be decoded.
fn load_config(path: Option<&str>) -> NodeTypeConfig {
    let Some(path) = path else {
        return NodeTypeConfig::default();
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("Node type config not found at {path}; using built-in node types");
            return NodeTypeConfig::default();
        }
        Err(err) => {
            warn!("Failed to read node type config {path}: {err}; using built-in node types");
            return NodeTypeConfig::default();
        }
    };

    match NodeTypeConfig::from_json_str(&text) {
        Ok(config) => {
            info!(
                "Loaded {} node types from: {path}",
                config.node_types.len()
            );
            config
        }
        Err(err) => {
            warn!("{err} in {path}; using built-in node types");
            NodeTypeConfig::default()
        }
    }
}

fn load_classifier(path: Option<&str>) -> Result<LineClassifier> {
    let config = load_config(path);
    let classifier = LineClassifier::from_config(&config)
        .context("Failed to compile node type configuration")?;
    debug!(
        "Compiled {} node type rules (default: {})",
        classifier.rule_count(),
        classifier.default_type()
    );
    Ok(classifier)
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, config: Option<&str>, full: bool, pretty: bool) -> Result<()> {
    let source = load_input(input)?;
    let classifier = load_classifier(config)?;
    let parsed = parse_with_classifier(&source, &classifier);

    let output = if full {
        if pretty {
            serde_json::to_string_pretty(&parsed.sections)?
        } else {
            serde_json::to_string(&parsed.sections)?
        }
    } else if pretty {
        let value: serde_json::Value = serde_json::from_str(&parse_evidence_json(&parsed))?;
        serde_json::to_string_pretty(&value)?
    } else {
        parse_evidence_json(&parsed)
    };

    println!("{output}");

    for warning in &parsed.warnings {
        warn!("Parse warning: {warning}");
    }

    Ok(())
}

// =============================================================================
// Command: sections
// =============================================================================

fn cmd_sections(input: &str, config: Option<&str>, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let classifier = load_classifier(config)?;
    let parsed = parse_with_classifier(&source, &classifier);

    let summaries: Vec<SectionSummary> = parsed
        .sections
        .iter()
        .map(|section| SectionSummary {
            name: section.name.clone(),
            node_count: section.nodes.len(),
            edge_count: section.edges.len(),
            condition_count: section.condition_nodes().len(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No sections found");
    } else {
        for summary in &summaries {
            println!(
                "{}: {} nodes, {} edges, {} conditions",
                summary.name, summary.node_count, summary.edge_count, summary.condition_count
            );
        }
    }

    for warning in &parsed.warnings {
        warn!("Parse warning: {warning}");
    }

    Ok(())
}

// =============================================================================
// Command: dialogues
// =============================================================================

fn cmd_dialogues(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let entries = extract_dialogues(&source);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No dialogues found");
    } else {
        for entry in &entries {
            println!("{:>5}  {}", entry.line, entry.name);
        }
    }

    Ok(())
}

// =============================================================================
// Command: config
// =============================================================================

fn cmd_config(config: Option<&str>) -> Result<()> {
    let config = load_config(config);
    // Surface bad patterns here rather than at the next parse.
    LineClassifier::from_config(&config).context("Failed to compile node type configuration")?;
    println!("{}", config.to_json_pretty()?);
    Ok(())
}
