//! Component Layout CLI
//!
//! Usage:
//!   component-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -r, --root <ID>        Component to solve (default: the first one)
//!   -c, --config <FILE>    Layout configuration file (TOML format)
//!   --width <W>            Viewport width
//!   --height <H>           Viewport height
//!   -d, --debug            Print the solved tree indented by depth
//!   -v, --verbose          Log solve passes at debug level
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use component_layout::{format_tree, solve_document, Document, LayoutConfig, NodeId};

#[derive(Parser)]
#[command(name = "component-layout")]
#[command(about = "Solve constraint-based UI layouts with component references")]
struct Cli {
    /// Input document (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Id of the component to solve
    #[arg(short, long)]
    root: Option<String>,

    /// Layout configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Viewport width, overriding the configuration
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height, overriding the configuration
    #[arg(long)]
    height: Option<f64>,

    /// Print the solved tree indented by depth
    #[arg(short, long)]
    debug: bool,

    /// Log solve passes at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match LayoutConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => LayoutConfig::default(),
    };
    let (width, height) = config.viewport_size;
    config = config.with_viewport_size(cli.width.unwrap_or(width), cli.height.unwrap_or(height));

    let root = match cli.root.as_deref().map(NodeId::parse).transpose() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: invalid --root: {}", e);
            std::process::exit(1);
        }
    };

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let document = match Document::from_toml_str(&source) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
    };

    let outcome = match solve_document(&document, root.as_ref(), &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for id in &outcome.order {
        let node_type = outcome
            .tree
            .find(id)
            .map(|n| n.node_type.as_str())
            .unwrap_or("?");
        match outcome.rect(id) {
            Some(r) => println!(
                "{} {} x={:.1} y={:.1} w={:.1} h={:.1}",
                id, node_type, r.x, r.y, r.width, r.height
            ),
            None => println!("{} {} <unresolved>", id, node_type),
        }
    }

    if cli.debug {
        eprintln!("=== Layout Debug ===");
        eprint!("{}", format_tree(&outcome));
        eprintln!("====================");
    }

    for diagnostic in &outcome.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
