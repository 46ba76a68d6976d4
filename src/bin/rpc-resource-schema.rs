//! RPC Resource Schema CLI
//!
//! Command-line driver: loads a method catalogue and prints the inferred
//! resource descriptors, coverage gaps, or a single resource.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rpc_resource_schema::{
    assemble, find_latest_catalogue, load_catalogue_auto, AssemblerConfig, Catalogue,
    GenerationPlan, DEFAULT_CATALOGUE_PREFIX,
};

#[derive(Parser)]
#[command(name = "rpc-resource-schema")]
#[command(about = "Infer resource descriptors from a remote API method catalogue")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Catalogue source: file path or URL (default: newest catalogue in --dir)
    catalogue: Option<String>,

    /// Directory searched when no catalogue is given
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// File name prefix of catalogues in --dir
    #[arg(long, default_value = DEFAULT_CATALOGUE_PREFIX)]
    prefix: String,

    /// Assembler config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exclude a resource base (repeatable)
    #[arg(long = "skip-resource", value_name = "BASE")]
    skip_resources: Vec<String>,

    /// Exclude an action method (repeatable)
    #[arg(long = "skip-action", value_name = "METHOD")]
    skip_actions: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble every descriptor and print the generation plan as JSON
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List catalogue methods not consumed by any descriptor
    Coverage {
        #[command(flatten)]
        source: SourceArgs,

        /// Also list skipped groups with their reason
        #[arg(long)]
        skipped: bool,
    },

    /// Print the descriptor of one resource
    Inspect {
        /// Resource name or method base (e.g. pool_dataset or pool.dataset)
        resource: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            source,
            output,
            pretty,
        } => run_generate(&source, output, pretty),
        Commands::Coverage { source, skipped } => run_coverage(&source, skipped),
        Commands::Inspect {
            resource,
            source,
            pretty,
        } => run_inspect(&resource, &source, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(source: &SourceArgs, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let plan = load_plan(source)?;
    let json_output = to_json(&plan, pretty)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_coverage(source: &SourceArgs, skipped: bool) -> Result<(), u8> {
    let plan = load_plan(source)?;

    println!("Not generating the following API methods:");
    for name in &plan.diagnostics.unconsumed {
        println!("{}", name);
    }

    if skipped && !plan.diagnostics.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for group in &plan.diagnostics.skipped {
            let reason = serde_json::to_value(group.reason)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default();
            println!("  {} ({})", group.name, reason);
        }
    }

    Ok(())
}

fn run_inspect(resource: &str, source: &SourceArgs, pretty: bool) -> Result<(), u8> {
    let plan = load_plan(source)?;

    let Some(descriptor) = plan.resource(resource) else {
        eprintln!("Error: no resource named {}", resource);
        return Err(1);
    };

    println!("{}", to_json(descriptor, pretty)?);
    Ok(())
}

fn load_plan(source: &SourceArgs) -> Result<GenerationPlan, u8> {
    let config = load_config(source)?;
    let catalogue = load_source(source)?;
    Ok(assemble(&catalogue, &config))
}

fn load_config(source: &SourceArgs) -> Result<AssemblerConfig, u8> {
    let mut config = match &source.config {
        Some(path) => AssemblerConfig::load(path).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?,
        None => AssemblerConfig::default(),
    };
    config.skip_resources.extend(source.skip_resources.iter().cloned());
    config.skip_actions.extend(source.skip_actions.iter().cloned());
    Ok(config)
}

fn load_source(source: &SourceArgs) -> Result<Catalogue, u8> {
    let location = match &source.catalogue {
        Some(location) => location.clone(),
        None => latest_in(&source.dir, &source.prefix)?,
    };

    load_catalogue_auto(&location).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn latest_in(dir: &Path, prefix: &str) -> Result<String, u8> {
    let path = find_latest_catalogue(dir, prefix).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    eprintln!("Using: {}", path.display());
    Ok(path.to_string_lossy().into_owned())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}
