use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

use designtrace_core::{Artifact, ArtifactKind, Config, Severity};
use designtrace_engine::{Analyzer, FkEdge, TableFacts};
use designtrace_graph::DependencyGraph;

/// DesignTrace - consistency checks for design-as-code artifacts
#[derive(Parser)]
#[command(name = "designtrace")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: designtrace.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full consistency analysis over an artifact directory
    Check {
        /// Directory of design artifacts to scan
        dir: PathBuf,

        /// JSON file of extracted schema facts (table name -> facts)
        #[arg(long)]
        facts: Option<PathBuf>,

        /// JSON file of foreign-key triples
        #[arg(long)]
        deps: Option<PathBuf>,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
    },

    /// Resolve the table creation/population order from foreign keys
    Order {
        /// JSON file of foreign-key triples
        #[arg(long)]
        deps: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("designtrace.toml").exists() {
        Config::from_file(Path::new("designtrace.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Check {
            dir,
            facts,
            deps,
            output,
        } => check_command(config, &dir, facts.as_deref(), deps.as_deref(), &output, cli.verbose),
        Commands::Order { deps } => order_command(&deps),
    }
}

fn check_command(
    config: Config,
    dir: &Path,
    facts: Option<&Path>,
    deps: Option<&Path>,
    output: &Path,
    verbose: bool,
) -> Result<ExitCode> {
    let artifacts = load_artifacts(dir, verbose)?;
    if verbose {
        eprintln!("{} {} artifacts from {}", "Loaded".cyan(), artifacts.len(), dir.display());
    }

    let tables: BTreeMap<String, TableFacts> = match facts {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading schema facts from {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("parsing schema facts from {}", path.display()))?
        }
        None => BTreeMap::new(),
    };

    let fk_edges: Vec<FkEdge> = match deps {
        Some(path) => load_edges(path)?,
        None => Vec::new(),
    };

    let outcome = Analyzer::new(config).analyze(&artifacts, &tables, &fk_edges);
    let report = &outcome.report;

    report
        .save_to_file(output)
        .with_context(|| format!("writing report to {}", output.display()))?;

    for issue in &report.issues {
        let severity = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warn => "warn".yellow().bold(),
            Severity::Info => "info".cyan(),
        };
        let location = issue
            .location
            .as_ref()
            .map(|l| match l.line {
                Some(line) => format!(" ({}:{line})", l.file),
                None => format!(" ({})", l.file),
            })
            .unwrap_or_default();
        eprintln!("{severity} [{}] {}{location}", issue.code, issue.message);
    }

    eprintln!(
        "{} {} errors, {} warnings, {} info ({} artifacts, {} tables)",
        "Summary:".bold(),
        report.summary.errors,
        report.summary.warnings,
        report.summary.info,
        report.summary.artifacts_scanned,
        report.summary.tables_checked,
    );

    match &outcome.table_order {
        Ok(order) if verbose => {
            eprintln!("{} {}", "Table order:".cyan(), order.join(", "));
        }
        Err(cycle) => {
            eprintln!("{} {cycle}", "Ordering failed:".red().bold());
        }
        _ => {}
    }

    if report.is_valid() && outcome.table_order.is_ok() {
        eprintln!("{}", "OK".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn order_command(deps: &Path) -> Result<ExitCode> {
    let fk_edges = load_edges(deps)?;

    let mut graph = DependencyGraph::new();
    for edge in &fk_edges {
        if edge.is_self {
            graph.add_edge(edge.table.clone(), edge.table.clone());
        } else {
            graph.add_edge(edge.table.clone(), edge.references.clone());
        }
    }

    match graph.topological_order() {
        Ok(order) => {
            for table in order {
                println!("{table}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(cycle) => {
            eprintln!("{} {cycle}", "error:".red().bold());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_edges(path: &Path) -> Result<Vec<FkEdge>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading foreign-key triples from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("parsing foreign-key triples from {}", path.display()))
}

/// Walk the artifact directory and load every recognized file
///
/// An unreadable file is skipped with a warning; one bad artifact never
/// aborts the scan.
fn load_artifacts(dir: &Path, verbose: bool) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(kind) = classify(path) else {
            continue;
        };

        match std::fs::read_to_string(path) {
            Ok(text) => {
                artifacts.push(Artifact::new(path.display().to_string(), kind, text));
            }
            Err(err) => {
                if verbose {
                    eprintln!(
                        "{} skipping unreadable artifact {}: {err}",
                        "warn:".yellow(),
                        path.display()
                    );
                }
            }
        }
    }

    Ok(artifacts)
}

/// Classify an artifact by its path
///
/// API and screen specs live under directories named `api`/`screens`;
/// everything else with a recognized extension is a database artifact.
fn classify(path: &Path) -> Option<ArtifactKind> {
    let ext = path.extension()?.to_str()?;
    if !matches!(ext, "yaml" | "yml" | "sql" | "md") {
        return None;
    }

    let has_component = |name: &str| {
        path.components()
            .any(|c| c.as_os_str().to_str() == Some(name))
    };

    if has_component("api") {
        Some(ArtifactKind::Api)
    } else if has_component("screens") || has_component("screen") {
        Some(ArtifactKind::Screen)
    } else {
        Some(ArtifactKind::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_path() {
        assert_eq!(
            classify(Path::new("docs/api/users.md")),
            Some(ArtifactKind::Api)
        );
        assert_eq!(
            classify(Path::new("docs/screens/login.md")),
            Some(ArtifactKind::Screen)
        );
        assert_eq!(
            classify(Path::new("tables/users.yaml")),
            Some(ArtifactKind::Database)
        );
        assert_eq!(classify(Path::new("tables/users.png")), None);
        assert_eq!(classify(Path::new("README")), None);
    }
}
