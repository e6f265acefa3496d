mod adapters;
mod config;
mod core;
mod error;

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::{AbsentVerdictPolicy, CommitGate, DiffBackend, GatePaths, GateRun, ProjectType};
use crate::error::GateError;

#[derive(Parser)]
#[command(name = "checkcommit")]
#[command(about = "Reviews staged changes against a project checklist before committing", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(default_value = "dotnet", help = "Project type (dotnet, web, ...)")]
    project_type: String,

    #[arg(help = "Directory holding one checklist folder per project type")]
    root: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Repository whose staged changes are reviewed")]
    repo: PathBuf,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f64>,

    #[arg(long, value_enum, help = "What to do when the reviewer returns no verdict")]
    absent_verdict: Option<AbsentVerdictPolicy>,

    #[arg(long, value_enum)]
    diff_backend: Option<DiffBackend>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_console(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            println!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// One-time process setup, done before any other I/O.
fn init_console(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let project_type: ProjectType = cli.project_type.parse()?;
    let root = cli.root.unwrap_or_else(core::project::default_root);
    let paths = GatePaths::resolve(&root, &project_type);

    let mut config = config::Config::load(&paths)?;
    config.merge_with_cli(config::CliOverrides {
        model: cli.model,
        temperature: cli.temperature,
        absent_verdict: cli.absent_verdict,
        diff_backend: cli.diff_backend,
    });
    info!(
        "Checking staged changes for {} with checklist {}",
        project_type,
        paths.checklist.display()
    );

    let diff_source = core::create_diff_source(config.diff_backend, cli.repo);
    let gate = CommitGate::new(
        project_type.clone(),
        paths.clone(),
        config.marker.clone(),
        config.absent_verdict,
        diff_source.as_ref(),
    );

    let outcome = gate
        .run(|| adapters::llm::create_adapter(&config.model_config(config.resolve_api_key())))
        .await;

    match outcome {
        Ok(run) => {
            print_run(&project_type, &run);
            Ok(exit_status(run.result.exit_code()))
        }
        Err(err) => {
            print_gate_error(&err);
            Ok(1)
        }
    }
}

fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

fn print_run(project_type: &ProjectType, run: &GateRun) {
    if let Some(verdict) = &run.verdict {
        println!("\nResultados del checklist para {project_type}:\n");
        if let Some(text) = verdict.text().filter(|text| !text.trim().is_empty()) {
            println!("{text}");
        }
    }
    println!("\n{}", run.result.message());
}

fn print_gate_error(err: &GateError) {
    error!("{err}");
    match err {
        GateError::Configuration(message) => println!("⚠️  {message}"),
        GateError::HttpStatus { body, .. } => println!("{body}"),
        other => println!("❌ {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_default_to_dotnet() {
        let cli = Cli::try_parse_from(["checkcommit"]).unwrap();
        assert_eq!(cli.project_type, "dotnet");
        assert!(cli.root.is_none());
        assert_eq!(cli.repo, PathBuf::from("."));
        assert!(cli.absent_verdict.is_none());
    }

    #[test]
    fn positional_arguments_keep_their_order() {
        let cli = Cli::try_parse_from(["checkcommit", "web", "/srv/checkcommit"]).unwrap();
        assert_eq!(cli.project_type, "web");
        assert_eq!(cli.root, Some(PathBuf::from("/srv/checkcommit")));
    }

    #[test]
    fn policy_and_backend_flags_parse() {
        let cli = Cli::try_parse_from([
            "checkcommit",
            "--absent-verdict",
            "fail-closed",
            "--diff-backend",
            "libgit2",
            "--temperature",
            "0.1",
        ])
        .unwrap();
        assert_eq!(cli.absent_verdict, Some(AbsentVerdictPolicy::FailClosed));
        assert_eq!(cli.diff_backend, Some(DiffBackend::Libgit2));
        assert_eq!(cli.temperature, Some(0.1));
    }

    #[test]
    fn exit_status_maps_gate_codes() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(1), 1);
        assert_eq!(exit_status(-1), 1);
    }
}
