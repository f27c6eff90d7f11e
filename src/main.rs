//! dcfc CLI - Design Concept Format checker
//!
//! Usage: dcfc validate [--profile P] <path>
//!
//! Exit code 0 when no error-severity diagnostics were produced.

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use anyhow::{bail, Result};
use clap::Parser;

use dcfc::cli::{Cli, Commands};
use dcfc::diagnostics::{DiagnosticReport, Severity};
use dcfc::loader::load_directory;
use dcfc::orchestrator::{Orchestrator, ResolutionConfig};
use dcfc::profile::Profile;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Validate { path, profile } => {
            let default_profile = match profile.as_deref() {
                None => Profile::default(),
                Some(p) => match Profile::parse(p) {
                    Some(parsed) => parsed,
                    None => bail!("unknown profile '{p}' (expected lite, standard, or strict)"),
                },
            };

            let documents = load_directory(&path)?;
            let mut orchestrator = Orchestrator::new(ResolutionConfig {
                default_profile,
                ..ResolutionConfig::default()
            });

            let outcome = orchestrator.validate(documents, &AtomicBool::new(false));
            let Some(run) = outcome.completed() else {
                bail!("validation run was cancelled");
            };

            print_report(&run.report, cli.json);
            Ok(run.is_success())
        }
    }
}

fn print_report(report: &DiagnosticReport, json: bool) {
    if json {
        for diagnostic in &report.diagnostics {
            if let Ok(line) = serde_json::to_string(diagnostic) {
                println!("{line}");
            }
        }
        return;
    }

    for diagnostic in &report.diagnostics {
        let marker = match diagnostic.severity {
            Severity::Error => "✗",
            Severity::Warning => "⚠",
            Severity::Info => "·",
        };
        println!(
            "{marker} [{}] {}: {}",
            diagnostic.rule_id, diagnostic.path, diagnostic.message
        );
    }

    for (component, coverage) in &report.variant_coverage {
        println!(
            "  {component}: {}/{} variant combinations valid ({:.0}%)",
            coverage.valid_combinations,
            coverage.total_combinations,
            coverage.coverage * 100.0
        );
    }

    println!(
        "{} error(s), {} warning(s)",
        report.errors(),
        report.warnings()
    );
}
