//! Splice CLI - pin and check the host routines the override layer targets.
//!
//! ```text
//! splice fingerprint <file>...   SHA-256 of routine body dumps, for pinning
//! splice verify [config]         check the config's dumps against their pins
//! splice targets                 list intercepted routines and built-in pins
//! ```
//!
//! A fingerprint mismatch is a warning, not a failure: `verify` exits 0 as
//! long as the configuration itself is usable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use splice_config::SpliceConfig;
use splice_core::{Verification, VerificationEntry, VerificationReport, fingerprint};
use splice_engine::PinTable;

#[derive(Debug, Parser)]
#[command(name = "splice")]
#[command(about = "Fingerprint and verify the host routines Splice overrides")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Print the SHA-256 of each routine body dump
    Fingerprint {
        /// Routine body dumps
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Verify routine dumps listed in the config (mismatches only warn)
    Verify {
        /// Config file; defaults to $SPLICE_CONFIG or ~/.splice/config.toml
        config: Option<PathBuf>,
    },
    /// List intercepted routines and their built-in pins
    Targets,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries results; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(env_filter)
        .init();
}

fn fingerprint_files(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let body = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        if body.is_empty() {
            tracing::warn!("{} is empty; its fingerprint cannot be pinned", path.display());
        }
        println!("{}  {}", fingerprint(&body), path.display());
    }
    Ok(())
}

fn verify(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => splice_config::config_path().context("no home directory to find the config in")?,
    };
    let config = SpliceConfig::load_from(&path)?;
    if config.fingerprints.is_empty() {
        tracing::warn!("{} lists no [[fingerprints]]; nothing to verify", path.display());
        return Ok(());
    }

    let pins = PinTable::builtin();
    let registry = config.fingerprint_registry_with(|name| pins.expected(name.as_str()))?;
    let report = registry.verify_all();
    for entry in report.entries() {
        println!("{}", describe(entry));
    }
    println!("{}", summary(&report));
    Ok(())
}

fn list_targets() {
    for (name, pin) in PinTable::builtin().iter() {
        let pin = if pin.is_pinned() { pin.as_str() } else { "(not pinned)" };
        println!("{name}  {pin}");
    }
}

fn describe(entry: &VerificationEntry) -> String {
    let name = &entry.name;
    match &entry.verification {
        Verification::Match { actual } => format!("ok          {name}  {actual}"),
        Verification::Unpinned { actual } => format!("unpinned    {name}  {actual}"),
        Verification::Mismatch { expected, actual } => {
            format!("MISMATCH    {name}  expected {expected}, got {actual}")
        }
        Verification::Unverifiable(reason) => format!("skipped     {name}  ({reason})"),
    }
}

fn summary(report: &VerificationReport) -> String {
    let mismatches = report.mismatches().count();
    let skipped = report.unverifiable().count();
    let total = report.entries().len();
    match report.first_mismatch_digest() {
        Some(first) => format!(
            "{total} checked, {mismatches} mismatched, {skipped} skipped (first mismatch: {first})"
        ),
        None => format!("{total} checked, {mismatches} mismatched, {skipped} skipped"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Fingerprint { files } => fingerprint_files(&files),
        Commands::Verify { config } => verify(config.as_deref()),
        Commands::Targets => {
            list_targets();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::iter;
    use std::path::PathBuf;
    use std::sync::Arc;

    use clap::{CommandFactory, Parser};
    use splice_core::{FingerprintRecord, TargetRoutine, verify_all};
    use splice_types::RoutineName;

    use super::{Cli, Commands, describe, summary};

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        Cli::try_parse_from(iter::once("splice").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse(&["targets"]).unwrap(), Commands::Targets);
        assert_eq!(parse(&["verify"]).unwrap(), Commands::Verify { config: None });
        assert_eq!(
            parse(&["verify", "splice.toml"]).unwrap(),
            Commands::Verify {
                config: Some(PathBuf::from("splice.toml"))
            }
        );
        assert_eq!(
            parse(&["fingerprint", "a.il", "b.il"]).unwrap(),
            Commands::Fingerprint {
                files: vec![PathBuf::from("a.il"), PathBuf::from("b.il")]
            }
        );
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["fingerprint"]).is_err());
        assert!(parse(&["verify", "a", "b"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn report_lines_name_the_routine() {
        let name = RoutineName::new("Host.Routine()").unwrap();
        let body: &'static [u8] = b"abc";
        let records = vec![FingerprintRecord::new(
            TargetRoutine::resolved(name, Arc::new(body)),
            "XYZ999",
        )];
        let report = verify_all(&records);

        let line = describe(&report.entries()[0]);
        assert!(line.starts_with("MISMATCH"));
        assert!(line.contains("Host.Routine()"));
        assert!(line.contains("expected XYZ999"));
        assert!(summary(&report).starts_with("1 checked, 1 mismatched, 0 skipped"));
    }
}
