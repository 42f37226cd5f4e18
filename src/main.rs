use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

use release_dedup::config::DedupConfig;
use release_dedup::store::snapshot;
use release_dedup::{engine, report, telemetry};

/// Deduplicate and normalize release records
///
/// Scans a release-table snapshot for duplicate (organization, version)
/// pairs and resolves each group: duplicates that are evidently the same
/// deploy are merged into one canonical record; the rest are renamed
/// apart by qualifying each version with a project slug.
///
/// The audit report (CSV, one row per affected release) goes to stdout;
/// diagnostics go to stderr. In live mode the mutated snapshot is
/// written back in place.
///
/// EXAMPLES:
///
///   # Preview what a run would do
///   release-dedup --dry-run releases.json
///
///   # Apply, keeping the audit trail
///   release-dedup releases.json > audit.csv
#[derive(Parser)]
#[command(name = "release-dedup")]
#[command(version, about)]
struct Cli {
    /// Path to the JSON snapshot of the release tables
    snapshot: PathBuf,

    /// Compute and report every decision without mutating the snapshot
    #[arg(long)]
    dry_run: bool,

    /// Optional TOML file overriding the decision thresholds
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();

    // Failures surface here and nowhere else: this tool repairs the
    // monitoring platform's own data, so it must never report errors back
    // into that platform.
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "release-dedup: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = DedupConfig::load(cli.config.as_deref())?;

    let mut store = snapshot::load(&cli.snapshot)
        .with_context(|| format!("loading snapshot {}", cli.snapshot.display()))?;

    // Rows stream to stdout as each group is applied, so a mid-run
    // failure still leaves a truncated-but-faithful report behind.
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_header(&mut out).context("writing audit report")?;

    let outcome = engine::run(&mut store, &config, cli.dry_run, |row| {
        report::write_row(&mut out, row).map_err(release_dedup::error::DedupError::Report)
    });
    out.flush().context("writing audit report")?;
    drop(out);

    // Persist even after an aborted run: groups processed before the
    // failure were already applied and must not be lost.
    if !cli.dry_run {
        snapshot::save(&store, &cli.snapshot)
            .with_context(|| format!("saving snapshot {}", cli.snapshot.display()))?;
    }
    let outcome = outcome?;

    info!(
        scanned = outcome.scanned,
        merged = outcome.merged,
        renamed = outcome.renamed,
        deleted = outcome.deleted,
        dry_run = cli.dry_run,
        "deduplication pass complete"
    );
    Ok(())
}
