//! End-to-end single-shot run: load, compute, export.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::RunConfig;
use crate::engine::{NettingContext, RunSummary, WorkerPool, run_batch};
use crate::error::RunError;
use crate::io::{export, load};
use crate::model::Dataset;
use crate::synthetic;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub annual_path: PathBuf,
    pub hourly_path: PathBuf,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Builds the dataset named by `cfg`: the synthetic generator when a
/// `[synthetic]` table is present, the input files otherwise.
///
/// # Errors
///
/// Returns `RunError::Load` for any unreadable or invalid input.
pub fn prepare_dataset(cfg: &RunConfig) -> Result<Dataset, RunError> {
    let scrub = cfg.scrub.policy().unwrap_or_default();
    let dataset = match &cfg.synthetic {
        Some(syn) => synthetic::generate(syn, cfg.run.hours, scrub)?,
        None => load::load_dataset(&cfg.inputs, cfg.run.hours, scrub)?,
    };
    Ok(dataset)
}

/// Runs one complete prioritization.
///
/// Output files are written only after every circuit group has been
/// computed, so a failed run leaves no result files behind.
///
/// # Errors
///
/// Returns the first configuration, load, engine, or export failure.
pub fn run(cfg: &RunConfig) -> Result<RunReport, RunError> {
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(RunError::Config(errors));
    }

    let started = Instant::now();
    let dataset = prepare_dataset(cfg)?;

    let peak_hour = cfg.run.peak_hour().unwrap_or_default();
    let ctx = NettingContext::new(&dataset.supply, &dataset.profiles, peak_hour)?;
    let pool = match cfg.run.workers {
        0 => WorkerPool::detect(),
        n => WorkerPool::new(n),
    }
    .with_progress_every(cfg.run.progress_every);

    let outcome = run_batch(&dataset.pool, &ctx, &pool)?;

    let (annual_path, hourly_path) = export::export_results(
        &outcome.results,
        &cfg.output.results,
        cfg.output.precision,
        cfg.run.hours,
    )?;

    let summary = RunSummary::from_results(&outcome.results, peak_hour, cfg.run.top_n);
    let elapsed = started.elapsed();
    info!(
        groups = summary.groups,
        workers = outcome.report.workers,
        elapsed_ms = elapsed.as_millis() as u64,
        "run complete"
    );

    Ok(RunReport {
        summary,
        annual_path,
        hourly_path,
        workers: outcome.report.workers,
        elapsed,
    })
}
