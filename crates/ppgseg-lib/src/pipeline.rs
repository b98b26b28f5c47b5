use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::io::list_arrays;
use crate::scan::{scan_files, SkippedFile};
use crate::segment::{segment_files, Normalizer, SegmentedFile};
use crate::signal::Extrema;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub extrema: Extrema,
    pub segment_length: usize,
    pub files_processed: usize,
    pub segments_written: usize,
    pub files: Vec<SegmentedFile>,
    pub skipped: Vec<SkippedFile>,
}

/// Run both passes: global bounds first, then segmentation.
///
/// Nothing is created under `output_dir` unless the bounds are known and
/// non-degenerate.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let files = list_arrays(&config.input_dir, &config.extension)?;
    info!(
        "found {} candidate file(s) in {}",
        files.len(),
        config.input_dir.display()
    );

    let scan = scan_files(&files)?;
    let extrema = scan.require_extrema(&config.input_dir)?;
    info!(
        "global PPG bounds: min={}, max={} over {} samples",
        extrema.min, extrema.max, extrema.sample_count
    );
    // reject a zero or overflowing range before the output directory exists
    Normalizer::new(&extrema)?;

    fs::create_dir_all(&config.output_dir).map_err(|source| PipelineError::OutputDirCreate {
        path: config.output_dir.clone(),
        source,
    })?;

    let (written, skipped) = segment_files(
        &files,
        &extrema,
        config.segment_length,
        &config.output_dir,
    )?;
    let segments_written = written.iter().map(|f| f.segments).sum();
    info!(
        "done: {} segment(s) from {} file(s) written to {}, {} file(s) skipped",
        segments_written,
        written.len(),
        config.output_dir.display(),
        skipped.len()
    );
    Ok(RunSummary {
        extrema,
        segment_length: config.segment_length,
        files_processed: written.len(),
        segments_written,
        files: written,
        skipped,
    })
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("creating summary {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

pub fn read_summary(path: &Path) -> Result<RunSummary> {
    let file =
        fs::File::open(path).with_context(|| format!("opening summary {}", path.display()))?;
    let summary = serde_json::from_reader::<_, RunSummary>(file)
        .with_context(|| format!("parsing summary {}", path.display()))?;
    Ok(summary)
}
