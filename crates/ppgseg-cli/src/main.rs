use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use plotters::prelude::*;
use ppgseg_lib::{
    config::ConfigFile,
    io::npy::load_segment,
    pipeline::{run_pipeline, write_summary},
    plot::{figure_from_segment, Figure, PlotBackend},
    scan::{scan_directory, SkippedFile},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "ppgseg",
    version,
    about = "ppgseg: global min-max normalization and fixed-length segmentation of PPG arrays"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where the raw arrays live; shared by `normalize` and `scan`.
#[derive(Args)]
struct DatasetArgs {
    /// TOML file with input_dir/output_dir/segment_length/extension
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory of raw 2-D arrays (column 0 = PPG)
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Input file extension
    #[arg(long)]
    extension: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute global PPG bounds, then write normalized fixed-length segments
    Normalize {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Destination for <stem>_seg<i>.npy files (created if missing)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Samples per segment [default: 1024]
        #[arg(long)]
        segment_length: Option<usize>,
        /// Also write the run summary JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Report global PPG bounds without writing anything
    Scan {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Render one segment file to a PNG line chart
    PlotSegment {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 1024)]
        max_points: usize,
    },
}

#[derive(Serialize)]
struct ScanOutput {
    min: Option<f64>,
    max: Option<f64>,
    sample_count: usize,
    degenerate: bool,
    files: Vec<PathBuf>,
    skipped: Vec<SkippedFile>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str()))
        .init();
    match cli.command {
        Commands::Normalize {
            dataset,
            output_dir,
            segment_length,
            summary,
        } => cmd_normalize(dataset, output_dir, segment_length, summary.as_deref())?,
        Commands::Scan { dataset } => cmd_scan(dataset)?,
        Commands::PlotSegment {
            input,
            out,
            max_points,
        } => cmd_plot_segment(&input, &out, max_points)?,
    }
    Ok(())
}

fn layered_config(dataset: DatasetArgs, overrides: ConfigFile) -> Result<ConfigFile> {
    let base = match dataset.config.as_deref() {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let flags = ConfigFile {
        input_dir: dataset.input_dir,
        extension: dataset.extension,
        ..overrides
    };
    Ok(base.merge(flags))
}

fn cmd_normalize(
    dataset: DatasetArgs,
    output_dir: Option<PathBuf>,
    segment_length: Option<usize>,
    summary_path: Option<&Path>,
) -> Result<()> {
    let overrides = ConfigFile {
        output_dir,
        segment_length,
        ..Default::default()
    };
    let config = layered_config(dataset, overrides)?.resolve()?;
    let summary = run_pipeline(&config)?;
    if let Some(path) = summary_path {
        write_summary(path, &summary)?;
        info!("summary written to {}", path.display());
    }
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_scan(dataset: DatasetArgs) -> Result<()> {
    let config = layered_config(dataset, ConfigFile::default())?;
    let input_dir = config.input_dir()?;
    let report = scan_directory(input_dir, config.extension())?;
    if let Some(ext) = report.extrema {
        info!("global PPG bounds: min={}, max={}", ext.min, ext.max);
    }
    let output = ScanOutput {
        min: report.extrema.map(|e| e.min),
        max: report.extrema.map(|e| e.max),
        sample_count: report.extrema.map_or(0, |e| e.sample_count),
        degenerate: report.extrema.map_or(false, |e| e.is_degenerate()),
        files: report.files,
        skipped: report.skipped,
    };
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn cmd_plot_segment(input: &Path, out: &Path, max_points: usize) -> Result<()> {
    let values = load_segment(input)?;
    let title = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "segment".into());
    let fig = figure_from_segment(&title, &values, max_points);
    PngBackend { path: out }.draw(&fig)?;
    info!("plot written to {}", out.display());
    Ok(())
}

struct PngBackend<'a> {
    path: &'a Path,
}

impl PlotBackend for PngBackend<'_> {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let root = BitMapBackend::new(self.path, (800, 480)).into_drawing_area();
        root.fill(&WHITE)?;
        let ([x_min, x_max], [y_min, y_max]) = fig.bounds();
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Segment".into()),
                ("sans-serif", 24),
            )
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        let mut mesh = chart.configure_mesh();
        if let Some(label) = &fig.x.label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &fig.y.label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw()?;
        for line in &fig.series {
            let (r, g, b) = line.style.color.rgb();
            chart.draw_series(LineSeries::new(
                line.points.iter().map(|p| (p[0], p[1])),
                &RGBColor(r, g, b),
            ))?;
        }
        root.present()
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
