use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use phase_plots::output::{create_timestamped_output_dir, ensure_outdir, ReportOutput};
use phase_plots::reports::{self, ReportContext, ReportKind};
use phase_plots::{Dataset, Metric, PlotConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Phase-diagram figures from a parameter sweep results table")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Results table (.csv or .json); each report has its own default
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output root; each report writes into its own subdirectory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// TOML file overriding the built-in settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(long, global = true)]
    dpi: Option<u32>,

    /// Percolation threshold searched for on the smoothed curves
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Gaussian smoothing width in samples
    #[arg(long, global = true)]
    sigma: Option<f64>,

    /// Write under a fresh UTC-timestamped directory inside the output root
    #[arg(long, global = true, default_value_t = false)]
    timestamped: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Annotated heatmaps at fixed temptation and at fixed agent count
    PhaseDiagrams,
    /// Threshold crossings, density curves and temptation x density maps
    Thresholds,
    /// Grouped subplots, heatmap and 3D surface at the focus temptation
    Improved,
    /// Multi-temptation phase diagram sheets and defector-ratio traces
    Transitions,
    /// Heatmap and defector-ratio traces side by side
    Combined,
    /// Every report in turn
    All,
}

impl Command {
    fn reports(self) -> Vec<ReportKind> {
        match self {
            Command::PhaseDiagrams => vec![ReportKind::PhaseDiagrams],
            Command::Thresholds => vec![ReportKind::Thresholds],
            Command::Improved => vec![ReportKind::Improved],
            Command::Transitions => vec![ReportKind::Transitions],
            Command::Combined => vec![ReportKind::Combined],
            Command::All => ReportKind::ALL.to_vec(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => PlotConfig::from_toml_file(path)?,
        None => PlotConfig::default(),
    };
    if let Some(v) = cli.output.clone() {
        cfg.output_root = v;
    }
    if let Some(v) = cli.dpi {
        cfg.dpi = v;
    }
    if let Some(v) = cli.threshold {
        cfg.threshold = v;
    }
    if let Some(v) = cli.sigma {
        cfg.sigma = v;
    }
    cfg.validate()?;

    let root = if cli.timestamped {
        create_timestamped_output_dir(&cfg.output_root)?
    } else {
        ensure_outdir(&cfg.output_root)?;
        cfg.output_root.clone()
    };

    let mut tables: HashMap<PathBuf, Dataset> = HashMap::new();
    for kind in cli.command.reports() {
        let input = cli
            .input
            .clone()
            .unwrap_or_else(|| kind.default_input(&cfg).to_path_buf());
        let dataset = match tables.entry(input.clone()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(
                Dataset::load(&input)
                    .with_context(|| format!("failed to load {}", input.display()))?,
            ),
        };

        let ctx = ReportContext {
            dataset,
            config: &cfg,
            input: &input,
            output_root: &root,
        };
        let output = reports::run(kind, &ctx).with_context(|| format!("{kind} report failed"))?;
        print_summary(&output);
    }

    Ok(())
}

fn print_summary(output: &ReportOutput) {
    for metric in Metric::ALL {
        let rows: Vec<_> = output
            .thresholds
            .iter()
            .filter(|row| row.metric.parse::<Metric>() == Ok(metric))
            .collect();
        if rows.is_empty() {
            continue;
        }
        println!("\nThresholds for {}:", metric.title());
        for row in rows {
            println!(
                "Defector Ratio {:.1}: Density threshold at {:.2}",
                row.defector_ratio, row.density_threshold
            );
        }
    }

    println!(
        "\n{}: {} figures written, {} skipped",
        output.report,
        output.figures.len(),
        output.skipped.len()
    );
    println!("Figures saved to '{}'.", output.output_dir.display());
}
