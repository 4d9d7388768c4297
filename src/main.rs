use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use pcgstat::{analysis, cli::Cli, config::AnalysisConfig, dataset::Dataset, plot, report};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Render one histogram per metric under `<out>/distributions/`
fn run_histogram_pass(dataset: &Dataset, metrics: &[String], out_dir: &Path) -> Result<()> {
    for metric in metrics {
        plot::render_histogram(dataset, metric, &plot::histogram_path(out_dir, metric))?;
    }
    Ok(())
}

/// Per-metric decision procedure: report to stdout, bar chart to disk
fn run_metric_pass(
    dataset: &Dataset,
    metrics: &[String],
    config: &AnalysisConfig,
    out_dir: Option<&Path>,
) -> Result<()> {
    print!("{}", report::banner("Statistics"));
    for metric in metrics {
        let metric_report = analysis::analyze_metric(dataset, metric, config)?;
        print!(
            "{}",
            report::metric_section(&metric_report, config.significance_level)
        );
        if let Some(out) = out_dir {
            plot::render_bar_chart(&metric_report, &plot::bar_chart_path(out, metric))?;
        }
    }
    Ok(())
}

/// Regression over each configured pair: report to stdout, scatter to disk
fn run_regression_pass(
    dataset: &Dataset,
    config: &AnalysisConfig,
    out_dir: Option<&Path>,
) -> Result<()> {
    if config.regression_pairs.is_empty() {
        return Ok(());
    }

    print!("{}", report::banner("Correlations"));
    for pair in &config.regression_pairs {
        let (xs, ys) = dataset.paired(&pair.x, &pair.y, &config.grouping_column)?;
        let fit = analysis::linear_regression(&xs, &ys)
            .with_context(|| format!("regression failed for {} vs {}", pair.x, pair.y))?;
        print!(
            "{}",
            report::regression_section(&pair.x, &pair.y, &fit, config.correlation_strength_threshold)
        );
        if let Some(out) = out_dir {
            plot::render_regression(
                &xs,
                &ys,
                &fit,
                &pair.x,
                &pair.y,
                &plot::regression_path(out, &pair.x, &pair.y),
            )?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(alpha) = args.alpha {
        if !(0.0..=1.0).contains(&alpha) {
            anyhow::bail!("Invalid value for --alpha: {alpha} (must be in [0, 1])");
        }
        config.significance_level = alpha;
    }

    let metrics = config.active_metrics(args.include_generated);
    let dataset = Dataset::load(&args.input, &config, args.include_generated)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    tracing::debug!(rows = dataset.n_rows(), metrics = metrics.len(), "analysis starting");

    let out_dir = if args.no_plots {
        None
    } else {
        Some(args.out_dir.as_path())
    };

    if let Some(out) = out_dir {
        plot::prepare_directories(out)?;
        run_histogram_pass(&dataset, &metrics, out)?;
    }

    run_metric_pass(&dataset, &metrics, &config, out_dir)?;
    run_regression_pass(&dataset, &config, out_dir)?;

    Ok(())
}
