//! Chart rendering
//!
//! One PNG per (metric, chart kind) pair, written under the output
//! directory: per-group histograms in `distributions/`, annotated bar
//! charts in `bar_charts/`, regression scatters in `correlations/`.
//! Rendering failures (unwritable directory, backend errors) propagate as
//! fatal errors.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;

use crate::analysis::{MetricReport, Regression};
use crate::dataset::Dataset;
use crate::report::title_case;

const HISTOGRAM_SIZE: (u32, u32) = (1200, 600);
const CHART_SIZE: (u32, u32) = (800, 600);

/// Create the output directory tree up front
pub fn prepare_directories(out_dir: &Path) -> Result<()> {
    for sub in ["distributions", "bar_charts", "correlations"] {
        let dir = out_dir.join(sub);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }
    Ok(())
}

/// `<out>/distributions/<metric>.png`
pub fn histogram_path(out_dir: &Path, metric: &str) -> PathBuf {
    out_dir.join("distributions").join(format!("{metric}.png"))
}

/// `<out>/bar_charts/<metric>_bar_chart.png`
pub fn bar_chart_path(out_dir: &Path, metric: &str) -> PathBuf {
    out_dir
        .join("bar_charts")
        .join(format!("{metric}_bar_chart.png"))
}

/// `<out>/correlations/<x>_vs_<y>.png`
pub fn regression_path(out_dir: &Path, x: &str, y: &str) -> PathBuf {
    out_dir.join("correlations").join(format!("{x}_vs_{y}.png"))
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Sturges' rule; deterministic and sensible for the cohort sizes here
fn bin_count(n: usize) -> usize {
    ((n as f64).log2().ceil() as usize + 1).clamp(5, 30)
}

fn bin_counts(values: &[f64], lo: f64, width: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Overlaid per-group frequency histogram for one metric
pub fn render_histogram(dataset: &Dataset, metric: &str, path: &Path) -> Result<()> {
    let (pcg, non_pcg) = dataset.partitioned(metric)?;
    let all: Vec<f64> = pcg.iter().chain(&non_pcg).copied().collect();
    if all.is_empty() {
        return Err(anyhow!("metric '{metric}' has no observations to plot"));
    }

    let (lo, hi) = padded_range(&all);
    let bins = bin_count(all.len());
    let width = (hi - lo) / bins as f64;

    let pcg_counts = bin_counts(&pcg, lo, width, bins);
    let non_pcg_counts = bin_counts(&non_pcg, lo, width, bins);
    let y_max = pcg_counts
        .iter()
        .chain(&non_pcg_counts)
        .copied()
        .max()
        .unwrap_or(1) as f64;

    let title = title_case(metric);
    let root = BitMapBackend::new(path, HISTOGRAM_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Distribution of {title} by PCG Status"),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0.0..y_max * 1.15)
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    chart
        .configure_mesh()
        .x_desc(title.as_str())
        .y_desc("Frequency")
        .draw()
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    for (counts, color, name) in [
        (&pcg_counts, RED, "PCG"),
        (&non_pcg_counts, BLUE, "Non-PCG"),
    ] {
        let style = color.mix(0.4).filled();
        chart
            .draw_series(counts.iter().enumerate().filter(|(_, c)| **c > 0).map(
                |(i, &count)| {
                    let x0 = lo + width * i as f64;
                    Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], style)
                },
            ))
            .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?
            .label(name)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.mix(0.4).filled())
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "histogram rendered");
    Ok(())
}

/// Two-bar chart of the group central values, annotated with the test
/// statistic and p-value
pub fn render_bar_chart(report: &MetricReport, path: &Path) -> Result<()> {
    let title = title_case(&report.metric);
    // Bars rise (or fall) from a 0.0 baseline, so the y-range must always
    // include zero
    let values = [report.non_pcg_value, report.pcg_value];
    let top = values.iter().cloned().fold(0.0_f64, f64::max);
    let bottom = values.iter().cloned().fold(0.0_f64, f64::min);
    let head_room = if top == bottom { 1.0 } else { (top - bottom) * 0.25 };

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Bar Chart for {title}"), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..2.0, bottom..top + head_room)
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    chart
        .configure_mesh()
        .x_desc("Uses PCG")
        .y_desc(format!("{} {}", report.tendency.label(), title))
        .x_labels(2)
        .x_label_formatter(&|x| if *x < 1.0 { "False" } else { "True" }.to_string())
        .draw()
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    chart
        .draw_series([
            Rectangle::new([(0.2, 0.0), (0.8, report.non_pcg_value)], BLUE.filled()),
            Rectangle::new([(1.2, 0.0), (1.8, report.pcg_value)], RED.filled()),
        ])
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    let annotation = format!(
        "{} Stat: {:.5}, P-val: {:.5}",
        report.test.kind.label(),
        report.test.statistic,
        report.test.p_value
    );
    chart
        .draw_series(std::iter::once(Text::new(
            annotation,
            (0.3, top + head_room * 0.6),
            ("sans-serif", 16),
        )))
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "bar chart rendered");
    Ok(())
}

/// Scatter plot with the fitted least-squares line
pub fn render_regression(
    xs: &[f64],
    ys: &[f64],
    fit: &Regression,
    x_name: &str,
    y_name: &str,
    path: &Path,
) -> Result<()> {
    let (x_lo, x_hi) = padded_range(xs);
    let (y_lo, y_hi) = padded_range(ys);
    let title = format!("{} vs {}", title_case(x_name), title_case(y_name));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    chart
        .configure_mesh()
        .x_desc(title_case(x_name))
        .y_desc(title_case(y_name))
        .draw()
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    chart
        .draw_series(
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| Circle::new((x, y), 4, BLUE.filled())),
        )
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    chart
        .draw_series(LineSeries::new(
            [(x_lo, fit.predict(x_lo)), (x_hi, fit.predict(x_hi))],
            RED.stroke_width(2),
        ))
        .map_err(|e| anyhow!("failed to render {}: {e}", path.display()))?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "regression plot rendered");
    Ok(())
}
