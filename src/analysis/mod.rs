// Statistical decision procedure: normality test, test selection,
// significance and effect interpretation.
//
// The procedure per metric is fixed:
// - Shapiro-Wilk on the pooled non-missing observations
// - p >= alpha: metric is treated as normal, compare cohorts with a
//   pooled-variance Student t-test and report group means
// - p < alpha: compare with a two-sided Mann-Whitney U test and report
//   group medians
// - either way, the difference is significant iff the test p-value < alpha
//
// All tail probabilities come from statrs distributions; the test
// statistics themselves are computed here since no crates.io crate covers
// Shapiro-Wilk or Mann-Whitney.

pub mod hypothesis;
pub mod normality;
pub mod regression;

pub use hypothesis::{compare_groups, mann_whitney_u, student_t_test, GroupTest, TestKind};
pub use normality::{shapiro_wilk, NormalityTest};
pub use regression::{linear_regression, Direction, Regression, Strength};

use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;

/// Errors from the statistical routines
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("sample has zero range: {0}")]
    ZeroRange(&'static str),
}

/// Normality decision rule: p >= alpha classifies as normal
pub fn classify_normal(p_value: f64, alpha: f64) -> bool {
    p_value >= alpha
}

/// Significance policy, applied uniformly to every test kind
pub fn is_significant(p_value: f64, alpha: f64) -> bool {
    p_value < alpha
}

/// Mean of a slice (no missing-value handling; callers filter first)
pub(crate) fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Sample variance (ddof = 1)
pub(crate) fn var_sample(xs: &[f64], mean: f64) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let ss: f64 = xs.iter().map(|&v| (v - mean) * (v - mean)).sum();
    ss / ((n - 1) as f64)
}

pub(crate) fn median(xs: &[f64]) -> f64 {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Which central-tendency summary a metric gets
///
/// Tied to the test selection: the parametric t-test reports means, the
/// rank-based Mann-Whitney reports medians. Constructed from the same
/// normality decision as the test so the two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralTendency {
    Mean,
    Median,
}

impl CentralTendency {
    pub fn for_normality(is_normal: bool) -> Self {
        if is_normal {
            Self::Mean
        } else {
            Self::Median
        }
    }

    /// Label used in reports and chart annotations
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mean => "Average",
            Self::Median => "Median",
        }
    }

    pub fn compute(&self, xs: &[f64]) -> f64 {
        match self {
            Self::Mean => mean(xs),
            Self::Median => median(xs),
        }
    }
}

/// Everything the reporter and plotter need about one metric
#[derive(Debug, Clone)]
pub struct MetricReport {
    pub metric: String,
    pub normality: NormalityTest,
    pub is_normal: bool,
    pub test: GroupTest,
    pub tendency: CentralTendency,
    /// Central value of the PCG cohort
    pub pcg_value: f64,
    /// Central value of the non-PCG cohort
    pub non_pcg_value: f64,
    pub significant: bool,
}

/// Run the full decision procedure for one metric
///
/// Missing values are excluded for this metric only; other metrics see the
/// full table.
pub fn analyze_metric(
    dataset: &Dataset,
    metric: &str,
    config: &AnalysisConfig,
) -> anyhow::Result<MetricReport> {
    use anyhow::Context;

    let alpha = config.significance_level;

    let observations = dataset.observations(metric)?;
    let normality = shapiro_wilk(&observations)
        .with_context(|| format!("normality test failed for metric '{metric}'"))?;
    let is_normal = classify_normal(normality.p_value, alpha);

    let (pcg, non_pcg) = dataset.partitioned(metric)?;
    let test = compare_groups(&pcg, &non_pcg, is_normal)
        .with_context(|| format!("group comparison failed for metric '{metric}'"))?;

    let tendency = CentralTendency::for_normality(is_normal);
    let significant = is_significant(test.p_value, alpha);

    tracing::debug!(
        metric,
        test = test.kind.label(),
        p_value = test.p_value,
        significant,
        "metric analyzed"
    );

    Ok(MetricReport {
        metric: metric.to_string(),
        normality,
        is_normal,
        test,
        tendency,
        pcg_value: tendency.compute(&pcg),
        non_pcg_value: tendency.compute(&non_pcg),
        significant,
    })
}
