// Analysis configuration
//
// The original exploratory script existed as several near-identical copies
// that disagreed on metric names ("dev_time" vs "avg_dev_time") and on
// inlined thresholds. Everything a variant could disagree on lives here
// instead: one configuration, serializable to TOML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A pair of columns to regress (`y` against `x`).
///
/// When `y` names the boolean grouping column it is encoded as 0/1 for the
/// regression. The grouping column is not accepted as `x`; see
/// [`AnalysisConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionPair {
    pub x: String,
    pub y: String,
}

impl RegressionPair {
    pub fn new(x: &str, y: &str) -> Self {
        Self {
            x: x.to_string(),
            y: y.to_string(),
        }
    }
}

/// Configuration for the full analysis pass
///
/// # Example
/// ```
/// use pcgstat::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Boolean column partitioning projects into the two cohorts
    pub grouping_column: String,

    /// Metrics analyzed on every run
    pub metrics: Vec<String>,

    /// Metrics only analyzed when generated data is included
    pub generated_metrics: Vec<String>,

    /// Columns whose numeric text carries thousands separators ("1,234.50")
    pub thousands_separated_columns: Vec<String>,

    /// Column pairs for the regression pass
    pub regression_pairs: Vec<RegressionPair>,

    /// Statistical significance level (alpha) for hypothesis testing
    ///
    /// - p < alpha: statistically significant group difference
    /// - Shapiro-Wilk p >= alpha: metric treated as normally distributed
    ///
    /// Default 0.05 (95% confidence). The original script inlined this
    /// constant at every use site; it is a single knob here.
    pub significance_level: f64,

    /// |r| above this is reported as high correlation, at or below as low
    pub correlation_strength_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grouping_column: "pcg".to_string(),
            metrics: vec![
                "avg_dev_time".to_string(),
                "budget".to_string(),
                "profit".to_string(),
                "user_satisfaction".to_string(),
                "team_size".to_string(),
            ],
            generated_metrics: vec!["performance".to_string(), "innovation".to_string()],
            thousands_separated_columns: vec![
                "budget".to_string(),
                "revenue".to_string(),
                "profit".to_string(),
            ],
            regression_pairs: vec![
                RegressionPair::new("team_size", "budget"),
                RegressionPair::new("team_size", "avg_dev_time"),
                RegressionPair::new("team_size", "pcg"),
                RegressionPair::new("budget", "pcg"),
            ],
            significance_level: 0.05,
            correlation_strength_threshold: 0.5,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// The metric list for one run, with the generated-only metrics
    /// appended when requested
    pub fn active_metrics(&self, include_generated: bool) -> Vec<String> {
        let mut metrics = self.metrics.clone();
        if include_generated {
            metrics.extend(self.generated_metrics.iter().cloned());
        }
        metrics
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.grouping_column.is_empty() {
            return Err("grouping_column must not be empty".to_string());
        }

        if self.metrics.is_empty() {
            return Err("metrics must name at least one column".to_string());
        }

        if !(0.0..=1.0).contains(&self.significance_level) {
            return Err(format!(
                "significance_level must be in [0, 1], got {}",
                self.significance_level
            ));
        }

        if !(0.0..=1.0).contains(&self.correlation_strength_threshold) {
            return Err(format!(
                "correlation_strength_threshold must be in [0, 1], got {}",
                self.correlation_strength_threshold
            ));
        }

        if self.metrics.iter().any(|m| m == &self.grouping_column) {
            return Err(format!(
                "grouping column '{}' cannot also be a metric",
                self.grouping_column
            ));
        }

        // The boolean grouping column is only 0/1-encoded on the response
        // side of a regression
        for pair in &self.regression_pairs {
            if pair.x == self.grouping_column {
                return Err(format!(
                    "regression pair '{} vs {}': grouping column '{}' can only \
                     be the response (y), not the predictor (x)",
                    pair.x, pair.y, self.grouping_column
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.correlation_strength_threshold, 0.5);
        assert_eq!(config.grouping_column, "pcg");
        assert_eq!(config.metrics.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_active_metrics_excludes_generated_by_default() {
        let config = AnalysisConfig::default();
        let metrics = config.active_metrics(false);
        assert_eq!(metrics.len(), 5);
        assert!(!metrics.iter().any(|m| m == "performance"));
    }

    #[test]
    fn test_active_metrics_includes_generated_on_request() {
        let config = AnalysisConfig::default();
        let metrics = config.active_metrics(true);
        assert_eq!(metrics.len(), 7);
        assert!(metrics.iter().any(|m| m == "performance"));
        assert!(metrics.iter().any(|m| m == "innovation"));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_significance_level() {
        let mut config = AnalysisConfig::default();
        config.significance_level = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_grouping_column_cannot_be_metric() {
        let mut config = AnalysisConfig::default();
        config.metrics.push("pcg".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_grouping_column_cannot_be_regression_predictor() {
        let mut config = AnalysisConfig::default();
        config
            .regression_pairs
            .push(RegressionPair::new("pcg", "budget"));
        let err = config.validate().unwrap_err();
        assert!(err.contains("predictor"), "error was: {err}");

        // As the response it stays valid
        let config = AnalysisConfig::default();
        assert!(config
            .regression_pairs
            .iter()
            .any(|p| p.y == config.grouping_column));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalysisConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AnalysisConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.significance_level, config.significance_level);
        assert_eq!(parsed.metrics, config.metrics);
        assert_eq!(parsed.regression_pairs, config.regression_pairs);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AnalysisConfig = toml::from_str("significance_level = 0.01").unwrap();
        assert_eq!(parsed.significance_level, 0.01);
        assert_eq!(parsed.grouping_column, "pcg");
    }
}
