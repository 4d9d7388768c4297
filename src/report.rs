//! Console report rendering
//!
//! Pure formatting: fixed decimal precision, one block per metric or
//! regression pair, section banners. Output is unstructured text for a
//! human reader; there is deliberately no machine-readable format.

use crate::analysis::{MetricReport, Regression};

/// "avg_dev_time" -> "Avg Dev Time", used in headings and chart captions
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Section banner: title over a 100-dash rule
pub fn banner(title: &str) -> String {
    format!("\n{title}\n{}\n", "-".repeat(100))
}

/// Render one metric's normality test, group comparison, and verdict
pub fn metric_section(report: &MetricReport, alpha: f64) -> String {
    let title = title_case(&report.metric);
    let mut out = String::new();

    out.push_str(&format!("{title} Results:\n"));
    out.push_str(&format!("Normality Test for {title}:\n"));
    out.push_str(&format!(
        "  - Shapiro-Wilk Test Statistic: {:.5}\n",
        report.normality.statistic
    ));
    out.push_str(&format!("  - P-Value: {:.5}\n", report.normality.p_value));
    let normality_status = if report.is_normal {
        "Data is Normally Distributed"
    } else {
        "Data is Not Normally Distributed"
    };
    out.push_str(&format!("  - Conclusion: {normality_status}\n\n"));

    out.push_str(&format!("  - {} Values:\n", report.tendency.label()));
    out.push_str(&format!("    - PCG: {:.2}\n", report.pcg_value));
    out.push_str(&format!("    - Non-PCG: {:.2}\n", report.non_pcg_value));
    out.push_str(&format!("  - Statistical Test: {}\n", report.test.kind.label()));
    out.push_str(&format!(
        "    - Test Statistic: {:.5}\n",
        report.test.statistic
    ));
    out.push_str(&format!("    - P-value: {:.5}\n", report.test.p_value));
    out.push_str(&format!(
        "    - Significance Level: {alpha}\n"
    ));
    let verdict = if report.significant {
        "Statistically Significant"
    } else {
        "Not Statistically Significant"
    };
    out.push_str(&format!("  - Conclusion: {verdict}\n\n"));

    out
}

/// Render one regression pair's fit and its interpretation labels
pub fn regression_section(x: &str, y: &str, fit: &Regression, strength_threshold: f64) -> String {
    let title = format!("{} vs {}", title_case(x), title_case(y));
    let mut out = String::new();

    out.push_str(&format!("{title} Correlation Results:\n"));
    out.push_str(&format!("  - Slope: {:.2}\n", fit.slope));
    out.push_str(&format!("  - Intercept: {:.2}\n", fit.intercept));
    out.push_str(&format!("  - R: {}\n", fit.r));
    out.push_str(&format!("  - R-squared: {:.2}\n", fit.r_squared()));
    out.push_str(&format!("  - P-value: {:.5}\n", fit.p_value));
    out.push_str(&format!(
        "  - Nature: {} Correlation\n",
        fit.direction().label()
    ));
    out.push_str(&format!(
        "  - Strength: {}\n\n",
        fit.strength(strength_threshold).label()
    ));

    out
}
