//! Shapiro-Wilk normality test
//!
//! Statistic and p-value per Royston's AS R94 approximation (Applied
//! Statistics 44, 1995), the same algorithm behind the common scientific
//! stacks. Order-statistic quantiles and the tail probability come from the
//! statrs standard normal.
//!
//! Valid for 3 <= n <= ~5000; below 3 the test is undefined and callers get
//! `InsufficientData` rather than a silent skip.

use statrs::distribution::{ContinuousCDF, Normal};

use super::StatsError;

/// Result of the Shapiro-Wilk test
#[derive(Debug, Clone, Copy)]
pub struct NormalityTest {
    /// W statistic, in (0, 1]; values near 1 indicate normality
    pub statistic: f64,
    /// Probability of a W this small under the normality hypothesis
    pub p_value: f64,
}

// Royston 1992 polynomial corrections for the two largest weights,
// evaluated in u = n^(-1/2)
const C1: [f64; 5] = [0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 5] = [0.042981, -0.293762, -1.752461, 5.682633, -3.582633];

fn poly(coeffs: &[f64; 5], u: f64) -> f64 {
    let mut acc = 0.0;
    let mut power = u;
    for c in coeffs {
        acc += c * power;
        power *= u;
    }
    acc
}

/// Run the Shapiro-Wilk test on a sample with missing values already
/// excluded
///
/// # Errors
/// - `InsufficientData` for fewer than 3 observations
/// - `ZeroRange` when every observation is identical (W is undefined)
pub fn shapiro_wilk(xs: &[f64]) -> Result<NormalityTest, StatsError> {
    let n = xs.len();
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }

    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    if sorted[n - 1] - sorted[0] == 0.0 {
        return Err(StatsError::ZeroRange("all observations are identical"));
    }

    let standard_normal = Normal::new(0.0, 1.0).unwrap();

    // Expected normal order statistics (Blom scores)
    let m: Vec<f64> = (0..n)
        .map(|i| standard_normal.inverse_cdf((i as f64 + 1.0 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let ssq_m: f64 = m.iter().map(|v| v * v).sum();

    let mut weights = vec![0.0; n];
    if n == 3 {
        weights[0] = -std::f64::consts::FRAC_1_SQRT_2;
        weights[2] = std::f64::consts::FRAC_1_SQRT_2;
    } else {
        let u = 1.0 / (n as f64).sqrt();
        let norm_m = ssq_m.sqrt();
        weights[n - 1] = poly(&C1, u) + m[n - 1] / norm_m;

        let phi = if n > 5 {
            weights[n - 2] = poly(&C2, u) + m[n - 2] / norm_m;
            (ssq_m - 2.0 * m[n - 1] * m[n - 1] - 2.0 * m[n - 2] * m[n - 2])
                / (1.0 - 2.0 * weights[n - 1] * weights[n - 1]
                    - 2.0 * weights[n - 2] * weights[n - 2])
        } else {
            (ssq_m - 2.0 * m[n - 1] * m[n - 1])
                / (1.0 - 2.0 * weights[n - 1] * weights[n - 1])
        };

        let lower = if n > 5 { 2 } else { 1 };
        let sqrt_phi = phi.sqrt();
        for i in lower..(n - lower) {
            weights[i] = m[i] / sqrt_phi;
        }
        weights[0] = -weights[n - 1];
        if n > 5 {
            weights[1] = -weights[n - 2];
        }
    }

    let sample_mean: f64 = sorted.iter().sum::<f64>() / (n as f64);
    let numerator: f64 = weights
        .iter()
        .zip(&sorted)
        .map(|(w, x)| w * x)
        .sum::<f64>()
        .powi(2);
    let denominator: f64 = sorted
        .iter()
        .map(|x| (x - sample_mean) * (x - sample_mean))
        .sum();

    let w = (numerator / denominator).min(1.0);
    let p_value = p_value_for(w, n, &standard_normal);

    Ok(NormalityTest {
        statistic: w,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Royston's normalizing transformations of W, by sample size regime
fn p_value_for(w: f64, n: usize, standard_normal: &Normal) -> f64 {
    if n == 3 {
        // Exact distribution for n = 3
        let p = (6.0 / std::f64::consts::PI)
            * ((w.sqrt()).asin() - (0.75_f64.sqrt()).asin());
        return p;
    }

    let one_minus_w = 1.0 - w;
    if one_minus_w <= 0.0 {
        return 1.0;
    }

    let nf = n as f64;
    let z = if n <= 11 {
        let gamma = -2.273 + 0.459 * nf;
        let arg = gamma - one_minus_w.ln();
        if arg <= 0.0 {
            // W far below the supported range; certainly non-normal
            return 0.0;
        }
        let mu = 0.5440 - 0.39978 * nf + 0.025054 * nf * nf - 0.0006714 * nf * nf * nf;
        let sigma = (1.3822 - 0.77857 * nf + 0.062767 * nf * nf - 0.0020322 * nf * nf * nf).exp();
        (-arg.ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = -1.5861 - 0.31082 * ln_n - 0.083751 * ln_n * ln_n
            + 0.0038915 * ln_n * ln_n * ln_n;
        let sigma = (-0.4803 - 0.082676 * ln_n + 0.0030302 * ln_n * ln_n).exp();
        (one_minus_w.ln() - mu) / sigma
    };

    1.0 - standard_normal.cdf(z)
}
