//! Ordinary least-squares regression over a metric pair
//!
//! Slope, intercept, Pearson r, and the two-sided p-value for the slope
//! being non-zero (t on n - 2 degrees of freedom via statrs).

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{mean, StatsError};

/// Sign of the correlation coefficient
///
/// r = 0 counts as positive (>= 0 rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
        }
    }
}

/// Correlation strength bucket against the configured threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    High,
    Low,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High Correlation",
            Self::Low => "Low Correlation",
        }
    }
}

/// Fitted least-squares line and its slope test
#[derive(Debug, Clone, Copy)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub r: f64,
    /// Two-sided p-value for slope != 0
    pub p_value: f64,
    pub n: usize,
}

impl Regression {
    pub fn r_squared(&self) -> f64 {
        self.r * self.r
    }

    pub fn direction(&self) -> Direction {
        if self.r >= 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    /// |r| strictly above the threshold is high; the boundary is low
    pub fn strength(&self, threshold: f64) -> Strength {
        if self.r.abs() > threshold {
            Strength::High
        } else {
            Strength::Low
        }
    }

    /// Predicted response at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit y against x by ordinary least squares
///
/// Requires at least 3 paired observations (positive degrees of freedom for
/// the slope test) and a non-constant predictor.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<Regression, StatsError> {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }

    let (xm, ym) = (mean(&xs[..n]), mean(&ys[..n]));

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let (dx, dy) = (x - xm, y - ym);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx <= 0.0 {
        return Err(StatsError::ZeroRange("predictor is constant"));
    }

    let slope = sxy / sxx;
    let intercept = ym - slope * xm;
    let r = if syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        // Constant response: flat line fits exactly, no correlation
        0.0
    };

    let df = (n - 2) as f64;
    let p_value = if 1.0 - r * r < 1e-14 {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).unwrap();
        (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
    };

    Ok(Regression {
        slope,
        intercept,
        r,
        p_value,
        n,
    })
}
