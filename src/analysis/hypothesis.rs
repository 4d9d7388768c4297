//! Two-sample group comparison
//!
//! Test selection is driven by the normality classification: a
//! pooled-variance Student t-test for normal metrics, a two-sided
//! Mann-Whitney U test otherwise. The Mann-Whitney p-value uses the
//! asymptotic normal approximation with tie correction and continuity
//! correction at every sample size.
//!
//! The statistic scale differs by kind (t vs. U); magnitudes are not
//! comparable across metrics tested with different kinds.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use super::{mean, var_sample, StatsError};

/// Which two-sample test was run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    StudentT,
    MannWhitneyU,
}

impl TestKind {
    /// Label used in reports and chart annotations
    pub fn label(&self) -> &'static str {
        match self {
            Self::StudentT => "t-test",
            Self::MannWhitneyU => "Mann-Whitney U test",
        }
    }
}

/// Outcome of a two-sample test
#[derive(Debug, Clone, Copy)]
pub struct GroupTest {
    pub kind: TestKind,
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Select and run the test appropriate for the normality classification
pub fn compare_groups(a: &[f64], b: &[f64], is_normal: bool) -> Result<GroupTest, StatsError> {
    if is_normal {
        student_t_test(a, b)
    } else {
        mann_whitney_u(a, b)
    }
}

/// Two-sample Student t-test with pooled variance
///
/// The equal-variance form, matching the default of the routine the
/// original analysis called. Requires at least 2 observations per group.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Result<GroupTest, StatsError> {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return Err(StatsError::InsufficientData {
            needed: 2,
            got: n1.min(n2),
        });
    }

    let (m1, m2) = (mean(a), mean(b));
    let (v1, v2) = (var_sample(a, m1), var_sample(b, m2));

    let df = (n1 + n2 - 2) as f64;
    let pooled = ((n1 as f64 - 1.0) * v1 + (n2 as f64 - 1.0) * v2) / df;
    if pooled <= 0.0 {
        return Err(StatsError::ZeroRange("both groups are constant"));
    }

    let se = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    let t = (m1 - m2) / se;

    let dist = StudentsT::new(0.0, 1.0, df).unwrap();
    let p_value = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);

    Ok(GroupTest {
        kind: TestKind::StudentT,
        statistic: t,
        p_value,
    })
}

/// Two-sided Mann-Whitney U test
///
/// Returns U for the first sample (rank sum convention). The p-value is the
/// normal approximation with tie correction and a 0.5 continuity
/// correction.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<GroupTest, StatsError> {
    let (n1, n2) = (a.len(), b.len());
    if n1 == 0 || n2 == 0 {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }

    // Rank the pooled sample, averaging ranks within tie groups
    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&v| (v, true))
        .chain(b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    let n = pooled.len();
    let mut rank_sum_a = 0.0;
    let mut tie_term = 0.0;

    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        // Ranks i+1..=j averaged over the tie group
        let rank = (i + 1 + j) as f64 / 2.0;
        let ties = (j - i) as f64;
        if ties > 1.0 {
            tie_term += ties * ties * ties - ties;
        }
        for item in &pooled[i..j] {
            if item.1 {
                rank_sum_a += rank;
            }
        }
        i = j;
    }

    let (n1f, n2f, nf) = (n1 as f64, n2 as f64, n as f64);
    let u = rank_sum_a - n1f * (n1f + 1.0) / 2.0;
    let mu = n1f * n2f / 2.0;

    let variance = n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
    if variance <= 0.0 {
        return Err(StatsError::ZeroRange("all observations are tied"));
    }

    let mut numerator = u - mu;
    if numerator != 0.0 {
        // Continuity correction pulls the statistic toward the mean
        numerator -= 0.5 * numerator.signum();
    }
    let z = numerator / variance.sqrt();

    let standard_normal = Normal::new(0.0, 1.0).unwrap();
    let p_value = (2.0 * (1.0 - standard_normal.cdf(z.abs()))).clamp(0.0, 1.0);

    Ok(GroupTest {
        kind: TestKind::MannWhitneyU,
        statistic: u,
        p_value,
    })
}
