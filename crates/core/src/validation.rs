//! Statistical primitives for hypothesis testing on roll and bet histories.
//!
//! Provides the standard normal CDF, the chi-square distribution (survival
//! function and critical values) and Wald confidence intervals for
//! proportions.

/// Two-sided 95% z critical value.
pub const Z_95: f64 = 1.96;

/// Significance level used for all 95% decisions.
pub const ALPHA_95: f64 = 0.05;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

const GAMMA_MAX_ITERATIONS: usize = 500;
const GAMMA_EPSILON: f64 = 1e-15;
const GAMMA_FPMIN: f64 = 1e-300;

/// Approximation of the standard normal CDF using the Abramowitz and Stegun
/// formula 26.2.17. Accurate to about 10^-7.
///
/// Proportion z-tests take their two-tailed p-values from this approximation.
#[must_use]
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - standard_normal_cdf(-x);
    }

    let b1 = 0.319_381_530;
    let b2 = -0.356_563_782;
    let b3 = 1.781_477_937;
    let b4 = -1.821_255_978;
    let b5 = 1.330_274_429;
    let p = 0.231_641_9;

    let t = 1.0 / (1.0 + p * x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let pdf = (-x * x / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    1.0 - pdf * (b1 * t + b2 * t2 + b3 * t3 + b4 * t4 + b5 * t5)
}

/// Two-tailed p-value for a standard normal test statistic.
#[must_use]
pub fn two_tailed_p_value(z: f64) -> f64 {
    (2.0 * (1.0 - standard_normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Wald confidence interval `p ± z·sqrt(p(1-p)/n)` clamped to [0, 1].
///
/// Returns `(0.0, 1.0)` when `n` is zero.
///
/// # Examples
/// ```
/// use rollquest_core::validation::wald_ci;
///
/// let (lower, upper) = wald_ci(0.5, 100, 1.96);
/// assert!((lower - 0.402).abs() < 1e-3);
/// assert!((upper - 0.598).abs() < 1e-3);
/// ```
#[must_use]
pub fn wald_ci(p: f64, n: usize, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 1.0);
    }
    let se = (p * (1.0 - p) / n as f64).sqrt();
    ((p - z * se).max(0.0), (p + z * se).min(1.0))
}

/// Natural log of the gamma function (Lanczos approximation, g = 7).
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut a = LANCZOS_COEFFICIENTS[0];
    let t = x + LANCZOS_G + 0.5;
    for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }

    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// Regularized upper incomplete gamma function Q(a, x).
fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_continued_fraction(a, x)
    }
}

fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..GAMMA_MAX_ITERATIONS {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * GAMMA_EPSILON {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Modified Lentz evaluation of the continued fraction for Q(a, x).
fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / GAMMA_FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=GAMMA_MAX_ITERATIONS {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < GAMMA_FPMIN {
            d = GAMMA_FPMIN;
        }
        c = b + an / c;
        if c.abs() < GAMMA_FPMIN {
            c = GAMMA_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < GAMMA_EPSILON {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Survival function P(X > x) of the chi-square distribution with `df` degrees
/// of freedom. This is the p-value of a chi-square statistic `x`.
#[must_use]
pub fn chi_square_sf(x: f64, df: usize) -> f64 {
    if df == 0 || x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    if x.is_infinite() {
        return 0.0;
    }
    regularized_gamma_q(df as f64 / 2.0, x / 2.0).clamp(0.0, 1.0)
}

/// Critical value c such that P(X > c) = `alpha` for a chi-square variable
/// with `df` degrees of freedom, found by bisection on [`chi_square_sf`].
///
/// # Examples
/// ```
/// use rollquest_core::validation::chi_square_critical;
///
/// let c = chi_square_critical(0.05, 5);
/// assert!((c - 11.0705).abs() < 1e-3);
/// ```
#[must_use]
pub fn chi_square_critical(alpha: f64, df: usize) -> f64 {
    if df == 0 || !(alpha > 0.0 && alpha < 1.0) {
        return f64::NAN;
    }

    let mut lo = 0.0;
    let mut hi = df as f64;
    while chi_square_sf(hi, df) > alpha {
        lo = hi;
        hi *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if chi_square_sf(mid, df) > alpha {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }
    0.5 * (lo + hi)
}
