//! Floating point helpers: approximate comparison (thin wrappers around the `approx` crate) and
//! the handling of probabilities that drift slightly outside `[0, 1]` after several modifiers
//! have been multiplied together.

use approx::AbsDiffEq;
use log::warn;
use serde::Deserialize;

/// Targeted accuracy instantiated over `f64`
pub const ACC: f64 = 10e-11;

/// How far above 1.0 a probability may drift before it counts as a defect rather than
/// rounding noise.
pub const PROBABILITY_SLACK: f64 = 1e-6;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// What to do when a computed probability exceeds 1.0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityPolicy {
    /// Clamp to 1.0 without comment.
    Clamp,
    /// Clamp to 1.0 and emit a warning.
    #[default]
    Warn,
    /// Values within [`PROBABILITY_SLACK`] of 1.0 are clamped, anything larger panics.
    Strict,
}

/// Brings `p` back into `[0, 1]` according to `policy`. Negative values are always clamped to
/// zero; they can only arise from modifiers that are themselves zero or negative, and a zero
/// probability is the intended outcome in that case.
#[must_use]
pub fn checked_probability(p: f64, policy: ProbabilityPolicy, what: &str) -> f64 {
    if p <= 1.0 {
        return p.max(0.0);
    }
    match policy {
        ProbabilityPolicy::Clamp => {}
        ProbabilityPolicy::Warn => {
            warn!("{what}: probability {p} exceeds 1.0, clamping");
        }
        ProbabilityPolicy::Strict => {
            assert!(
                p <= 1.0 + PROBABILITY_SLACK,
                "{what}: probability {p} exceeds 1.0"
            );
        }
    }
    1.0
}

#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, $a, $b
            );
        }
    };
}
pub use assert_almost_eq;
