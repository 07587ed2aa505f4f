//! Built-in metric functions.
//!
//! Every function returns `NaN` for an empty window. Rate metrics also
//! return `NaN` when no positive duration is available, since the rate is
//! undefined rather than zero.

use super::registry::{MetricContext, MetricDescriptor, MetricFn};

/// Descriptors and functions for all built-in metrics, in display order
///
/// **Public** - consumed by `MetricRegistry::with_builtins`
pub fn definitions() -> Vec<(MetricDescriptor, MetricFn)> {
    vec![
        (
            MetricDescriptor::new("avg", 0, Some("average request processing time")),
            avg as MetricFn,
        ),
        (
            MetricDescriptor::new(
                "std.dev",
                2,
                Some("standard deviation of request processing time"),
            ),
            std_dev as MetricFn,
        ),
        (
            MetricDescriptor::new("per90", 0, Some("90th percentile of request processing time")),
            per90 as MetricFn,
        ),
        (
            MetricDescriptor::new("per95", 0, Some("95th percentile of request processing time")),
            per95 as MetricFn,
        ),
        (
            MetricDescriptor::new("rps", 2, Some("requests per second")),
            rps as MetricFn,
        ),
        (
            MetricDescriptor::new("rpm", 0, Some("requests per minute")),
            rpm as MetricFn,
        ),
        (
            MetricDescriptor::new("rph", 0, Some("requests per hour")),
            rph as MetricFn,
        ),
    ]
}

/// Arithmetic mean
pub fn avg(values: &[f64], _ctx: &MetricContext) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64], ctx: &MetricContext) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = avg(values, ctx);
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

pub fn per90(values: &[f64], _ctx: &MetricContext) -> f64 {
    percentile(values, 0.90)
}

pub fn per95(values: &[f64], _ctx: &MetricContext) -> f64 {
    percentile(values, 0.95)
}

/// Sum of values per minute of the context duration
pub fn rpm(values: &[f64], ctx: &MetricContext) -> f64 {
    rate(values, ctx, 1.0)
}

/// Sum of values per second of the context duration
pub fn rps(values: &[f64], ctx: &MetricContext) -> f64 {
    rate(values, ctx, 60.0)
}

/// Sum of values per hour of the context duration
pub fn rph(values: &[f64], ctx: &MetricContext) -> f64 {
    rate(values, ctx, 1.0 / 60.0)
}

/// Sum divided by duration expressed in the target unit
///
/// **Private** - `unit_per_minute` is how many target units fit in a minute
fn rate(values: &[f64], ctx: &MetricContext, unit_per_minute: f64) -> f64 {
    match ctx.duration {
        Some(minutes) if minutes > 0.0 && !values.is_empty() => {
            values.iter().sum::<f64>() / (minutes * unit_per_minute)
        }
        _ => f64::NAN,
    }
}

/// Percentile with linear interpolation between closest ranks
///
/// **Private** - `q` is a fraction in `[0, 1]`
fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
