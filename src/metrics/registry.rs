//! Metric registry: named reduction functions with display metadata.
//!
//! Metrics are registered explicitly. The process-wide registry returned by
//! [`global`] is built once on first access with the built-in metrics and is
//! read-only afterwards; callers needing custom metrics build their own
//! `MetricRegistry` and register into it during initialization.

use super::builtin;
use crate::utils::error::RegistryError;
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Extra context a metric may need besides the values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricContext {
    /// Duration the values were observed over, in minutes
    pub duration: Option<f64>,
}

impl MetricContext {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
        }
    }
}

/// Reduction over a window's values
///
/// Must not panic on empty input; return `f64::NAN` instead.
pub type MetricFn = fn(&[f64], &MetricContext) -> f64;

/// Display metadata attached to a metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub name: String,

    /// Decimal places used when presenting values
    pub precision: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MetricDescriptor {
    pub fn new(name: impl Into<String>, precision: u32, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            precision,
            description: description.map(str::to_string),
        }
    }

    /// Round a value to the declared precision
    ///
    /// **Public** - presentation helper; the engine itself never rounds.
    /// Non-finite values pass through untouched.
    pub fn round(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let factor = 10f64.powi(self.precision as i32);
        (value * factor).round() / factor
    }
}

/// A descriptor bound to its function
#[derive(Clone)]
pub struct RegisteredMetric {
    pub descriptor: MetricDescriptor,
    function: MetricFn,
}

impl std::fmt::Debug for RegisteredMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredMetric")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl RegisteredMetric {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Apply the metric to a slice of values
    pub fn apply(&self, values: &[f64], context: &MetricContext) -> f64 {
        (self.function)(values, context)
    }
}

/// Ordered, append-only table of metrics
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    metrics: Vec<RegisteredMetric>,
}

impl MetricRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding all built-in metrics
    pub fn with_builtins() -> Self {
        let metrics: Vec<RegisteredMetric> = builtin::definitions()
            .into_iter()
            .map(|(descriptor, function)| RegisteredMetric {
                descriptor,
                function,
            })
            .collect();

        debug_assert!(
            metrics
                .iter()
                .enumerate()
                .all(|(i, m)| metrics[..i].iter().all(|prev| prev.name() != m.name())),
            "built-in metric names must be unique"
        );

        Self { metrics }
    }

    /// Register a metric
    ///
    /// **Public** - a name that is already registered is rejected and the
    /// existing entry is kept.
    ///
    /// # Errors
    /// * `RegistryError::DuplicateMetric` - name already taken
    pub fn register(
        &mut self,
        descriptor: MetricDescriptor,
        function: MetricFn,
    ) -> Result<(), RegistryError> {
        if self.contains(&descriptor.name) {
            return Err(RegistryError::DuplicateMetric(descriptor.name));
        }

        debug!(
            "Registered metric '{}' (precision {})",
            descriptor.name, descriptor.precision
        );
        self.metrics.push(RegisteredMetric {
            descriptor,
            function,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.iter().any(|m| m.name() == name)
    }

    /// Look up a metric by name
    ///
    /// # Errors
    /// * `RegistryError::UnknownMetric` - nothing registered under `name`
    pub fn get(&self, name: &str) -> Result<&RegisteredMetric, RegistryError> {
        self.metrics
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| RegistryError::UnknownMetric(name.to_string()))
    }

    /// Metrics in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMetric> {
        self.metrics.iter()
    }

    pub fn descriptors(&self) -> Vec<MetricDescriptor> {
        self.metrics.iter().map(|m| m.descriptor.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

static GLOBAL_REGISTRY: Lazy<MetricRegistry> = Lazy::new(MetricRegistry::with_builtins);

/// Process-wide registry of built-in metrics
pub fn global() -> &'static MetricRegistry {
    &GLOBAL_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(values: &[f64], _ctx: &MetricContext) -> f64 {
        values.len() as f64
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = MetricRegistry::new();
        registry
            .register(MetricDescriptor::new("count", 0, Some("samples")), count)
            .unwrap();

        let metric = registry.get("count").unwrap();
        assert_eq!(metric.descriptor.description.as_deref(), Some("samples"));
        assert_eq!(metric.apply(&[1.0, 2.0], &MetricContext::default()), 2.0);
    }

    #[test]
    fn test_duplicate_rejected_and_first_kept() {
        let mut registry = MetricRegistry::new();
        registry
            .register(MetricDescriptor::new("count", 0, None), count)
            .unwrap();

        let err = registry
            .register(MetricDescriptor::new("count", 3, Some("shadow")), count)
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateMetric("count".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("count").unwrap().descriptor.precision, 0);
    }

    #[test]
    fn test_unknown_metric() {
        let registry = MetricRegistry::new();
        assert_eq!(
            registry.get("p99").unwrap_err(),
            RegistryError::UnknownMetric("p99".to_string())
        );
    }

    #[test]
    fn test_round_to_precision() {
        let d = MetricDescriptor::new("x", 2, None);
        assert_eq!(d.round(1.23456), 1.23);
        assert_eq!(MetricDescriptor::new("y", 0, None).round(2.5), 3.0);
        assert!(d.round(f64::NAN).is_nan());
    }

    #[test]
    fn test_global_has_builtins() {
        let registry = global();
        for name in ["avg", "rpm", "std.dev", "per90", "per95", "rps", "rph"] {
            assert!(registry.contains(name), "missing built-in {}", name);
        }
        assert_eq!(registry.iter().next().unwrap().name(), "avg");
    }

    #[test]
    fn test_builtins_registered_without_loss() {
        let registry = MetricRegistry::with_builtins();
        let names: Vec<_> = builtin::definitions()
            .into_iter()
            .map(|(d, _)| d.name)
            .collect();

        assert_eq!(registry.len(), names.len());
        for name in &names {
            assert_eq!(names.iter().filter(|n| *n == name).count(), 1);
            assert!(registry.contains(name));
        }
    }
}
