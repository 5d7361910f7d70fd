//! Metrics definitions for scope resolution.

use shared::metrics_defs::{MetricDef, MetricType};

pub const SCOPE_RESOLVED: MetricDef = MetricDef {
    name: "scope.resolved",
    metric_type: MetricType::Counter,
    description: "Number of current scope resolutions, tagged by the source that decided the scope",
};

pub const SCOPE_PINNED: MetricDef = MetricDef {
    name: "scope.pinned",
    metric_type: MetricType::Counter,
    description: "Number of explicit scope pins, tagged by scope type",
};

pub const ALL_METRICS: &[MetricDef] = &[SCOPE_RESOLVED, SCOPE_PINNED];
