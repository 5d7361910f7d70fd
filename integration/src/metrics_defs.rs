//! Metrics definitions for the integration service.

use shared::metrics_defs::{MetricDef, MetricType};

pub const ACCOUNT_FEATURES_CACHE_HIT: MetricDef = MetricDef {
    name: "account_features.cache.hit",
    metric_type: MetricType::Counter,
    description: "Account feature lookups served from cache, tagged by the tier (store or website) that matched",
};

pub const ACCOUNT_FEATURES_CACHE_MISS: MetricDef = MetricDef {
    name: "account_features.cache.miss",
    metric_type: MetricType::Counter,
    description: "Account feature lookups with no cached entry at any tier",
};

pub const ACCOUNT_FEATURES_CACHE_INVALID: MetricDef = MetricDef {
    name: "account_features.cache.invalid",
    metric_type: MetricType::Counter,
    description: "Cached account feature entries that could not be decoded",
};

pub const ACCOUNT_LOOKUP_DURATION: MetricDef = MetricDef {
    name: "account_lookup.duration",
    metric_type: MetricType::Histogram,
    description: "Time to complete an account lookup request in seconds, tagged by endpoint",
};

pub const ACCOUNT_LOOKUP_FAILURE: MetricDef = MetricDef {
    name: "account_lookup.failure",
    metric_type: MetricType::Counter,
    description: "Account lookup requests that failed, tagged by endpoint",
};

pub const API_KEYS_INTEGRATED: MetricDef = MetricDef {
    name: "api_keys.integrated",
    metric_type: MetricType::Counter,
    description: "API keys integrated with a scope, tagged by scope type",
};

pub const API_KEYS_REMOVED: MetricDef = MetricDef {
    name: "api_keys.removed",
    metric_type: MetricType::Counter,
    description: "API keys removed from a scope, tagged by scope type",
};

pub const API_REQUESTS: MetricDef = MetricDef {
    name: "api.requests",
    metric_type: MetricType::Counter,
    description: "Web API requests, tagged by endpoint and response status",
};

pub const ALL_METRICS: &[MetricDef] = &[
    ACCOUNT_FEATURES_CACHE_HIT,
    ACCOUNT_FEATURES_CACHE_MISS,
    ACCOUNT_FEATURES_CACHE_INVALID,
    ACCOUNT_LOOKUP_DURATION,
    ACCOUNT_LOOKUP_FAILURE,
    API_KEYS_INTEGRATED,
    API_KEYS_REMOVED,
    API_REQUESTS,
];
