use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntentCount {
    pub intent: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntentShare {
    pub intent: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryCount {
    pub query: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourCount {
    pub hour: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LatencyPercentiles {
    pub min: i64,
    pub p50: i64,
    pub p95: i64,
    pub p99: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConfidenceLevels {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PerformanceMetrics {
    pub response_time_percentiles: LatencyPercentiles,
    pub confidence_distribution: ConfidenceLevels,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Analytics {
    pub total_queries: i64,
    pub recent_queries: i64,
    pub avg_confidence: f64,
    pub avg_response_time_ms: f64,
    pub min_response_time_ms: i64,
    pub max_response_time_ms: i64,
    pub low_confidence_count: i64,
    pub error_rate: f64,
    pub top_intents: Vec<IntentCount>,
    pub hourly_stats: Vec<HourCount>,
    pub intent_distribution: Vec<IntentShare>,
    pub common_queries: Vec<QueryCount>,
    pub performance: PerformanceMetrics,
}
