//! Process-wide request instrumentation.
//!
//! Monotonic per-endpoint counters and latency histograms, updated exactly
//! once per request on every path, success and failure alike. Nothing in the
//! core reads the aggregates back; the /metrics collaborator renders them in
//! Prometheus text exposition format.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default Prometheus histogram boundaries, in seconds. +Inf is implicit.
const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Closed set of instrumented endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Predict,
    Explain,
}

impl Endpoint {
    const ALL: [Endpoint; 3] = [Endpoint::Health, Endpoint::Predict, Endpoint::Explain];

    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Health => "/health",
            Endpoint::Predict => "/predict",
            Endpoint::Explain => "/explain",
        }
    }

    fn index(self) -> usize {
        match self {
            Endpoint::Health => 0,
            Endpoint::Predict => 1,
            Endpoint::Explain => 2,
        }
    }
}

#[derive(Debug)]
struct LatencyHistogram {
    // Cumulative: slot i counts observations <= LATENCY_BUCKETS[i].
    buckets: [AtomicU64; LATENCY_BUCKETS.len()],
    total_nanos: AtomicU64,
    count: AtomicU64,
}

impl LatencyHistogram {
    fn new() -> Self {
        LatencyHistogram {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            total_nanos: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    fn observe(&self, duration: Duration) {
        let seconds = duration.as_secs_f64();
        for (slot, bound) in self.buckets.iter().zip(LATENCY_BUCKETS) {
            if seconds <= bound {
                slot.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.total_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct EndpointMetrics {
    requests: AtomicU64,
    latency: LatencyHistogram,
}

pub struct MetricsRegistry {
    endpoints: [EndpointMetrics; 3],
}

impl MetricsRegistry {
    pub fn new() -> Self {
        MetricsRegistry {
            endpoints: std::array::from_fn(|_| EndpointMetrics {
                requests: AtomicU64::new(0),
                latency: LatencyHistogram::new(),
            }),
        }
    }

    pub fn record_request(&self, endpoint: Endpoint) {
        self.endpoints[endpoint.index()]
            .requests
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_latency(&self, endpoint: Endpoint, duration: Duration) {
        self.endpoints[endpoint.index()].latency.observe(duration);
    }

    pub fn request_count(&self, endpoint: Endpoint) -> u64 {
        self.endpoints[endpoint.index()]
            .requests
            .load(Ordering::Relaxed)
    }

    pub fn latency_count(&self, endpoint: Endpoint) -> u64 {
        self.endpoints[endpoint.index()]
            .latency
            .count
            .load(Ordering::Relaxed)
    }

    /// Prometheus text exposition. Series appear once their endpoint has been
    /// observed, matching labeled-metric materialization.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP requests_total Total requests\n");
        out.push_str("# TYPE requests_total counter\n");
        for endpoint in Endpoint::ALL {
            let requests = self.request_count(endpoint);
            if requests == 0 {
                continue;
            }
            out.push_str(&format!(
                "requests_total{{endpoint=\"{}\"}} {}\n",
                endpoint.label(),
                requests
            ));
        }

        out.push_str("# HELP request_latency_seconds Request latency\n");
        out.push_str("# TYPE request_latency_seconds histogram\n");
        for endpoint in Endpoint::ALL {
            let histogram = &self.endpoints[endpoint.index()].latency;
            let count = histogram.count.load(Ordering::Relaxed);
            if count == 0 {
                continue;
            }
            for (slot, bound) in histogram.buckets.iter().zip(LATENCY_BUCKETS) {
                out.push_str(&format!(
                    "request_latency_seconds_bucket{{endpoint=\"{}\",le=\"{}\"}} {}\n",
                    endpoint.label(),
                    bound,
                    slot.load(Ordering::Relaxed)
                ));
            }
            out.push_str(&format!(
                "request_latency_seconds_bucket{{endpoint=\"{}\",le=\"+Inf\"}} {}\n",
                endpoint.label(),
                count
            ));
            let sum = histogram.total_nanos.load(Ordering::Relaxed) as f64 / 1e9;
            out.push_str(&format!(
                "request_latency_seconds_sum{{endpoint=\"{}\"}} {}\n",
                endpoint.label(),
                sum
            ));
            out.push_str(&format!(
                "request_latency_seconds_count{{endpoint=\"{}\"}} {}\n",
                endpoint.label(),
                count
            ));
        }

        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_endpoint() {
        let registry = MetricsRegistry::new();
        registry.record_request(Endpoint::Predict);
        registry.record_request(Endpoint::Predict);
        registry.record_request(Endpoint::Health);
        assert_eq!(registry.request_count(Endpoint::Predict), 2);
        assert_eq!(registry.request_count(Endpoint::Health), 1);
        assert_eq!(registry.request_count(Endpoint::Explain), 0);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let registry = MetricsRegistry::new();
        registry.record_latency(Endpoint::Predict, Duration::from_millis(3));
        registry.record_latency(Endpoint::Predict, Duration::from_millis(70));

        let histogram = &registry.endpoints[Endpoint::Predict.index()].latency;
        // 3ms lands in every bucket; 70ms only from the 0.1s bucket up.
        assert_eq!(histogram.buckets[0].load(Ordering::Relaxed), 1); // 0.005
        assert_eq!(histogram.buckets[3].load(Ordering::Relaxed), 1); // 0.05
        assert_eq!(histogram.buckets[4].load(Ordering::Relaxed), 2); // 0.1
        assert_eq!(histogram.buckets[10].load(Ordering::Relaxed), 2); // 10.0
        assert_eq!(histogram.count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn render_emits_only_observed_series() {
        let registry = MetricsRegistry::new();
        registry.record_request(Endpoint::Health);
        registry.record_request(Endpoint::Predict);
        registry.record_latency(Endpoint::Predict, Duration::from_millis(4));

        let text = registry.render();
        assert!(text.contains("# TYPE requests_total counter"));
        assert!(text.contains("requests_total{endpoint=\"/health\"} 1"));
        assert!(text.contains("requests_total{endpoint=\"/predict\"} 1"));
        assert!(!text.contains("endpoint=\"/explain\""));
        assert!(text.contains(
            "request_latency_seconds_bucket{endpoint=\"/predict\",le=\"+Inf\"} 1"
        ));
        assert!(text.contains("request_latency_seconds_count{endpoint=\"/predict\"} 1"));
        // /health records no latency, so no histogram series for it.
        assert!(!text.contains("request_latency_seconds_bucket{endpoint=\"/health\""));
    }

    #[test]
    fn concurrent_updates_never_lose_counts() {
        let registry = std::sync::Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        registry.record_request(Endpoint::Predict);
                        registry.record_latency(Endpoint::Predict, Duration::from_micros(10));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join");
        }
        assert_eq!(registry.request_count(Endpoint::Predict), 4000);
        assert_eq!(registry.latency_count(Endpoint::Predict), 4000);
    }
}
