//! Per-request orchestration: count the request, run the pipeline, record
//! exactly one latency observation on every exit path, surface the error for
//! the HTTP boundary to map.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::error::PredictError;
use crate::metrics::{Endpoint, MetricsRegistry};
use crate::ml::inference::InferenceEngine;
use crate::samples;

pub struct PredictService {
    engine: InferenceEngine,
    metrics: Arc<MetricsRegistry>,
}

impl PredictService {
    pub fn new(engine: InferenceEngine, metrics: Arc<MetricsRegistry>) -> Self {
        PredictService { engine, metrics }
    }

    pub fn predict(&self, raw: Option<&Value>) -> Result<Vec<i64>, PredictError> {
        self.metrics.record_request(Endpoint::Predict);
        let started = Instant::now();
        let result = samples::normalize(raw)
            .map_err(PredictError::from)
            .and_then(|batch| self.engine.predict(&batch));
        self.metrics
            .record_latency(Endpoint::Predict, started.elapsed());
        result
    }

    pub fn explain(&self) -> Result<Vec<f64>, PredictError> {
        self.metrics.record_request(Endpoint::Explain);
        let started = Instant::now();
        let result = self.engine.global_importance();
        self.metrics
            .record_latency(Endpoint::Explain, started.elapsed());
        result
    }
}
