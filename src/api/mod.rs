//! HTTP surface: health checks, metrics and the survey analysis endpoint.

mod cache;
mod routes;
mod server;

pub use cache::{content_key, parse_upload, DatasetCache, DEFAULT_CACHE_CAPACITY};
pub use routes::{router, SurveyAnalysisRequest, SurveyAnalysisResponse};
pub use server::{run, ServeOverrides};

use crate::workflows::intake::{SurveyImportError, SurveyTable};
use crate::workflows::presale::lead::ScoringConfig;
use crate::workflows::presale::narrative::{DisabledNarrativeService, NarrativeService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
    pub cache: Arc<Mutex<DatasetCache>>,
    pub scoring: ScoringConfig,
    pub narrative: Arc<dyn NarrativeService>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, scoring: ScoringConfig) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            cache: Arc::new(Mutex::new(DatasetCache::default())),
            scoring,
            narrative: Arc::new(DisabledNarrativeService),
        }
    }

    pub fn with_narrative(mut self, narrative: Arc<dyn NarrativeService>) -> Self {
        self.narrative = narrative;
        self
    }

    /// Parses an upload once per distinct content. The cache lock is only
    /// held for the lookup and the insert, never while parsing.
    pub fn load_dataset(
        &self,
        csv: &str,
    ) -> Result<(String, Arc<SurveyTable>), SurveyImportError> {
        let key = content_key(csv.as_bytes());
        if let Some(table) = self.lock_cache().get(&key) {
            tracing::debug!(key = %key, "dataset cache hit");
            return Ok((key, table));
        }

        let table = Arc::new(parse_upload(csv)?);
        let table = self.lock_cache().insert(key.clone(), table);
        Ok((key, table))
    }

    fn lock_cache(&self) -> MutexGuard<'_, DatasetCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
