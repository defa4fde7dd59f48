use super::{router, AppState};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::telemetry;
use crate::workflows::presale::narrative::GeminiNarrativeService;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub async fn run(mut config: AppConfig, overrides: ServeOverrides) -> Result<(), AppError> {
    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let mut state = AppState::new(prometheus_handle, config.scoring);
    if let Some(api_key) = &config.narrative.api_key {
        let service = GeminiNarrativeService::new(
            config.narrative.base_url.as_str(),
            config.narrative.model.as_str(),
            api_key.as_str(),
        )?;
        state = state.with_narrative(Arc::new(service));
    }
    let readiness_flag = state.readiness.clone();

    let app = router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        price_low = config.scoring.price_range.low,
        price_high = config.scoring.price_range.high,
        narrative = config.narrative.is_enabled(),
        "presale survey analytics ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
