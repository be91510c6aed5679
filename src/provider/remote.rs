// src/provider/remote.rs — Client for the hosted analysis function
//
// One POST per call, no retries. Every failure is absorbed into the
// deterministic fallback result and logged.

use async_trait::async_trait;
use std::time::Duration;

use super::fallback::fallback_analysis;
use super::{AnalysisBackend, AnalysisOutcome, AnalysisRequest};
use crate::core::safety;
use crate::core::types::AnalysisResult;
use crate::core::validation::NarrativeValidator;
use crate::infra::config::Config;
use crate::infra::errors::AuditorError;
use crate::normalizer;
use crate::util::truncate_str;

/// Narrative posted by `test_connection`.
pub const PROBE_NARRATIVE: &str = "Connection test protocol initiated.";

pub struct RemoteAnalysisClient {
    endpoint: Option<String>,
    api_key: String,
    client: reqwest::Client,
    validator: NarrativeValidator,
}

impl RemoteAnalysisClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("ego-auditor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client ({e}), using defaults");
                reqwest::Client::new()
            });
        Self {
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            api_key: api_key.unwrap_or_default(),
            client,
            validator: NarrativeValidator::for_analysis(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.remote.endpoint.clone(),
            config.remote.api_key.clone(),
            config.remote.timeout(),
        )
        .with_validator(NarrativeValidator::analysis_from_config(&config.validation))
    }

    /// Swap in a preconfigured HTTP client (proxy, TLS or timeout settings).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_validator(mut self, validator: NarrativeValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Full pipeline with the path taken kept visible.
    pub async fn analyze_detailed(&self, narrative: &str, recent: &[String]) -> AnalysisOutcome {
        if safety::detect_crisis(narrative) {
            tracing::warn!(
                keywords = ?safety::matched_keywords(narrative),
                "Crisis language detected, skipping remote analysis"
            );
            return AnalysisOutcome::Crisis(safety::crisis_response());
        }

        let validated = match self.validator.validate(narrative) {
            Ok(v) => v,
            Err(e) => {
                tracing::info!("Narrative rejected before dispatch: {e}");
                return AnalysisOutcome::Fallback {
                    result: fallback_analysis(narrative),
                    cause: e.into(),
                };
            }
        };

        let request = AnalysisRequest::new(validated.sanitized, recent);
        match self.send(&request).await {
            Ok(result) => AnalysisOutcome::Completed(result),
            Err(e) if e.is_remote() => {
                tracing::warn!("Remote analysis failed, using local fallback: {e}");
                AnalysisOutcome::Fallback {
                    result: fallback_analysis(&request.narrative),
                    cause: e,
                }
            }
            Err(e) => {
                tracing::info!("Remote analysis unavailable, using local fallback: {e}");
                AnalysisOutcome::Fallback {
                    result: fallback_analysis(&request.narrative),
                    cause: e,
                }
            }
        }
    }

    async fn send(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AuditorError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| AuditorError::Config("No analysis endpoint configured".into()))?;

        tracing::debug!(
            previous = request.previous_sessions.len(),
            chars = request.narrative.chars().count(),
            "Dispatching analysis request"
        );

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AuditorError::Network {
                message: e.to_string(),
                timeout: e.is_timeout(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AuditorError::Network {
            message: format!("Failed to read response body: {e}"),
            timeout: e.is_timeout(),
        })?;

        if !status.is_success() {
            return Err(AuditorError::Upstream {
                status: status.as_u16(),
                body: truncate_str(&body, 500).to_string(),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            AuditorError::MalformedBody(format!("{e}: {}", truncate_str(&body, 200)))
        })?;

        Ok(normalizer::normalize(&value))
    }
}

#[async_trait]
impl AnalysisBackend for RemoteAnalysisClient {
    fn id(&self) -> &str {
        "remote"
    }

    async fn analyze(&self, narrative: &str, recent: &[String]) -> AnalysisResult {
        self.analyze_detailed(narrative, recent).await.into_result()
    }

    async fn test_connection(&self) -> bool {
        let Some(endpoint) = self.endpoint.as_deref() else {
            tracing::warn!("Connection test skipped: no endpoint configured");
            return false;
        };
        let request = AnalysisRequest::new(PROBE_NARRATIVE, &[]);
        match self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("Connection test successful");
                true
            }
            Ok(resp) => {
                tracing::warn!(status = resp.status().as_u16(), "Connection test failed");
                false
            }
            Err(e) => {
                tracing::warn!("Connection test failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> RemoteAnalysisClient {
        RemoteAnalysisClient::new(None, None, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_crisis_short_circuits() {
        let outcome = offline()
            .analyze_detailed("Some days I want to die and nothing helps", &[])
            .await;
        assert!(matches!(outcome, AnalysisOutcome::Crisis(_)));
        assert!(outcome.result().crisis_flag);
    }

    #[tokio::test]
    async fn test_invalid_input_falls_back() {
        let outcome = offline().analyze_detailed("short", &[]).await;
        match outcome {
            AnalysisOutcome::Fallback { cause, result } => {
                assert!(matches!(cause, AuditorError::Validation(_)));
                assert!(!result.crisis_flag);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_endpoint_falls_back() {
        let outcome = offline()
            .analyze_detailed("A perfectly ordinary narrative about my week.", &[])
            .await;
        match outcome {
            AnalysisOutcome::Fallback { cause, .. } => {
                assert!(matches!(cause, AuditorError::Config(_)));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_without_endpoint() {
        assert!(!offline().test_connection().await);
    }

    #[test]
    fn test_blank_endpoint_treated_as_missing() {
        let c = RemoteAnalysisClient::new(Some("  ".into()), None, Duration::from_secs(1));
        assert!(c.endpoint().is_none());
    }
}
