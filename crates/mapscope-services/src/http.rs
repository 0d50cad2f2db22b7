//! Blocking HTTP client shared by the services.
//!
//! `ureq` is synchronous, so every request runs on the tokio blocking pool
//! and the async trait methods only await the join handle.

use mapscope_core::ServiceError;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("mapscope/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a `ureq::Agent` that maps failures to [`ServiceError`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }

    /// GET `url` and return the body as text.
    pub fn get_text(&self, service: &str, url: &str) -> Result<String, ServiceError> {
        tracing::debug!("{} GET {}", service, url);
        match self.agent.get(url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| ServiceError::InvalidResponse {
                    service: service.to_string(),
                    reason: e.to_string(),
                }),
            Err(ureq::Error::Status(status, _)) => Err(ServiceError::HttpStatus {
                service: service.to_string(),
                status,
            }),
            Err(e) => Err(ServiceError::RequestFailed {
                service: service.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// GET `url` and parse the body as JSON.
    pub fn get_json(&self, service: &str, url: &str) -> Result<Value, ServiceError> {
        let body = self.get_text(service, url)?;
        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse {
            service: service.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Runs a blocking request on the blocking pool.
pub(crate) async fn run_blocking<T, F>(service: &'static str, f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("{} request task failed: {}", service, e);
            Err(ServiceError::TaskAborted {
                service: service.to_string(),
            })
        }
    }
}

/// Comma-joined numbers for query string values.
pub(crate) fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_numbers() {
        assert_eq!(join_numbers(&[1.0, -2.5, 300.25]), "1,-2.5,300.25");
    }

    #[tokio::test]
    async fn test_run_blocking_passes_result() {
        let value = run_blocking("test", || Ok(7)).await.unwrap();
        assert_eq!(value, 7);
        let err = run_blocking::<(), _>("test", || {
            Err(ServiceError::RequestFailed {
                service: "test".to_string(),
                reason: "offline".to_string(),
            })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::RequestFailed { .. }));
    }
}
