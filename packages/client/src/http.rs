//! `reqwest` implementation of [`RiskApi`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use wildfire_risk_models::api::{
    ExplainResponse, HeatmapResponse, PredictResponse, RiskRequest, ScenarioRequest,
    ScenarioResponse, SimulationRequest, SimulationResponse,
};
use wildfire_risk_models::{Driver, RiskPoint, Scenario, ScenarioResult};

use crate::{ApiConfig, ClientError, RiskApi, endpoints};

/// Risk service client over HTTP/JSON.
///
/// No timeout or retry policy is applied; each call is a single request.
pub struct HttpRiskApi {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpRiskApi {
    /// Creates a client for the configured service.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.config.endpoint(path);
        log::debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        read_json(resp).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        log::debug!("POST {url}");
        let resp = self.client.post(&url).json(body).send().await?;
        read_json(resp).await
    }
}

/// Rejects non-2xx responses.
fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}

/// Reads the body as text first so a shape mismatch surfaces as
/// [`ClientError::Json`] rather than an opaque transport error.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let text = check_status(resp)?.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait::async_trait]
impl RiskApi for HttpRiskApi {
    async fn system_health(&self) -> Result<(), ClientError> {
        let url = self.config.endpoint(endpoints::SYSTEM_HEALTH);
        log::debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        check_status(resp)?;
        Ok(())
    }

    async fn risk_heatmap(&self) -> Result<Vec<RiskPoint>, ClientError> {
        let body: HeatmapResponse = self.get_json(endpoints::RISK_HEATMAP).await?;
        Ok(body.results)
    }

    async fn predict_risk(&self, request: &RiskRequest) -> Result<f64, ClientError> {
        let body: PredictResponse = self.post_json(endpoints::PREDICT_RISK, request).await?;
        Ok(body.risk_probability)
    }

    async fn explain_risk(&self, request: &RiskRequest) -> Result<Vec<Driver>, ClientError> {
        let body: ExplainResponse = self.post_json(endpoints::EXPLAIN_RISK, request).await?;
        Ok(body.into_drivers())
    }

    async fn predict_scenario(&self, scenario: Scenario) -> Result<ScenarioResult, ClientError> {
        let body: ScenarioResponse = self
            .post_json(endpoints::PREDICT_SCENARIO, &ScenarioRequest { scenario })
            .await?;
        if body.scenario != scenario.as_ref() {
            log::warn!(
                "Scenario response echoed '{}' for requested '{scenario}'",
                body.scenario
            );
        }
        Ok(body.into_result(scenario))
    }

    async fn simulate_risk(
        &self,
        request: &SimulationRequest,
    ) -> Result<Vec<Vec<f64>>, ClientError> {
        let body: SimulationResponse = self.post_json(endpoints::SIMULATE_RISK, request).await?;
        Ok(body.simulation_result)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use wildfire_risk_models::{EnvironmentalInputs, Location};

    use super::*;

    /// Serves exactly one canned response and yields the request head
    /// and body it received.
    async fn serve_once(status: &str, body: &str) -> (HttpRiskApi, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0_u8; 1024];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                received.extend_from_slice(&chunk[..n]);
                if let Some(i) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                    break i + 4;
                }
            };
            let head = String::from_utf8_lossy(&received[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().unwrap())
                })
                .unwrap_or(0);
            while received.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                received.extend_from_slice(&chunk[..n]);
            }
            let body = String::from_utf8_lossy(&received[head_end..]).to_string();

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            (head, body)
        });

        let config = ApiConfig::new(&format!("http://{addr}/api")).unwrap();
        (HttpRiskApi::new(config), server)
    }

    fn request() -> RiskRequest {
        EnvironmentalInputs::default().to_request(Location::new(51.45, -2.59))
    }

    #[tokio::test]
    async fn health_accepts_any_success_status() {
        let (api, server) = serve_once("204 No Content", "").await;

        api.system_health().await.unwrap();

        let (head, _) = server.await.unwrap();
        assert!(head.starts_with("GET /api/system-health "));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_status_error() {
        let (api, server) = serve_once("503 Service Unavailable", "{}").await;

        let err = api.risk_heatmap().await.unwrap_err();
        server.await.unwrap();

        match err {
            ClientError::Status { status, url } => {
                assert_eq!(status, 503);
                assert!(url.ends_with("/api/risk-heatmap"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mismatched_body_maps_to_json_error() {
        let (api, server) = serve_once("200 OK", r#"{"probability": 0.4}"#).await;

        let err = api.predict_risk(&request()).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ClientError::Json(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn predict_posts_json_and_reads_probability() {
        let (api, server) = serve_once("200 OK", r#"{"risk_probability": 0.42}"#).await;

        let probability = api.predict_risk(&request()).await.unwrap();

        let (head, body) = server.await.unwrap();
        assert!((probability - 0.42).abs() < f64::EPSILON);
        assert!(head.starts_with("POST /api/predict-risk "));
        let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent["latitude"], 51.45);
    }
}
