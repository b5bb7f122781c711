//! API client for communicating with the age service

use anyhow::{Context, Result};
use predictor_lib::{AbaloneInput, ErrorResponse, HealthResponse, PredictionOutput};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// API client for the age service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Send a GET request without interpreting the status
    async fn send_get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path).context("Invalid path")?;

        self.client
            .get(url)
            .send()
            .await
            .context("Failed to send request")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    /// Predict the age of one abalone
    pub async fn predict(&self, input: &AbaloneInput) -> Result<PredictionOutput> {
        self.post("predict", input).await
    }

    /// Query `/health`; an unhealthy service still returns a report
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.send_get("health").await?;

        if response.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return response.json().await.context("Failed to parse response");
        }
        parse_response(response).await
    }
}

/// Decode a success body, or turn the service's `detail` into an error
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        anyhow::bail!("API error ({}): {}", status, detail);
    }

    response.json().await.context("Failed to parse response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use predictor_lib::ModelStatus;

    #[tokio::test]
    async fn test_predict_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header("content-type", "application/json")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"predicted_age": 11.25}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let output = client.predict(&AbaloneInput::example()).await.unwrap();

        assert_eq!(output.predicted_age, 11.25);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_predict_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(500)
            .with_body(r#"{"detail": "Prediction failed: pipeline missing"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.predict(&AbaloneInput::example()).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Prediction failed: pipeline missing"));
    }

    #[tokio::test]
    async fn test_health_reads_unavailable_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .with_body(r#"{"status": "unhealthy", "error": "no artifact"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health = client.health().await.unwrap();

        assert_eq!(health.status, ModelStatus::Unhealthy);
        assert_eq!(health.error.as_deref(), Some("no artifact"));
    }

    #[tokio::test]
    async fn test_health_reads_ok_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(
                r#"{"status": "healthy", "model_loaded": true, "pipeline_path": "models/p.bin"}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health = client.health().await.unwrap();

        assert_eq!(health.status, ModelStatus::Healthy);
        assert_eq!(health.pipeline_path.as_deref(), Some("models/p.bin"));
    }

    #[tokio::test]
    async fn test_health_other_errors_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(404)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        assert!(client.health().await.is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
