use crate::Result;
use crate::structs::{ConnectRequest, ConnectResponse, DeviceStatus, DisconnectResponse, ScanResponse};
use crate::traits::DeviceApi;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Talks to the clock firmware over plain HTTP.
///
/// No timeout is configured: an in-flight request is never cancelled. The
/// HTTP status code is not checked; whatever body the device sends is parsed
/// as JSON, and only transport or parse failures become errors.
#[derive(Debug, Clone)]
pub struct HttpDevice {
    client: Client,
    base_url: String,
}

impl HttpDevice {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().no_proxy().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            tracing::debug!("Device answered {} ({} bytes)", status, body.len());
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl DeviceApi for HttpDevice {
    async fn scan(&self) -> Result<ScanResponse> {
        self.get_json("/api/scan").await
    }

    async fn status(&self) -> Result<DeviceStatus> {
        self.get_json("/api/status").await
    }

    async fn connect(&self, request: &ConnectRequest) -> Result<ConnectResponse> {
        let url = self.url("/api/connect");
        tracing::debug!(ssid = %request.ssid, "POST {}", url);
        let response = self.client.post(&url).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn disconnect(&self) -> Result<DisconnectResponse> {
        let url = self.url("/api/disconnect");
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).send().await?;
        Self::read_json(response).await
    }
}
