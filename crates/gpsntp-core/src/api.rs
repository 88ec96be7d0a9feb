use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::snapshot::{GpsSnapshot, NtpSnapshot, StatusSnapshot};

pub const STATUS_PATH: &str = "/api/status";
pub const GPS_PATH: &str = "/api/gps";
pub const NTP_PATH: &str = "/api/ntp";
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// The three polled device resources.
#[async_trait]
pub trait DeviceApi: Send + Sync + 'static {
    async fn fetch_status(&self) -> Result<StatusSnapshot, FetchError>;
    async fn fetch_gps(&self) -> Result<GpsSnapshot, FetchError>;
    async fn fetch_ntp(&self) -> Result<NtpSnapshot, FetchError>;
}

pub struct HttpDeviceApi {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl HttpDeviceApi {
    pub fn new(endpoint: Endpoint, request_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Liveness check; the firmware answers a bare `OK`.
    pub async fn health(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.endpoint.resource_url(HEALTH_PATH))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?.trim().to_string())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(self.endpoint.resource_url(path))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot, FetchError> {
        self.get_json(STATUS_PATH).await
    }

    async fn fetch_gps(&self) -> Result<GpsSnapshot, FetchError> {
        self.get_json(GPS_PATH).await
    }

    async fn fetch_ntp(&self) -> Result<NtpSnapshot, FetchError> {
        self.get_json(NTP_PATH).await
    }
}
