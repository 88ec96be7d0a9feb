use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use crate::api::{FetchError, HttpDeviceApi};
use crate::channel::{LiveChannel, WsConnector};
use crate::config::ClientConfig;
use crate::endpoint::{Endpoint, EndpointError};
use crate::poller::{PollerHandle, ResourcePoller};
use crate::reconciler::Reconciler;
use crate::snapshot::ViewState;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Http(#[from] FetchError),
}

/// Poller and push channel feeding one reconciler, started and stopped together.
pub struct DashboardClient {
    endpoint: Endpoint,
    reconciler: Arc<Reconciler>,
    poller: PollerHandle,
    channel: LiveChannel,
}

impl DashboardClient {
    pub fn start(config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = Endpoint::parse(&config.endpoint)?;
        let ws_url = endpoint.ws_url()?;
        let api = Arc::new(HttpDeviceApi::new(endpoint.clone(), config.request_timeout)?);
        let reconciler = Arc::new(Reconciler::new());

        info!(endpoint = %endpoint, ws = %ws_url, "starting dashboard client");

        let poller = ResourcePoller::start(api, config.poll_interval, reconciler.clone());
        let channel = LiveChannel::start(
            WsConnector::new(config.connect_timeout),
            ws_url,
            config.reconnect_delay,
            reconciler.clone(),
        );

        Ok(Self {
            endpoint,
            reconciler,
            poller,
            channel,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.reconciler.subscribe()
    }

    pub fn view(&self) -> ViewState {
        self.reconciler.current()
    }

    pub async fn stop(&mut self) {
        self.channel.stop().await;
        self.poller.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{sleep, timeout};

    use super::*;
    use crate::fake_device::{firmware_routes, serve};
    use crate::snapshot::ConnectionState;

    #[tokio::test]
    async fn start_polls_device_and_stop_freezes_view() {
        // Arrange: the firmware routes answer 404 on /ws, so every open fails
        let addr = serve(firmware_routes).await;
        let config = ClientConfig {
            endpoint: format!("http://{addr}"),
            reconnect_delay: Duration::from_millis(50),
            ..ClientConfig::default()
        };

        // Act
        let mut client = DashboardClient::start(&config).expect("start");
        let mut rx = client.subscribe();
        let polled = timeout(
            Duration::from_secs(10),
            rx.wait_for(|view| view.status.is_some() && view.gps.is_some() && view.ntp.is_some()),
        )
        .await
        .is_ok_and(|waited| waited.is_ok());
        client.stop().await;
        client.stop().await;
        let frozen = client.view();
        sleep(Duration::from_millis(300)).await;

        // Assert
        assert!(polled, "first poll never landed: {:?}", client.view());
        assert_eq!(client.endpoint().base(), format!("http://{addr}"));
        assert_eq!(frozen.displayed_epoch(), Some(1_700_000_000));
        assert_ne!(frozen.connection, ConnectionState::Connected);
        assert_eq!(client.view(), frozen);
    }

    #[test]
    fn start_rejects_bad_endpoint() {
        let config = ClientConfig {
            endpoint: "ftp://device".to_string(),
            ..ClientConfig::default()
        };

        assert!(matches!(
            DashboardClient::start(&config),
            Err(ClientError::Endpoint(EndpointError::UnsupportedScheme(_)))
        ));
    }
}
