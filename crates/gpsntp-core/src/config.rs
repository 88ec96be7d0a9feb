use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_millis(4000),
            request_timeout: Duration::from_millis(3000),
            reconnect_delay: Duration::from_millis(2000),
            connect_timeout: Duration::from_millis(5000),
        }
    }
}
