use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint {0}: {1}")]
    Invalid(String, String),
    #[error("unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),
}

/// Base URL of the device, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|err| EndpointError::Invalid(raw.to_string(), err.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(EndpointError::Invalid(raw.to_string(), "missing host".to_string()));
        }

        Ok(Self {
            base: trimmed.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn resource_url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Push channel URL: same host, `ws`/`wss` scheme, path `/ws`.
    pub fn ws_url(&self) -> Result<String, EndpointError> {
        let mut url = Url::parse(&self.base)
            .map_err(|err| EndpointError::Invalid(self.base.clone(), err.to_string()))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| EndpointError::UnsupportedScheme(scheme.to_string()))?;
        url.set_path("/ws");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url.to_string())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let endpoint = Endpoint::parse("http://192.168.1.40/").expect("parse");
        assert_eq!(endpoint.base(), "http://192.168.1.40");
        assert_eq!(
            endpoint.resource_url("/api/status"),
            "http://192.168.1.40/api/status"
        );
    }

    #[test]
    fn ws_url_follows_scheme() {
        let plain = Endpoint::parse("http://gps-ntp.local:8080").expect("parse");
        assert_eq!(plain.ws_url().expect("ws"), "ws://gps-ntp.local:8080/ws");

        let secure = Endpoint::parse("https://example.com/dashboard/").expect("parse");
        assert_eq!(secure.ws_url().expect("ws"), "wss://example.com/ws");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            Endpoint::parse("ftp://device"),
            Err(EndpointError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            Endpoint::parse("not a url"),
            Err(EndpointError::Invalid(_, _))
        ));
    }
}
