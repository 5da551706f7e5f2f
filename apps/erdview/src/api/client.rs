//! # Catalog HTTP Client
//!
//! Fetches the table catalog from the CRM export endpoint and parses it with
//! the core's lenient catalog rules. One fetch per call; the caller's
//! session guard prevents concurrent triggers.

use erdview_core::Catalog;

/// Errors from the catalog client layer.
#[derive(Debug)]
pub enum ClientError {
    /// Cannot reach the catalog API at all.
    ConnectionFailed(String),
    /// The API answered with a non-success status.
    HttpStatus(u16),
    /// The response body was not a parseable catalog.
    Parse(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(detail) => write!(f, "connection failed: {detail}"),
            Self::HttpStatus(status) => write!(f, "API returned status {status}"),
            Self::Parse(detail) => write!(f, "malformed catalog payload: {detail}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// HTTP client for the catalog endpoint.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new client pointing at the given catalog API base URL.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/erd_tables.json` and parse the catalog.
    ///
    /// Container-level leniency (missing/non-array `tables`) is handled by
    /// the catalog deserializer; anything else malformed is an error.
    pub async fn fetch_tables(&self) -> Result<Catalog, ClientError> {
        let url = format!("{}/erd_tables.json", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus(status.as_u16()));
        }

        response
            .json::<Catalog>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// User-facing remediation message for a failed fetch. This is what the
    /// sync status line shows; the diagram itself is untouched.
    #[must_use]
    pub fn remediation(&self, error: &ClientError) -> String {
        match error {
            ClientError::ConnectionFailed(_) => format!(
                "Could not reach the catalog API at {}. Check that it is running \
                 (erdview serve, default port 8765) and try again.",
                self.base_url
            ),
            ClientError::HttpStatus(status) => format!(
                "The catalog API at {} answered with status {}. Check the server \
                 logs and try again.",
                self.base_url, status
            ),
            ClientError::Parse(_) => format!(
                "The catalog API at {} returned an unreadable payload. Re-export \
                 the tables and try again.",
                self.base_url
            ),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_normalized() {
        let client = CatalogClient::new("http://localhost:8765/".to_string());
        assert_eq!(client.base_url(), "http://localhost:8765");
    }

    #[test]
    fn remediation_names_the_endpoint() {
        let client = CatalogClient::new("http://crm.internal:8765".to_string());
        let message =
            client.remediation(&ClientError::ConnectionFailed("refused".to_string()));
        assert!(message.contains("http://crm.internal:8765"));
        assert!(message.contains("try again"));

        let message = client.remediation(&ClientError::HttpStatus(503));
        assert!(message.contains("503"));
    }
}
