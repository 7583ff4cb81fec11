// Skytap REST API client
//
// Wraps `reqwest::Client` with Skytap URL construction, basic auth, a
// bounded retry loop for transient transport failures, and translation
// of non-2xx responses into `Error::HttpRequestFailed`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, ErrorBody};
use crate::models::Configuration;
use crate::transport::TransportConfig;

/// Collection that holds Skytap environments.
pub const RESOURCE_NAME: &str = "configurations";

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// HTTP client for the Skytap REST API.
///
/// Owns a pooled `reqwest::Client`; sockets are released when this value
/// is dropped.
pub struct SkytapClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    api_token: SecretString,
    max_retries: u32,
    timeout: Duration,
}

impl SkytapClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `https://cloud.skytap.com/v2/`.
    pub fn new(
        base_url: Url,
        username: String,
        api_token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            username,
            api_token,
            max_retries: transport.max_retries,
            timeout: transport.timeout,
        })
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join `resource` onto `base` and append `query` pairs in order.
    ///
    /// Joining follows RFC 3986 reference resolution, so a base without a
    /// trailing slash loses its last path segment. Repeated keys are kept.
    pub fn construct_url(base: &Url, resource: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = base.join(resource)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Fetch one environment: `GET {base}/configurations/{id}.json`.
    pub async fn get_configuration(&self, configuration_id: &str) -> Result<Configuration, Error> {
        let resource = format!("{RESOURCE_NAME}/{configuration_id}.json");
        self.get(&resource, &[]).await
    }

    /// Send a GET request for `resource` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = Self::construct_url(&self.base_url, resource, query)?;
        debug!("GET {}", url);

        let mut attempt = 0;
        let resp = loop {
            let sent = self
                .http
                .get(url.clone())
                .basic_auth(&self.username, Some(self.api_token.expose_secret()))
                .send()
                .await
                .map_err(|e| self.transport_error(e));

            match sent {
                Ok(resp) => break resp,
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, max_retries = self.max_retries, error = %err, "retrying GET {resource}");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(err) => return Err(err),
            }
        };

        debug!(status = %resp.status(), "response for {resource}");
        Self::handle_response(resp, resource).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Turn a non-2xx status into `HttpRequestFailed`, otherwise decode the body.
    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        resource: &str,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::HttpRequestFailed {
                status: status.as_u16(),
                resource: resource.to_owned(),
                body: ErrorBody::from_text(body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn joins_resource_onto_versioned_base() {
        let url =
            SkytapClient::construct_url(&base("https://cloud.skytap.com/v2/"), "configurations/42.json", &[])
                .unwrap();
        assert_eq!(url.as_str(), "https://cloud.skytap.com/v2/configurations/42.json");
    }

    #[test]
    fn joins_resource_onto_bare_host() {
        let url = SkytapClient::construct_url(
            &base("https://fixture.example.net"),
            "configurations/0000000.json",
            &[],
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://fixture.example.net/configurations/0000000.json");
    }

    #[test]
    fn query_pairs_are_encoded_in_order_with_repeats() {
        let url = SkytapClient::construct_url(
            &base("https://example.test/v2/"),
            "configurations",
            &[("scope", "company"), ("query", "name:web tier"), ("scope", "me")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/v2/configurations?scope=company&query=name%3Aweb+tier&scope=me"
        );
    }

    #[test]
    fn absolute_resource_replaces_base() {
        let url = SkytapClient::construct_url(
            &base("https://example.test/v2/"),
            "https://other.test/configurations/1.json",
            &[],
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://other.test/configurations/1.json");
    }
}
