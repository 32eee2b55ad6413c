// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Publish Android App Bundles to Google Play.
//!
//! Publishing is a fixed sequence against the Android Publisher API: a service account
//! assertion is exchanged for an access token, an edit is opened for the package, the bundle
//! is uploaded into that edit and the edit is committed.

mod api_token;
pub mod cli;
pub mod edits_api;
mod publish;
mod service_account;

use {
    reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response},
    serde_json::Value,
    std::time::{Duration, SystemTime},
    thiserror::Error,
};

pub use crate::api_token::{AccessToken, AssertionClaims, AssertionEncoder};
pub use crate::publish::{check_inputs, InputFileKind, MissingInputFile, PublishOutcome};
pub use crate::service_account::{InvalidPemPrivateKey, ServiceAccountKey};

pub type Result<T> = anyhow::Result<T>;

/// OAuth 2.0 token endpoint. Also the audience of every signed assertion.
pub const GOOGLE_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth scope granting access to the Android Publisher API.
pub const ANDROID_PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

pub const ANDROID_PUBLISHER_API_URL: &str =
    "https://androidpublisher.googleapis.com/androidpublisher/v3";

pub const ANDROID_PUBLISHER_UPLOAD_URL: &str =
    "https://androidpublisher.googleapis.com/upload/androidpublisher/v3";

/// Endpoints, timeouts and lifetimes used while publishing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublisherConfig {
    /// Where signed assertions are exchanged for access tokens.
    pub token_url: String,
    /// Base URL of the Android Publisher REST API.
    pub api_base_url: String,
    /// Base URL for media uploads to the Android Publisher API.
    pub upload_base_url: String,
    /// Ceiling applied to every request, uploads included.
    pub timeout: Duration,
    /// Validity of signed assertions, and of access tokens when the server doesn't say.
    pub token_lifetime: Duration,
    /// Requested lifetime of the edit.
    pub edit_lifetime: Duration,
    pub user_agent: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            token_url: GOOGLE_OAUTH_TOKEN_URL.to_string(),
            api_base_url: ANDROID_PUBLISHER_API_URL.to_string(),
            upload_base_url: ANDROID_PUBLISHER_UPLOAD_URL.to_string(),
            timeout: Duration::from_secs(300),
            token_lifetime: Duration::from_secs(600),
            edit_lifetime: Duration::from_secs(600),
            user_agent: concat!("play-bundle-upload/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PublisherConfig {
    /// Point all endpoints at another host, keeping Google's path layout.
    ///
    /// `base_url` should not have a trailing slash.
    pub fn with_base_urls(self, base_url: &str) -> Self {
        Self {
            token_url: format!("{base_url}/token"),
            api_base_url: format!("{base_url}/androidpublisher/v3"),
            upload_base_url: format!("{base_url}/upload/androidpublisher/v3"),
            ..self
        }
    }
}

/// Seconds since the UNIX epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("calculating UNIX time should never fail")
        .as_secs()
}

/// A client for the Android Publisher API.
pub struct PlayPublisherClient {
    client: Client,
    config: PublisherConfig,
}

impl PlayPublisherClient {
    /// Create a new client using the given configuration.
    pub fn new(config: PublisherConfig) -> Result<Self> {
        let client = ClientBuilder::default()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Attach the access token to a request.
    fn authorize(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        if token.is_expired() {
            log::warn!(
                "access token was obtained {}s ago and has likely expired",
                token.age().as_secs()
            );
        }

        request.bearer_auth(token.secret())
    }

    pub fn send_request(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();

        log::debug!("{} {}", request.method(), url);

        let response = self.client.execute(request)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.bytes()?;

            let message = if let Ok(value) = serde_json::from_slice::<Value>(body.as_ref()) {
                serde_json::to_string_pretty(&value)?
            } else {
                String::from_utf8_lossy(body.as_ref()).into()
            };

            Err(PlayApiError {
                method,
                url,
                status,
                message,
            }
            .into())
        }
    }
}

/// A request to Google answered with a non-success status.
#[derive(Clone, Debug, Error)]
#[error("FAILED: '{method} {url}' failed with HTTP {status}:\n{message}")]
pub struct PlayApiError {
    method: String,
    url: String,
    status: u16,
    message: String,
}

impl PlayApiError {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response body, pretty printed when it was JSON.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_targets_google() {
        let config = PublisherConfig::default();

        assert_eq!(config.token_url, "https://oauth2.googleapis.com/token");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.token_lifetime, Duration::from_secs(600));
        assert_eq!(config.edit_lifetime, Duration::from_secs(600));
        assert!(config.user_agent.starts_with("play-bundle-upload/"));
    }

    #[test]
    fn base_url_override_keeps_paths_and_limits() {
        let config = PublisherConfig::default().with_base_urls("http://127.0.0.1:8080");

        assert_eq!(config.token_url, "http://127.0.0.1:8080/token");
        assert_eq!(
            config.api_base_url,
            "http://127.0.0.1:8080/androidpublisher/v3"
        );
        assert_eq!(
            config.upload_base_url,
            "http://127.0.0.1:8080/upload/androidpublisher/v3"
        );
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn api_error_reports_request_and_body() {
        let err = PlayApiError {
            method: "POST".into(),
            url: "https://oauth2.googleapis.com/token".into(),
            status: 401,
            message: "unauthorized".into(),
        };

        assert_eq!(
            err.to_string(),
            "FAILED: 'POST https://oauth2.googleapis.com/token' failed with HTTP 401:\nunauthorized"
        );
        assert_eq!(err.status(), 401);
    }
}
