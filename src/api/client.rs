use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Environment variable naming the analysis-service base URL.
pub const SERVER_URL_ENV: &str = "TICKERTERM_SERVER_URL";

static CLIENT: OnceLock<ApiClient> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with an `{"error": "..."}` envelope.
    #[error("{0}")]
    Server(String),
    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin JSON client over the analysis service. Every endpoint returns
/// either its result payload or an `error` string field; the envelope is
/// unwrapped here so call sites only see typed results.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let value: Value = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let value = reject_error_envelope(value)?;
        Ok(serde_json::from_value(value)?)
    }
}

fn reject_error_envelope(value: Value) -> Result<Value, ApiError> {
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Server(message.to_string()));
    }
    Ok(value)
}

/// Install the global client. Called once at startup, before the app
/// enters fullscreen mode.
pub fn init(base_url: &str) -> anyhow::Result<()> {
    CLIENT
        .set(ApiClient::new(base_url))
        .map_err(|_| anyhow::anyhow!("API client already initialized"))
}

pub fn client() -> &'static ApiClient {
    CLIENT
        .get()
        .expect("API client not initialized, call api::client::init() first")
}

#[must_use]
pub fn missing_required_env() -> Vec<&'static str> {
    [SERVER_URL_ENV]
        .into_iter()
        .filter(|key| {
            std::env::var(key)
                .ok()
                .is_none_or(|value| value.trim().is_empty())
        })
        .collect()
}

/// Display config guide (when required configuration is absent).
pub fn print_config_guide() {
    eprintln!("Configuration error: required environment variable missing");
    eprintln!();
    eprintln!("Set the following before starting:");
    eprintln!("  {SERVER_URL_ENV}=<http://host:port of the analysis service>");
    eprintln!();
    eprintln!("Optional: TICKERTERM_SYMBOL / TICKERTERM_PERIOD choose the initial chart");
    eprintln!("Optional: TICKERTERM_LOCALE sets the UI language (e.g. en)");
    eprintln!("Optional: TICKERTERM_LOG adjusts log filtering (e.g. error,tickerterm=info)");
    eprintln!();
    eprintln!("Hint: a .env file in the working directory is loaded on startup");
}

#[cfg(test)]
mod tests {
    use super::{missing_required_env, reject_error_envelope, ApiClient, ApiError};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(previous) = &self.previous {
                std::env::set_var(self.key, previous);
            } else {
                std::env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn surfaces_the_error_envelope() {
        let err = reject_error_envelope(serde_json::json!({"error": "Invalid stock symbol"}))
            .expect_err("error envelope should be rejected");
        match err {
            ApiError::Server(message) => assert_eq!(message, "Invalid stock symbol"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn passes_plain_payloads_through() {
        let value = reject_error_envelope(serde_json::json!({"symbol": "AAPL"}))
            .expect("payload without envelope");
        assert_eq!(value["symbol"], "AAPL");
    }

    #[test]
    fn detects_missing_required_environment_variables() {
        let _url = EnvGuard::set(super::SERVER_URL_ENV, Some("  "));
        assert!(missing_required_env().contains(&super::SERVER_URL_ENV));
    }
}
