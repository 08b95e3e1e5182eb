use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::Config;

pub const AUTH_CODE_GRANT_TYPE: &str = "authorization_code";
pub const AUTH_CODE_RESPONSE_TYPE: &str = "code";
pub const READ_SCOPE: &str = "read";
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Turns an authorization code into an access token.
///
/// The exchange server calls this once per `/auth` redirect; any error
/// sends the browser to the error page.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges codes against the Stepik token endpoint.
pub struct StepikTokenExchanger {
    token_endpoint: String,
    client_id: String,
    redirect_uri: String,
    client: Client,
}

impl StepikTokenExchanger {
    pub fn new(token_endpoint: &str, client_id: &str, redirect_uri: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(EXCHANGE_TIMEOUT)
            .build()
            .map_err(|e| eyre!("failed to build http client: {}", e))?;

        Ok(StepikTokenExchanger {
            token_endpoint: token_endpoint.to_string(),
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.token_endpoint(),
            config.client_id()?,
            &config.redirect_uri(),
        )
    }
}

#[async_trait]
impl TokenExchanger for StepikTokenExchanger {
    async fn exchange_code(&self, code: &str) -> Result<String> {
        let form = [
            ("grant_type", AUTH_CODE_GRANT_TYPE),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
        ];

        log::debug!("exchanging authorization code at {}", self.token_endpoint);

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("token endpoint returned {}: {}", status, body));
        }

        let token = response.json::<TokenResponse>().await?;

        if token.access_token.is_empty() {
            return Err(eyre!("token endpoint returned an empty access_token"));
        }

        log::debug!(
            "received {} token, expires in {:?}s",
            token.token_type.as_deref().unwrap_or("unknown"),
            token.expires_in
        );

        Ok(token.access_token)
    }
}

/// URL the user opens to grant access; Stepik redirects back to `config.redirect_uri()`
pub fn authorization_url(config: &Config) -> Result<Url> {
    let url = Url::parse_with_params(
        &config.authorize_endpoint(),
        &[
            ("response_type", AUTH_CODE_RESPONSE_TYPE),
            ("client_id", config.client_id()?),
            ("redirect_uri", config.redirect_uri().as_str()),
            ("scope", READ_SCOPE),
        ],
    )?;

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let config = Config::new("https://stepik.org").with_client_id("abc123");
        let url = authorization_url(&config).unwrap();

        assert_eq!(url.host_str(), Some("stepik.org"));
        assert_eq!(url.path(), "/oauth2/authorize/");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("response_type".to_string(), "code".to_string()),
                ("client_id".to_string(), "abc123".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://127.0.0.1:8912/auth".to_string()
                ),
                ("scope".to_string(), "read".to_string()),
            ]
        );
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let config = Config::new("https://stepik.org");
        let result = authorization_url(&config);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("STEPIK_CLIENT_ID"));
    }

    #[test]
    fn test_exchanger_from_config_requires_client_id() {
        let config = Config::new("https://stepik.org");
        assert!(StepikTokenExchanger::from_config(&config).is_err());

        let config = config.with_client_id("abc123");
        let exchanger = StepikTokenExchanger::from_config(&config).unwrap();
        assert_eq!(exchanger.token_endpoint, "https://stepik.org/oauth2/token/");
        assert_eq!(exchanger.redirect_uri, "http://127.0.0.1:8912/auth");
    }
}
