use color_eyre::eyre::{eyre, Result};
use core::fmt;
use reqwest::{header::HeaderMap, Client};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::auth::BEARER_TOKEN_TYPE;
use crate::config::Config;
use crate::VERSION;

use super::types::{ApiEntity, ApiError, Course, Section, Stepic};

const IDS_PARAM: &str = "ids[]";

pub struct StepikAPIClient {
    pub api_url: String,
    client: Client,
    token: SecretString,
}

impl StepikAPIClient {
    pub fn new(api_url: &str, token: SecretString) -> StepikAPIClient {
        StepikAPIClient {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            token,
        }
    }

    pub fn from_config(config: &Config, token: &str) -> StepikAPIClient {
        StepikAPIClient::new(&config.api_url(), SecretString::from(token.to_string()))
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("{} {}", BEARER_TOKEN_TYPE, self.token.expose_secret()).parse()?,
        );
        headers.insert("Accept", "application/json".parse()?);
        Ok(headers)
    }

    /// GET `endpoint` and pull the `T::PATH` array out of the envelope
    async fn get<T: ApiEntity>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.api_url, endpoint);

        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let message = serde_json::from_str::<ApiError>(&error_text)
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or(error_text);
            return Err(eyre!("{} ({})", message, status));
        }

        let mut envelope = response.json::<Value>().await?;
        let records = envelope
            .get_mut(T::PATH)
            .map(Value::take)
            .ok_or_else(|| eyre!("response has no '{}' field", T::PATH))?;

        Ok(serde_json::from_value(records)?)
    }

    async fn get_one<T: ApiEntity>(&self, id: i64) -> Result<T> {
        let endpoint = format!("{}/{}", T::PATH, id);
        self.get::<T>(&endpoint, &[])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| eyre!("{} {} not found", T::NAME, id))
    }

    async fn get_many<T: ApiEntity>(&self, ids: &[i64]) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query: Vec<(&str, String)> = ids.iter().map(|id| (IDS_PARAM, id.to_string())).collect();
        self.get::<T>(T::PATH, &query).await
    }
}

impl StepikAPIClient {
    /// id of the user the token belongs to
    pub async fn me(&self) -> Result<i64> {
        let stepic = self.get_one::<Stepic>(1).await?;
        Ok(stepic.user)
    }

    pub async fn course(&self, id: i64) -> Result<Course> {
        self.get_one(id).await
    }

    pub async fn courses(&self, ids: &[i64]) -> Result<Vec<Course>> {
        self.get_many(ids).await
    }

    pub async fn section(&self, id: i64) -> Result<Section> {
        self.get_one(id).await
    }

    pub async fn sections(&self, ids: &[i64]) -> Result<Vec<Section>> {
        self.get_many(ids).await
    }
}

impl fmt::Display for StepikAPIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cli_version: {} api_url: {}", VERSION, self.api_url)
    }
}
