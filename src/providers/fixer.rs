use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, instrument};
use url::Url;

use crate::core::config::{ENV_API_KEY, ENV_API_URL, KeyLocation, ProviderConfig};
use crate::core::rates::{FetchError, RateProvider, RateTable};

const USER_AGENT: &str = concat!("fxconv/", env!("CARGO_PKG_VERSION"));
const API_HOST_HEADER: &str = "X-RapidAPI-Host";

/// Rate provider for fixer.io style `latest` endpoints.
///
/// Works with the plain fixer.io API (key as `access_key` query parameter),
/// the apilayer gateway (key in an `apikey` header) and RapidAPI mirrors
/// (key header plus `X-RapidAPI-Host`).
pub struct FixerProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl FixerProvider {
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(FixerProvider { config, client })
    }

    fn api_key(&self) -> Result<&str, FetchError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FetchError::MissingConfig(format!("set {ENV_API_KEY} or provider.api_key"))
            })
    }

    fn request(&self) -> Result<reqwest::RequestBuilder, FetchError> {
        let base_url = self.config.base_url.trim();
        if base_url.is_empty() {
            return Err(FetchError::MissingConfig(format!(
                "set {ENV_API_URL} or provider.base_url"
            )));
        }
        let api_key = self.api_key()?;

        let mut url = Url::parse(base_url).map_err(|e| {
            FetchError::MissingConfig(format!("invalid API URL {base_url}: {e}"))
        })?;
        if self.config.key_location == KeyLocation::Query {
            url.query_pairs_mut()
                .append_pair(self.config.key_name(), api_key);
        }

        let mut request = self.client.get(url);
        if self.config.key_location == KeyLocation::Header {
            request = request.header(self.config.key_name(), api_key);
        }
        if let Some(host) = self.config.api_host.as_deref() {
            request = request.header(API_HOST_HEADER, host);
        }
        Ok(request)
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    success: Option<bool>,
    base: Option<String>,
    date: Option<NaiveDate>,
    rates: Option<BTreeMap<String, f64>>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl ProviderErrorBody {
    fn describe(&self) -> String {
        let message = self
            .info
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("unknown error");
        match self.code {
            Some(code) => format!("{message} (code {code})"),
            None => message.to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for FixerProvider {
    #[instrument(name = "FixerRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        let request = self.request()?;
        debug!(base_url = %self.config.base_url, "Requesting latest rates");

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        debug!(status = %response.status(), "Received rates response");
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let data: RatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %text,
                    "Failed to parse rates response"
                );
                return Err(FetchError::Malformed(e.to_string()));
            }
        };

        if let Some(err) = &data.error {
            return Err(FetchError::Provider(err.describe()));
        }
        if data.success == Some(false) {
            return Err(FetchError::Provider("request unsuccessful".to_string()));
        }
        let rates = data.rates.ok_or(FetchError::MissingRates)?;

        Ok(RateTable {
            base: data.base,
            date: data.date,
            rates,
        })
    }
}
