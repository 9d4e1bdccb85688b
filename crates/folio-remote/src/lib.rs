// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use folio_app::ProfileRecord;
use folio_store::ProfileBackend;
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub use folio_store::DEFAULT_TABLE;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    table: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("remote.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("remote.base_url {base_url:?} is not a valid URL"))?;
        if api_key.trim().is_empty() {
            bail!("remote.api_key must not be empty; set it in the config or FOLIO_API_KEY");
        }
        if !is_safe_identifier(table) {
            bail!("remote.table {table:?} must be a plain identifier (letters, digits, underscore)");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            api_key: api_key.to_owned(),
            table: table.to_owned(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn table_url(&self, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))
            .context("build table URL")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

impl ProfileBackend for Client {
    fn fetch(&self, key: &str) -> Result<Option<Value>> {
        let filter = format!("eq.{key}");
        let url = self.table_url(&[("select", "value"), ("key", &filter)])?;
        debug!(key, url = %url, "remote fetch");

        let rows: Vec<ValueRow> = self
            .send(self.http.get(url))?
            .json()
            .with_context(|| format!("decode record {key}"))?;
        Ok(rows.into_iter().next().map(|row| row.value))
    }

    fn fetch_all(&self) -> Result<Vec<ProfileRecord>> {
        let url = self.table_url(&[("select", "key,value")])?;
        debug!(url = %url, "remote fetch all");

        self.send(self.http.get(url))?
            .json()
            .context("decode record listing")
    }

    fn update(&self, key: &str, value: &Value) -> Result<()> {
        let filter = format!("eq.{key}");
        let url = self.table_url(&[("key", &filter)])?;
        debug!(key, url = %url, "remote update");

        let request = self
            .http
            .patch(url)
            .header("Prefer", "return=representation")
            .json(&json!({ "value": value }));
        let rows: Vec<Value> = self
            .send(request)?
            .json()
            .with_context(|| format!("decode update result for {key}"))?;
        if rows.is_empty() {
            bail!("no record for key `{key}`; the row must exist before it can be saved");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ValueRow {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorEnvelope {
    error: Option<String>,
    error_description: Option<String>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check remote.base_url and your network ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ServiceErrorEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if let Ok(parsed) = serde_json::from_str::<GatewayErrorEnvelope>(body)
        && let Some(error) = parsed.error_description.or(parsed.error)
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}
