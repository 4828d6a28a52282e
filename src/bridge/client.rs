//! HTTP client for the search index: basic auth from the secrets file, TLS
//! toggles from the environment, bulk NDJSON support.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::utils::{SearchCredentials, SslSettings, load_credentials, ssl_settings};

pub struct SearchClient {
    http: Client,
    base: String,
    creds: SearchCredentials,
}

impl SearchClient {
    /// Connect to `host:port` using the ambient SSL settings and the
    /// operator's credentials.
    pub fn connect(address: &str) -> Result<Self> {
        let (host, port) = address
            .split_once(':')
            .with_context(|| format!("invalid address {address}; use host:port"))?;
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid port in {address}"))?;
        let SslSettings {
            use_ssl,
            verify_certs,
        } = ssl_settings();
        let scheme = if use_ssl { "https" } else { "http" };
        let http = Client::builder()
            .danger_accept_invalid_certs(!verify_certs)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base: format!("{scheme}://{host}:{port}"),
            creds: load_credentials()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn get(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .send()
            .with_context(|| format!("GET {path}"))?;
        parse_response(resp, path)
    }

    pub fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .put(self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .json(body)
            .send()
            .with_context(|| format!("PUT {path}"))?;
        parse_response(resp, path)
    }

    pub fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .json(body)
            .send()
            .with_context(|| format!("POST {path}"))?;
        parse_response(resp, path)
    }

    pub fn delete(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .delete(self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .send()
            .with_context(|| format!("DELETE {path}"))?;
        parse_response(resp, path)
    }

    /// Bulk request: newline-delimited action/document pairs.
    pub fn bulk(&self, ndjson: String) -> Result<Value> {
        let resp = self
            .http
            .post(self.url("/_bulk"))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .header("content-type", "application/x-ndjson")
            .body(ndjson)
            .send()
            .context("POST /_bulk")?;
        parse_response(resp, "/_bulk")
    }
}

fn parse_response(resp: reqwest::blocking::Response, path: &str) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp
        .json()
        .with_context(|| format!("parse response from {path}"))?;
    if !status.is_success() {
        anyhow::bail!("{path} returned {status}: {body}");
    }
    Ok(body)
}
