//! HTTP client for the bus endpoint.

use pollbus_core::{Cursor, Message, WireMessage};
use reqwest::{header, Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, Debug)]
pub struct BusClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl BusClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Post a message as `author`.
    pub async fn post(&self, text: &str, author: &str) -> Result<()> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("m", text)
            .append_pair("u", author)
            .finish();
        self.send_form(body).await?;
        Ok(())
    }

    /// One long poll: messages after `cursor`, or an empty vector once the
    /// server's poll timeout passes.
    pub async fn poll(&self, cursor: &Cursor) -> Result<Vec<WireMessage>> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("t", &cursor.to_string())
            .finish();
        debug!("Polling {} after {:?}", self.config.endpoint, cursor.id());

        let response = self.send_form(body).await?;
        Ok(response.json().await?)
    }

    /// Every record the server currently stores.
    pub async fn dump(&self) -> Result<Vec<Message>> {
        let response = self.get_with_flag("dump").await?;
        Ok(response.json().await?)
    }

    /// Wipe the server's log.
    pub async fn clear(&self) -> Result<()> {
        self.get_with_flag("clear").await?;
        Ok(())
    }

    async fn send_form(&self, body: String) -> Result<Response> {
        let response = self
            .http
            .post(self.config.endpoint.clone())
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        check_status(response).await
    }

    async fn get_with_flag(&self, flag: &str) -> Result<Response> {
        let mut url = self.config.endpoint.clone();
        url.set_query(Some(flag));
        let response = self.http.get(url).send().await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::GONE {
        return Err(ClientError::HistoryDropped);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
