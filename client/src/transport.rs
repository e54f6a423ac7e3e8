// Tzwitter Client
// Copyright (C) 2023 Tzwitter contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License version 3 as
// published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! HTTP access to the rollup node and the Tezos node.
//!
//! [Transport] performs raw requests. [get_json] and [post_json] add status checking, logging and
//! JSON decoding on top. Requests are never retried.
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::Error;

/// Status and body of an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs GET and POST requests with JSON bodies.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, Error>;

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse, Error>;
}

/// [Transport] implementation using [reqwest].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|source| Error::Http {
                url: String::new(),
                source,
            })?;
        Ok(HttpTransport { client })
    }

    async fn into_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<HttpResponse, Error> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;
        HttpTransport::into_response(url, response).await
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse, Error> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;
        HttpTransport::into_response(url, response).await
    }
}

/// GET `url` and decode the JSON response.
pub async fn get_json<T, R>(transport: &T, url: &str) -> Result<R, Error>
where
    T: Transport + ?Sized,
    R: DeserializeOwned,
{
    let response = transport.get(url).await?;
    log::debug!("GET {} -> {}", url, response.status);
    decode("GET", url, None, response)
}

/// POST `body` as JSON to `url` and decode the JSON response.
pub async fn post_json<T, B, R>(transport: &T, url: &str, body: &B) -> Result<R, Error>
where
    T: Transport + ?Sized,
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let body = serde_json::to_value(body).map_err(|source| Error::Json {
        url: url.to_string(),
        source,
    })?;
    let response = transport.post(url, &body).await?;
    log::debug!("POST {} -> {}", url, response.status);
    log::trace!("POST {} body: {}", url, body);
    decode("POST", url, Some(&body), response)
}

fn decode<R: DeserializeOwned>(
    method: &'static str,
    url: &str,
    request_body: Option<&serde_json::Value>,
    response: HttpResponse,
) -> Result<R, Error> {
    if !response.is_success() {
        match request_body {
            Some(body) => log::error!(
                "{} {} returns {}: {} (request body: {})",
                method,
                url,
                response.status,
                response.body,
                body
            ),
            None => log::error!(
                "{} {} returns {}: {}",
                method,
                url,
                response.status,
                response.body
            ),
        }
        let body = if response.body.is_empty() {
            None
        } else {
            Some(response.body)
        };
        return Err(Error::Transport {
            method,
            url: url.to_string(),
            status: response.status,
            body,
        });
    }
    serde_json::from_str(&response.body).map_err(|source| Error::Json {
        url: url.to_string(),
        source,
    })
}
