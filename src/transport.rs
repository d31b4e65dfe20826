// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! HTTP transport seam between the GitHub session and the network.
//!
//! The session only sees [`ApiRequest`] and [`RawResponse`]; the
//! [`Transport`] trait decides how those travel. [`HttpTransport`] sends them
//! through `reqwest`, tests substitute a scripted transport.

use std::{future::Future, time::Duration};

use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;

/// Media type requested from the REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// A single outgoing API request.
#[derive(Debug, Clone, PartialEq,)]
pub struct ApiRequest
{
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url:    String,
    /// Query string parameters, in insertion order.
    pub query:  Vec<(String, String,),>,
    /// JSON body for POST requests.
    pub body:   Option<serde_json::Value,>,
}

impl ApiRequest
{
    /// Builds a GET request for `url`.
    pub fn get(url: impl Into<String,>,) -> Self
    {
        Self {
            method: Method::GET,
            url:    url.into(),
            query:  Vec::new(),
            body:   None,
        }
    }

    /// Builds a POST request carrying a JSON body.
    pub fn post(url: impl Into<String,>, body: serde_json::Value,) -> Self
    {
        Self {
            method: Method::POST,
            url:    url.into(),
            query:  Vec::new(),
            body:   Some(body,),
        }
    }

    /// Appends a query string parameter.
    pub fn with_query(mut self, key: impl Into<String,>, value: impl ToString,) -> Self
    {
        self.query.push((key.into(), value.to_string(),),);
        self
    }

    /// Value of the query parameter `key`, if present.
    pub fn query_value(&self, key: &str,) -> Option<&str,>
    {
        self.query.iter().find(|(name, _,)| name == key,).map(|(_, value,)| value.as_str(),)
    }

    /// Short description used in logs.
    pub fn label(&self,) -> String
    {
        format!("{} {}", self.method, self.url)
    }
}

/// A response as received, before any status handling.
#[derive(Debug, Clone,)]
pub struct RawResponse
{
    /// HTTP status.
    pub status:  StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body:    String,
}

impl RawResponse
{
    /// Builds a response with the given status code and body.
    ///
    /// Unknown status codes fall back to `500`.
    pub fn new(status: u16, body: impl Into<String,>,) -> Self
    {
        Self {
            status:  StatusCode::from_u16(status,).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR,),
            headers: HeaderMap::new(),
            body:    body.into(),
        }
    }

    /// Adds a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str,) -> Self
    {
        if let (Ok(name,), Ok(value,),) =
            (HeaderName::from_bytes(name.as_bytes(),), HeaderValue::from_str(value,),)
        {
            self.headers.insert(name, value,);
        }
        self
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming `context` when the body does not
    /// match `T`.
    pub fn json<T: DeserializeOwned,>(&self, context: &str,) -> Result<T, Error,>
    {
        serde_json::from_str(&self.body,).map_err(|source| Error::decode(context, source,),)
    }
}

/// Sends requests and returns raw responses.
///
/// Implementations report network failures as [`Error::Transport`] and never
/// interpret HTTP statuses.
pub trait Transport: Send + Sync
{
    /// Sends `request` and waits for the full response.
    fn send(&self, request: &ApiRequest,)
    -> impl Future<Output = Result<RawResponse, Error,>,> + Send;
}

/// Production transport backed by a `reqwest` client.
#[derive(Debug, Clone,)]
pub struct HttpTransport
{
    client: Client,
}

impl HttpTransport
{
    /// Builds a client with bearer authentication, the GitHub media type and
    /// the given user agent on every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the token or user agent cannot be
    /// used as a header value and [`Error::Transport`] when the client cannot
    /// be constructed.
    pub fn new(token: &str, user_agent: &str, timeout: Duration,) -> Result<Self, Error,>
    {
        let mut headers = HeaderMap::new();

        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"),)
            .map_err(|_| Error::validation("token contains characters not allowed in a header",),)?;
        authorization.set_sensitive(true,);
        headers.insert(AUTHORIZATION, authorization,);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT,),);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent,)
                .map_err(|_| Error::validation("user agent is not a valid header value",),)?,
        );

        let client = Client::builder()
            .default_headers(headers,)
            .timeout(timeout,)
            .build()
            .map_err(|e| Error::transport(format!("failed to create HTTP client: {e}"),),)?;

        Ok(Self {
            client,
        },)
    }
}

impl Transport for HttpTransport
{
    async fn send(&self, request: &ApiRequest,) -> Result<RawResponse, Error,>
    {
        debug!("sending {}", request.label());

        let mut builder = self.client.request(request.method.clone(), &request.url,);
        if !request.query.is_empty() {
            builder = builder.query(&request.query,);
        }
        if let Some(body,) = &request.body {
            builder = builder.json(body,);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::transport(format!("request timed out: {}", request.label()),)
            } else if e.is_connect() {
                Error::transport(format!("failed to connect: {}", request.label()),)
            } else {
                Error::transport(format!("{} failed: {e}", request.label()),)
            }
        },)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            Error::transport(format!("failed to read response from {}: {e}", request.label()),)
        },)?;

        Ok(RawResponse {
            status,
            headers,
            body,
        },)
    }
}
