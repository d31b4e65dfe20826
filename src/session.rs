// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Shared GitHub session: retries, rate-limit waits and status
//! classification for every request issued by the REST and GraphQL clients.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    config::{GITHUB_GRAPHQL_ENDPOINT, GITHUB_REST_API_BASE},
    error::Error,
    rate_limit::{RateLimitAction, RateLimitSnapshot, now_epoch_secs},
    retry::{RetryPolicy, retry_with_backoff},
    transport::{ApiRequest, HttpTransport, RawResponse, Transport},
};

/// Connection settings for a [`GithubSession`].
#[derive(Debug, Clone, PartialEq,)]
pub struct ClientConfig
{
    /// Personal access token sent as a bearer credential.
    pub token:         String,
    /// Per-request timeout.
    pub timeout:       Duration,
    /// Backoff policy applied to transient failures.
    pub retry:         RetryPolicy,
    /// REST API root without a trailing slash.
    pub rest_base_url: String,
    /// GraphQL endpoint.
    pub graphql_url:   String,
    /// `User-Agent` header value.
    pub user_agent:    String,
}

impl Default for ClientConfig
{
    fn default() -> Self
    {
        Self {
            token:         String::new(),
            timeout:       Duration::from_secs(30,),
            retry:         RetryPolicy::default(),
            rest_base_url: GITHUB_REST_API_BASE.to_owned(),
            graphql_url:   GITHUB_GRAPHQL_ENDPOINT.to_owned(),
            user_agent:    concat!("gitstats/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// One authenticated session shared by every client of a run.
#[derive(Debug,)]
pub struct GithubSession<T,>
{
    transport: T,
    config:    ClientConfig,
}

impl GithubSession<HttpTransport,>
{
    /// Opens a session over the network.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`HttpTransport::new`].
    pub fn connect(config: ClientConfig,) -> Result<Self, Error,>
    {
        let transport = HttpTransport::new(&config.token, &config.user_agent, config.timeout,)?;
        Ok(Self::new(transport, config,),)
    }
}

impl<T: Transport,> GithubSession<T,>
{
    /// Wraps an existing transport.
    pub fn new(transport: T, config: ClientConfig,) -> Self
    {
        Self {
            transport,
            config,
        }
    }

    /// Session configuration.
    pub fn config(&self,) -> &ClientConfig
    {
        &self.config
    }

    /// Absolute REST URL for `path` (which starts with `/`).
    pub fn rest_url(&self, path: &str,) -> String
    {
        format!("{}{}", self.config.rest_base_url, path)
    }

    /// Underlying transport.
    pub fn transport(&self,) -> &T
    {
        &self.transport
    }

    /// Sends `request` and decodes the successful body as JSON.
    ///
    /// # Errors
    ///
    /// Everything [`GithubSession::execute`] returns, plus [`Error::Decode`]
    /// naming `context`.
    pub async fn fetch_json<D: DeserializeOwned,>(
        &self,
        request: ApiRequest,
        context: &str,
    ) -> Result<D, Error,>
    {
        self.execute(request,).await?.json(context,)
    }

    /// Sends `request` through the retry policy and returns the first
    /// successful response.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] for 401 and non rate-limit 403 responses
    /// - [`Error::RateLimit`] when the quota resets more than an hour away, or
    ///   when retries run out while the quota stays exhausted
    /// - [`Error::Api`] for any other unsuccessful status
    /// - [`Error::Transport`] when the network keeps failing
    pub async fn execute(&self, request: ApiRequest,) -> Result<RawResponse, Error,>
    {
        let label = request.label();
        let policy = &self.config.retry;
        let request = &request;
        retry_with_backoff(policy, policy, &request.method, &label, move || self.attempt(request,),)
            .await
    }

    async fn attempt(&self, request: &ApiRequest,) -> Result<RawResponse, Error,>
    {
        let response = self.transport.send(request,).await?;
        debug!("{} -> {}", request.label(), response.status);

        let waited = self.respect_rate_limit(&response,).await?;

        if response.status.is_success() {
            return Ok(response,);
        }

        if waited && is_rate_limit_rejection(response.status,) {
            return Err(Error::rate_limit(
                format!("{} rejected before quota reset", request.label()),
                true,
            ),);
        }

        Err(classify_status(&response, request,),)
    }

    /// Sleeps through an exhausted quota. Returns whether a wait happened.
    async fn respect_rate_limit(&self, response: &RawResponse,) -> Result<bool, Error,>
    {
        match RateLimitSnapshot::from_headers(&response.headers,).decide(now_epoch_secs(),) {
            RateLimitAction::Proceed => Ok(false,),
            RateLimitAction::Wait(delay,) => {
                warn!("rate limit reached, waiting {} seconds", delay.as_secs());
                sleep(delay,).await;
                Ok(true,)
            }
            RateLimitAction::Exhausted {
                wait,
            } => Err(Error::rate_limit(
                format!("quota resets in {} minutes", wait.as_secs() / 60),
                false,
            ),),
        }
    }
}

fn is_rate_limit_rejection(status: StatusCode,) -> bool
{
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

/// Maps an unsuccessful response to an error.
fn classify_status(response: &RawResponse, request: &ApiRequest,) -> Error
{
    match response.status {
        StatusCode::UNAUTHORIZED => Error::authentication("invalid or expired GitHub token",),
        StatusCode::FORBIDDEN => {
            if response.body.to_lowercase().contains("rate limit",) {
                Error::rate_limit("GitHub reported the rate limit as exceeded", false,)
            } else {
                Error::authentication("access forbidden",)
            }
        }
        status => Error::api(
            Some(status.as_u16(),),
            format!("{} returned HTTP {}", request.label(), status.as_u16()),
        ),
    }
}

#[cfg(test)]
mod tests
{
    use tokio::time::Instant;

    use super::*;
    use crate::test_support::{MockTransport, session};

    fn user_request() -> ApiRequest
    {
        ApiRequest::get("https://api.test/user",)
    }

    #[test]
    fn default_config_points_at_github()
    {
        let config = ClientConfig::default();
        assert_eq!(config.rest_base_url, "https://api.github.com");
        assert_eq!(config.graphql_url, "https://api.github.com/graphql");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("gitstats/"));
    }

    #[test]
    fn rest_url_joins_path()
    {
        let session = session(MockTransport::new(),);
        assert_eq!(session.rest_url("/user"), "https://api.test/user");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_statuses_then_succeeds()
    {
        let transport = MockTransport::new();
        transport
            .respond("/user", RawResponse::new(503, "",),)
            .respond("/user", RawResponse::new(503, "",),)
            .respond("/user", RawResponse::new(200, "{}",),);
        let session = session(transport,);

        let response = session.execute(user_request(),).await.expect("third attempt succeeds",);
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(session.transport().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transport_failures()
    {
        let transport = MockTransport::new();
        transport.fail("/user", "connection reset",).respond("/user", RawResponse::new(200, "{}",),);
        let session = session(transport,);

        assert!(session.execute(user_request()).await.is_ok());
        assert_eq!(session.transport().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries()
    {
        let transport = MockTransport::new();
        for _ in 0..5 {
            transport.respond("/user", RawResponse::new(502, "",),);
        }
        let session = session(transport,);

        let error = session.execute(user_request(),).await.unwrap_err();
        assert_eq!(error.status(), Some(502));
        assert_eq!(session.transport().calls(), 4);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors()
    {
        let transport = MockTransport::new();
        transport.respond("/user", RawResponse::new(404, "",),);
        let session = session(transport,);

        let error = session.execute(user_request(),).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
        assert_eq!(session.transport().calls(), 1);
    }

    #[tokio::test]
    async fn unauthorized_is_authentication_error()
    {
        let transport = MockTransport::new();
        transport.respond("/user", RawResponse::new(401, "Bad credentials",),);
        let session = session(transport,);

        let error = session.execute(user_request(),).await.unwrap_err();
        assert!(matches!(error, Error::Authentication { .. }));
        assert!(error.to_string().contains("invalid or expired"));
        assert_eq!(session.transport().calls(), 1);
    }

    #[tokio::test]
    async fn forbidden_is_split_by_body()
    {
        let transport = MockTransport::new();
        transport
            .respond("/user", RawResponse::new(403, "API Rate Limit exceeded for user",),)
            .respond("/user", RawResponse::new(403, "Resource not accessible",),);
        let session = session(transport,);

        let limited = session.execute(user_request(),).await.unwrap_err();
        assert!(matches!(limited, Error::RateLimit { recoverable: false, .. }));

        let forbidden = session.execute(user_request(),).await.unwrap_err();
        assert!(matches!(forbidden, Error::Authentication { .. }));
        assert!(forbidden.to_string().contains("access forbidden"));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_quota_reset_before_returning()
    {
        let reset = now_epoch_secs() + 30;
        let transport = MockTransport::new();
        transport.respond(
            "/user",
            RawResponse::new(200, r#"{"login":"octocat"}"#,)
                .with_header("x-ratelimit-remaining", "0",)
                .with_header("x-ratelimit-reset", &reset.to_string(),),
        );
        let session = session(transport,);

        let started = Instant::now();
        let response = session.execute(user_request(),).await.expect("request succeeds",);
        let waited = started.elapsed();

        assert_eq!(response.status, StatusCode::OK);
        assert!(waited >= Duration::from_secs(30), "waited {waited:?}");
        assert!(waited <= Duration::from_secs(31), "waited {waited:?}");
        assert_eq!(session.transport().calls(), 1);
    }

    #[tokio::test]
    async fn distant_reset_fails_fast()
    {
        let reset = now_epoch_secs() + 7200;
        let transport = MockTransport::new();
        transport.respond(
            "/user",
            RawResponse::new(200, "{}",)
                .with_header("x-ratelimit-remaining", "0",)
                .with_header("x-ratelimit-reset", &reset.to_string(),),
        );
        let session = session(transport,);

        let error = session.execute(user_request(),).await.unwrap_err();
        assert!(matches!(error, Error::RateLimit { recoverable: false, .. }));
        assert_eq!(session.transport().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_request_is_reissued_after_waiting()
    {
        let reset = now_epoch_secs() + 10;
        let transport = MockTransport::new();
        transport
            .respond(
                "/user",
                RawResponse::new(403, "API rate limit exceeded",)
                    .with_header("x-ratelimit-remaining", "0",)
                    .with_header("x-ratelimit-reset", &reset.to_string(),),
            )
            .respond("/user", RawResponse::new(200, "{}",),);
        let session = session(transport,);

        assert!(session.execute(user_request()).await.is_ok());
        assert_eq!(session.transport().calls(), 2);
    }
}
