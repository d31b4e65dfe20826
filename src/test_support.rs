// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Scripted transport shared by the client, collector and orchestrator tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    error::Error,
    session::{ClientConfig, GithubSession},
    transport::{ApiRequest, RawResponse, Transport},
};

type Scripted = Result<RawResponse, String,>;

/// In-memory transport that replays queued responses.
///
/// Requests are routed by URL fragment: the longest fragment contained in
/// `url?query` that still has a queued response wins. Every request is
/// recorded. An unscripted request yields HTTP 404.
#[derive(Debug, Default,)]
pub struct MockTransport
{
    routes:   Mutex<Vec<(String, VecDeque<Scripted,>,),>,>,
    requests: Mutex<Vec<ApiRequest,>,>,
    calls:    AtomicUsize,
}

impl MockTransport
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Queues `response` for requests whose target contains `fragment`.
    pub fn respond(&self, fragment: &str, response: RawResponse,) -> &Self
    {
        self.enqueue(fragment, Ok(response,),);
        self
    }

    /// Queues a `200` JSON response.
    pub fn respond_json(&self, fragment: &str, body: serde_json::Value,) -> &Self
    {
        self.respond(fragment, RawResponse::new(200, body.to_string(),),)
    }

    /// Queues a transport failure.
    pub fn fail(&self, fragment: &str, message: &str,) -> &Self
    {
        self.enqueue(fragment, Err(message.to_owned(),),);
        self
    }

    pub fn calls(&self,) -> usize
    {
        self.calls.load(Ordering::SeqCst,)
    }

    pub fn requests(&self,) -> Vec<ApiRequest,>
    {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests whose target contains `fragment`.
    pub fn count_matching(&self, fragment: &str,) -> usize
    {
        self.requests.lock().unwrap().iter().filter(|request| target(request,).contains(fragment,),).count()
    }

    fn enqueue(&self, fragment: &str, scripted: Scripted,)
    {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|(existing, _,)| existing == fragment,) {
            Some((_, queue,),) => queue.push_back(scripted,),
            None => routes.push((fragment.to_owned(), VecDeque::from([scripted,],),),),
        }
    }

    fn next_for(&self, request: &ApiRequest,) -> Option<Scripted,>
    {
        let target = target(request,);
        let mut routes = self.routes.lock().unwrap();
        routes
            .iter_mut()
            .filter(|(fragment, queue,)| !queue.is_empty() && target.contains(fragment.as_str(),),)
            .max_by_key(|(fragment, _,)| fragment.len(),)
            .and_then(|(_, queue,)| queue.pop_front(),)
    }
}

impl Transport for MockTransport
{
    async fn send(&self, request: &ApiRequest,) -> Result<RawResponse, Error,>
    {
        self.calls.fetch_add(1, Ordering::SeqCst,);
        self.requests.lock().unwrap().push(request.clone(),);

        match self.next_for(request,) {
            Some(Ok(response,),) => Ok(response,),
            Some(Err(message,),) => Err(Error::transport(message,),),
            None => Ok(RawResponse::new(404, r#"{"message":"Not Found"}"#,),),
        }
    }
}

fn target(request: &ApiRequest,) -> String
{
    if request.query.is_empty() {
        return request.url.clone();
    }
    let query: Vec<String,> =
        request.query.iter().map(|(key, value,)| format!("{key}={value}"),).collect();
    format!("{}?{}", request.url, query.join("&"))
}

/// Session over `transport` with millisecond backoff and a test base URL.
pub fn session(transport: MockTransport,) -> Arc<GithubSession<MockTransport,>,>
{
    let mut config = ClientConfig {
        token: "test-token".to_owned(),
        rest_base_url: "https://api.test".to_owned(),
        graphql_url: "https://api.test/graphql".to_owned(),
        ..ClientConfig::default()
    };
    config.retry.base_delay = std::time::Duration::from_millis(1,);
    Arc::new(GithubSession::new(transport, config,),)
}

/// Minimal `/user` body accepted by the profile decoder.
pub fn user_json(login: &str, created_at: &str,) -> serde_json::Value
{
    serde_json::json!({
        "login": login,
        "id": 583231,
        "name": "The Octocat",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231",
        "created_at": created_at,
        "bio": null,
        "location": "San Francisco",
        "company": "@github",
        "email": null,
        "blog": "https://github.blog",
        "public_repos": 8,
        "followers": 100,
        "following": 9
    })
}

/// Minimal repository body accepted by the repository decoder.
pub fn repository_json(owner: &str, name: &str, stars: u64,) -> serde_json::Value
{
    serde_json::json!({
        "id": stars + 1000,
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "description": null,
        "language": "Rust",
        "stargazers_count": stars,
        "forks_count": 1,
        "open_issues_count": 0,
        "size": 120,
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-06-01T12:00:00Z",
        "private": false,
        "fork": false,
        "archived": false
    })
}
