// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! GitHub REST endpoints used by the collectors.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::{
    config::Visibility,
    error::Error,
    models::{RepositoryPayload, UserPayload, ViewCounts},
    session::GithubSession,
    transport::{ApiRequest, Transport},
};

/// Page size requested from paginated endpoints.
pub const PER_PAGE: usize = 100;

/// REST client sharing the run's [`GithubSession`].
#[derive(Debug,)]
pub struct RestClient<T,>
{
    session: Arc<GithubSession<T,>,>,
}

impl<T,> Clone for RestClient<T,>
{
    fn clone(&self,) -> Self
    {
        Self {
            session: Arc::clone(&self.session,),
        }
    }
}

impl<T: Transport,> RestClient<T,>
{
    pub fn new(session: Arc<GithubSession<T,>,>,) -> Self
    {
        Self {
            session,
        }
    }

    /// Session shared with the other clients of the run.
    pub fn session(&self,) -> &GithubSession<T,>
    {
        &self.session
    }

    /// `GET /user`.
    ///
    /// # Errors
    ///
    /// Propagates session and decoding errors.
    pub async fn current_user(&self,) -> Result<UserPayload, Error,>
    {
        let request = ApiRequest::get(self.session.rest_url("/user",),);
        self.session.fetch_json(request, "user profile",).await
    }

    /// Pages through `GET /user/repos`.
    ///
    /// Stops at the first empty page, or once `limit` repositories are held
    /// without requesting another page. Repositories repeated across pages
    /// are kept once, first occurrence wins.
    ///
    /// # Errors
    ///
    /// Propagates session and decoding errors from any page.
    pub async fn repositories(
        &self,
        visibility: Visibility,
        limit: Option<usize,>,
    ) -> Result<Vec<RepositoryPayload,>, Error,>
    {
        let mut repositories: Vec<RepositoryPayload,> = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1usize;

        loop {
            if limit.is_some_and(|limit| repositories.len() >= limit,) {
                break;
            }

            debug!("fetching repositories page {}", page);
            let request = ApiRequest::get(self.session.rest_url("/user/repos",),)
                .with_query("visibility", visibility,)
                .with_query("per_page", PER_PAGE,)
                .with_query("page", page,);
            let batch: Vec<RepositoryPayload,> =
                self.session.fetch_json(request, "repository page",).await?;

            if batch.is_empty() {
                break;
            }

            for repository in batch {
                if limit.is_some_and(|limit| repositories.len() >= limit,) {
                    break;
                }
                if seen.insert(repository.full_name.clone(),) {
                    repositories.push(repository,);
                }
            }
            page += 1;
        }

        info!("fetched {} repositories", repositories.len());
        Ok(repositories,)
    }

    /// `GET /repos/{full_name}/languages` as a name-ordered byte map.
    ///
    /// # Errors
    ///
    /// Propagates session and decoding errors.
    pub async fn repository_languages(&self, full_name: &str,) -> Result<BTreeMap<String, u64,>, Error,>
    {
        let request = ApiRequest::get(self.session.rest_url(&format!("/repos/{full_name}/languages"),),);
        self.session.fetch_json(request, "repository languages",).await
    }

    /// `GET /repos/{full_name}/traffic/views`.
    ///
    /// Traffic needs push access, so any failure is logged and reported as
    /// zero views instead of failing the run.
    pub async fn repository_views(&self, full_name: &str,) -> ViewCounts
    {
        let request =
            ApiRequest::get(self.session.rest_url(&format!("/repos/{full_name}/traffic/views"),),);
        match self.session.fetch_json(request, "repository views",).await {
            Ok(counts,) => counts,
            Err(error,) => {
                warn!("could not fetch views for {}: {}", full_name, error);
                ViewCounts::default()
            }
        }
    }
}
