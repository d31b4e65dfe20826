// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Collectors turn client responses into domain records.
//!
//! None of them retry: the session already did. Per-repository stages
//! (languages, views) fan out through a bounded [`JoinSet`] whose tasks all
//! share the one session, so every request still passes the same rate-limit
//! check.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    future::Future,
};

use chrono::{TimeZone, Utc};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::{
    config::Visibility,
    error::Error,
    graphql::GraphQlClient,
    models::{ContributionDay, LanguageBytes, Repository, RepositoryViews, User, YearlyContributions},
    rest::RestClient,
    transport::Transport,
};

/// Fetches the authenticated user's profile.
#[derive(Debug, Clone,)]
pub struct ProfileCollector<T,>
{
    client: RestClient<T,>,
}

impl<T: Transport,> ProfileCollector<T,>
{
    pub fn new(client: RestClient<T,>,) -> Self
    {
        Self {
            client,
        }
    }

    /// # Errors
    ///
    /// Propagates client errors and profile validation failures.
    pub async fn collect(&self,) -> Result<User, Error,>
    {
        info!("collecting user profile");
        User::try_from(self.client.current_user().await?,)
    }
}

/// Fetches the user's repositories.
#[derive(Debug, Clone,)]
pub struct RepositoryCollector<T,>
{
    client:           RestClient<T,>,
    max_repositories: Option<usize,>,
}

impl<T: Transport,> RepositoryCollector<T,>
{
    /// `max_repositories` caps the collection; the cap is enforced while
    /// paginating.
    pub fn new(client: RestClient<T,>, max_repositories: Option<usize,>,) -> Self
    {
        Self {
            client,
            max_repositories,
        }
    }

    /// # Errors
    ///
    /// Propagates client errors and repository validation failures.
    pub async fn collect(&self, visibility: Visibility,) -> Result<Vec<Repository,>, Error,>
    {
        info!("collecting repositories (visibility: {})", visibility);
        self.client
            .repositories(visibility, self.max_repositories,)
            .await?
            .into_iter()
            .map(Repository::try_from,)
            .collect()
    }
}

/// Yearly totals keyed by year plus every active day.
pub type ContributionHistory = (BTreeMap<i32, YearlyContributions,>, Vec<ContributionDay,>,);

/// Fetches the contribution calendar one year at a time.
#[derive(Debug, Clone,)]
pub struct ContributionCollector<T,>
{
    client: GraphQlClient<T,>,
}

impl<T: Transport,> ContributionCollector<T,>
{
    pub fn new(client: GraphQlClient<T,>,) -> Self
    {
        Self {
            client,
        }
    }

    /// Queries `[YYYY-01-01T00:00:00Z, YYYY-12-31T23:59:59Z]` for each year in
    /// `start_year..=end_year`.
    ///
    /// Days without contributions are dropped; the remaining days are
    /// returned in chronological order.
    ///
    /// # Errors
    ///
    /// The first failing year aborts the collection.
    pub async fn collect(
        &self,
        username: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ContributionHistory, Error,>
    {
        info!("collecting contributions from {} to {}", start_year, end_year);

        let mut yearly = BTreeMap::new();
        let mut days = Vec::new();

        for year in start_year..=end_year {
            let from = Utc
                .with_ymd_and_hms(year, 1, 1, 0, 0, 0,)
                .single()
                .ok_or_else(|| Error::validation(format!("invalid contribution year {year}"),),)?;
            let to = Utc
                .with_ymd_and_hms(year, 12, 31, 23, 59, 59,)
                .single()
                .ok_or_else(|| Error::validation(format!("invalid contribution year {year}"),),)?;

            let collection = self.client.contributions(username, from, to,).await?;

            let record = YearlyContributions {
                year,
                total: collection.contribution_calendar.total_contributions,
                commits: collection.total_commit_contributions,
                prs: collection.total_pull_request_contributions,
                issues: collection.total_issue_contributions,
            };
            record.validate()?;
            yearly.insert(year, record,);

            days.extend(
                collection
                    .contribution_calendar
                    .days()
                    .filter(|day| day.contribution_count > 0,)
                    .map(|day| ContributionDay {
                        date:  day.date,
                        count: day.contribution_count,
                    },),
            );
            debug!("collected contributions for {}", year);
        }

        days.sort_by_key(|day| day.date,);
        info!("collected {} years and {} active days", yearly.len(), days.len());
        Ok((yearly, days,),)
    }
}

/// Sums language bytes across repositories.
#[derive(Debug, Clone,)]
pub struct LanguageCollector<T,>
{
    client:      RestClient<T,>,
    excluded:    HashSet<String,>,
    concurrency: usize,
}

impl<T: Transport + 'static,> LanguageCollector<T,>
{
    /// `excluded` holds lowercase language names.
    pub fn new(client: RestClient<T,>, excluded: HashSet<String,>, concurrency: usize,) -> Self
    {
        Self {
            client,
            excluded,
            concurrency: concurrency.max(1,),
        }
    }

    /// Returns languages sorted by bytes descending, ties by name.
    ///
    /// # Errors
    ///
    /// The first failing repository aborts the outstanding requests.
    pub async fn collect(&self, repositories: &[Repository],) -> Result<Vec<LanguageBytes,>, Error,>
    {
        info!("collecting languages from {} repositories", repositories.len());

        let client = self.client.clone();
        let per_repository = fan_out(
            repositories.iter().map(|repository| repository.full_name.clone(),),
            self.concurrency,
            move |full_name| {
                let client = client.clone();
                async move { client.repository_languages(&full_name,).await }
            },
        )
        .await?;

        let mut totals: HashMap<String, u64,> = HashMap::new();
        for languages in per_repository {
            for (name, bytes,) in languages {
                if self.excluded.contains(&name.to_lowercase(),) {
                    continue;
                }
                *totals.entry(name,).or_default() += bytes;
            }
        }

        let mut languages: Vec<LanguageBytes,> = totals
            .into_iter()
            .map(|(name, bytes,)| LanguageBytes {
                name,
                bytes,
            },)
            .collect();
        languages.sort_by(|a, b| b.bytes.cmp(&a.bytes,).then_with(|| a.name.cmp(&b.name,),),);
        Ok(languages,)
    }
}

/// Reads traffic counters per repository.
#[derive(Debug, Clone,)]
pub struct ViewCollector<T,>
{
    client:      RestClient<T,>,
    concurrency: usize,
}

impl<T: Transport + 'static,> ViewCollector<T,>
{
    pub fn new(client: RestClient<T,>, concurrency: usize,) -> Self
    {
        Self {
            client,
            concurrency: concurrency.max(1,),
        }
    }

    /// Returns views sorted by total descending, ties by name.
    ///
    /// # Errors
    ///
    /// Only task failures surface; unreadable traffic counts as zero views.
    pub async fn collect(&self, repositories: &[Repository],) -> Result<Vec<RepositoryViews,>, Error,>
    {
        info!("collecting views from {} repositories", repositories.len());

        let client = self.client.clone();
        let mut views = fan_out(
            repositories.iter().map(|repository| (repository.name.clone(), repository.full_name.clone(),),),
            self.concurrency,
            move |(name, full_name,)| {
                let client = client.clone();
                async move {
                    let counts = client.repository_views(&full_name,).await;
                    Ok(RepositoryViews {
                        name,
                        uniques: counts.uniques,
                        total: counts.total,
                    },)
                }
            },
        )
        .await?;

        views.sort_by(|a, b| b.total.cmp(&a.total,).then_with(|| a.name.cmp(&b.name,),),);
        Ok(views,)
    }
}

/// Runs `task` for every item with at most `limit` tasks in flight.
///
/// Results come back in completion order. Returning early drops the
/// [`JoinSet`], which aborts whatever is still running.
async fn fan_out<I, F, Fut, R,>(items: I, limit: usize, task: F,) -> Result<Vec<R,>, Error,>
where
    I: IntoIterator,
    F: Fn(I::Item,) -> Fut,
    Fut: Future<Output = Result<R, Error,>,> + Send + 'static,
    R: Send + 'static,
{
    let limit = limit.max(1,);
    let mut tasks = JoinSet::new();
    let mut results = Vec::new();

    for item in items {
        if tasks.len() >= limit {
            if let Some(joined,) = tasks.join_next().await {
                results.push(flatten(joined,)?,);
            }
        }
        tasks.spawn(task(item,),);
    }

    while let Some(joined,) = tasks.join_next().await {
        results.push(flatten(joined,)?,);
    }

    Ok(results,)
}

fn flatten<R,>(joined: Result<Result<R, Error,>, tokio::task::JoinError,>,) -> Result<R, Error,>
{
    joined.map_err(|e| Error::internal(format!("collection task failed: {e}"),),)?
}
