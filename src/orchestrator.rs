// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Sequences the collectors and hands the result to the aggregator.
//!
//! A run starts from a [`PayloadSource`]: either live clients, which drive
//! every collector in order, or a payload replayed from the cache. Both paths
//! produce the same [`StatisticsPayload`], and only [`Orchestrator::collect`]
//! turns it into [`Statistics`].

use std::{collections::BTreeMap, fmt, sync::Arc};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    aggregator::StatisticsAggregator,
    collectors::{ContributionCollector, LanguageCollector, ProfileCollector, RepositoryCollector, ViewCollector},
    config::{AppConfig, CollectionOptions, Visibility},
    error::Error,
    graphql::GraphQlClient,
    models::{ContributionDay, GITHUB_FOUNDING_YEAR, LanguageBytes, Repository, RepositoryViews, User, YearlyContributions},
    rest::RestClient,
    session::GithubSession,
    statistics::Statistics,
    transport::Transport,
};

/// Raw records of one run, exactly as cached under
/// [`crate::cache::STATISTICS_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct StatisticsPayload
{
    pub user:                 User,
    pub repositories:         Vec<Repository,>,
    pub yearly_contributions: BTreeMap<i32, YearlyContributions,>,
    pub daily_contributions:  Vec<ContributionDay,>,
    pub languages:            Vec<LanguageBytes,>,
    pub repository_views:     Vec<RepositoryViews,>,
}

impl StatisticsPayload
{
    /// Validates every record of the payload.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Validation`] found.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        self.user.validate()?;
        for repository in &self.repositories {
            repository.validate()?;
        }
        for (year, record,) in &self.yearly_contributions {
            record.validate()?;
            if *year != record.year {
                return Err(Error::validation(format!(
                    "contributions for {} stored under {}",
                    record.year, year
                ),),);
            }
        }
        for day in &self.daily_contributions {
            day.validate()?;
        }
        for language in &self.languages {
            language.validate()?;
        }
        for views in &self.repository_views {
            views.validate()?;
        }
        Ok((),)
    }

    fn log_counts(&self,)
    {
        info!("collected profile for {}", self.user.login);
        info!("collected {} repositories", self.repositories.len());
        info!("collected contributions for {} years", self.yearly_contributions.len());
        info!("collected {} active days", self.daily_contributions.len());
        info!("collected statistics for {} languages", self.languages.len());
        info!("collected views for {} repositories", self.repository_views.len());
    }
}

/// REST and GraphQL clients over one shared session.
#[derive(Debug,)]
pub struct Clients<T,>
{
    pub rest:    RestClient<T,>,
    pub graphql: GraphQlClient<T,>,
}

impl<T: Transport,> Clients<T,>
{
    pub fn new(session: Arc<GithubSession<T,>,>,) -> Self
    {
        Self {
            rest:    RestClient::new(Arc::clone(&session,),),
            graphql: GraphQlClient::new(session,),
        }
    }
}

/// Where a run's payload comes from.
#[derive(Debug,)]
pub enum PayloadSource<T,>
{
    /// Fetch everything from GitHub.
    Live(Clients<T,>,),
    /// Replay a previously cached payload.
    Cached(StatisticsPayload,),
}

/// Which path produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Provenance
{
    Live,
    Cached,
}

impl fmt::Display for Provenance
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(match self {
            Self::Live => "API",
            Self::Cached => "cache",
        },)
    }
}

/// Result of [`Orchestrator::collect`].
#[derive(Debug, Clone,)]
pub struct CollectionOutcome
{
    pub statistics: Statistics,
    pub payload:    StatisticsPayload,
    pub provenance: Provenance,
}

/// Drives one collection run.
#[derive(Debug, Clone,)]
pub struct Orchestrator
{
    options:    CollectionOptions,
    visibility: Visibility,
    today:      NaiveDate,
}

impl Orchestrator
{
    pub fn new(config: &AppConfig, today: NaiveDate,) -> Self
    {
        Self {
            options: config.collection.clone(),
            visibility: config.github.visibility,
            today,
        }
    }

    /// Produces the raw payload from `source`.
    ///
    /// Live runs go Profile, Repository, Contribution (account creation year
    /// through the current year), Language, then View when views are
    /// enabled. Cached payloads are validated instead.
    ///
    /// # Errors
    ///
    /// Any collector failure aborts the run; cached payloads fail with
    /// [`Error::Validation`] when a record is invalid.
    pub async fn build_payload<T: Transport + 'static,>(
        &self,
        source: PayloadSource<T,>,
    ) -> Result<(StatisticsPayload, Provenance,), Error,>
    {
        match source {
            PayloadSource::Live(clients,) => {
                info!("starting data collection from API");
                let payload = self.collect_live(clients,).await?;
                Ok((payload, Provenance::Live,),)
            }
            PayloadSource::Cached(payload,) => {
                info!("starting data collection from cache");
                payload.validate()?;
                payload.log_counts();
                Ok((payload, Provenance::Cached,),)
            }
        }
    }

    /// Builds the payload and aggregates it.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::build_payload`].
    pub async fn collect<T: Transport + 'static,>(
        &self,
        source: PayloadSource<T,>,
    ) -> Result<CollectionOutcome, Error,>
    {
        let (payload, provenance,) = self.build_payload(source,).await?;

        info!("starting data aggregation from {}", provenance);
        let statistics =
            StatisticsAggregator::new(self.today, &self.options.excluded_set(),).aggregate(&payload,);
        info!("data collection complete");

        Ok(CollectionOutcome {
            statistics,
            payload,
            provenance,
        },)
    }

    async fn collect_live<T: Transport + 'static,>(&self, clients: Clients<T,>,) -> Result<StatisticsPayload, Error,>
    {
        let Clients {
            rest,
            graphql,
        } = clients;

        let user = ProfileCollector::new(rest.clone(),).collect().await?;
        info!("collected profile for {}", user.login);

        let repositories = RepositoryCollector::new(rest.clone(), self.options.max_repositories,)
            .collect(self.visibility,)
            .await?;
        info!("collected {} repositories", repositories.len());

        let start_year = user.created_at.year().max(GITHUB_FOUNDING_YEAR,);
        let end_year = self.today.year();
        let (yearly_contributions, daily_contributions,) =
            ContributionCollector::new(graphql,).collect(&user.login, start_year, end_year,).await?;
        info!("collected contributions for {} years", yearly_contributions.len());

        let languages =
            LanguageCollector::new(rest.clone(), self.options.excluded_set(), self.options.concurrency,)
                .collect(&repositories,)
                .await?;
        info!("collected statistics for {} languages", languages.len());

        let repository_views = if self.options.include_views {
            let views = ViewCollector::new(rest, self.options.concurrency,).collect(&repositories,).await?;
            info!("collected views for {} repositories", views.len());
            views
        } else {
            Vec::new()
        };

        Ok(StatisticsPayload {
            user,
            repositories,
            yearly_contributions,
            daily_contributions,
            languages,
            repository_views,
        },)
    }
}
