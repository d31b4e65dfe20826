// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Collection of GitHub account statistics for profile stats cards.
//!
//! A run authenticates against the GitHub REST and GraphQL APIs, gathers the
//! profile, owned repositories, yearly contribution calendars, language byte
//! counts and traffic views, and folds them into a [`Statistics`] aggregate.
//! Transient failures are retried with exponential backoff and rate limit
//! quotas are honored before the next request leaves. The raw payload is
//! cached on disk so later runs can rebuild statistics without the network.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gitstats::{AppConfig, Clients, GithubSession, Orchestrator, PayloadSource};
//!
//! # async fn run() -> Result<(), gitstats::Error,> {
//! let config = AppConfig::new("octocat", "ghp_example",);
//! let session = Arc::new(GithubSession::connect(config.client_config(),)?,);
//! let today = chrono::Utc::now().date_naive();
//! let outcome = Orchestrator::new(&config, today,)
//!     .collect(PayloadSource::Live(Clients::new(session,),),)
//!     .await?;
//! println!("{} contributions", outcome.statistics.total_contributions());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod collectors;
pub mod config;
pub mod error;
pub mod graphql;
pub mod languages;
pub mod models;
pub mod orchestrator;
pub mod rate_limit;
pub mod rest;
pub mod retry;
pub mod session;
pub mod stars;
pub mod statistics;
pub mod storage;
pub mod streak;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use aggregator::StatisticsAggregator;
pub use cache::{Cache, STATISTICS_KEY};
pub use config::{AppConfig, CollectionOptions, Visibility, load_config, parse_config};
pub use error::{Error, cache_io_error, io_error};
pub use graphql::GraphQlClient;
pub use models::{
    ContributionDay, LanguageBytes, Repository, RepositoryViews, Streak, User, ViewCounts,
    YearlyContributions,
};
pub use orchestrator::{
    Clients, CollectionOutcome, Orchestrator, PayloadSource, Provenance, StatisticsPayload,
};
pub use rest::RestClient;
pub use retry::RetryPolicy;
pub use session::{ClientConfig, GithubSession};
pub use statistics::Statistics;
pub use storage::{Summary, read_summary, write_summary};
pub use transport::{HttpTransport, Transport};
