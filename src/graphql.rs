// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! GitHub GraphQL client for the contributions calendar.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::{
    error::Error,
    session::GithubSession,
    transport::{ApiRequest, Transport},
};

/// Contribution totals and calendar for one account over a time window.
pub const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!, $from: DateTime!, $to: DateTime!) {
    user(login: $login) {
        contributionsCollection(from: $from, to: $to) {
            totalCommitContributions
            totalPullRequestContributions
            totalIssueContributions
            contributionCalendar {
                totalContributions
                weeks {
                    contributionDays {
                        date
                        contributionCount
                    }
                }
            }
        }
    }
}
"#;

/// `contributionsCollection` as returned by [`CONTRIBUTIONS_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection
{
    pub total_commit_contributions:       u64,
    pub total_pull_request_contributions: u64,
    pub total_issue_contributions:        u64,
    pub contribution_calendar:            ContributionCalendar,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar
{
    pub total_contributions: u64,
    #[serde(default)]
    pub weeks:               Vec<CalendarWeek,>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek
{
    #[serde(default)]
    pub contribution_days: Vec<CalendarDay,>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay
{
    pub date:               NaiveDate,
    pub contribution_count: u32,
}

impl ContributionCalendar
{
    /// Every calendar day, week by week.
    pub fn days(&self,) -> impl Iterator<Item = &CalendarDay,>
    {
        self.weeks.iter().flat_map(|week| week.contribution_days.iter(),)
    }
}

#[derive(Debug, Deserialize,)]
struct Envelope
{
    #[serde(default)]
    data:   Option<Value,>,
    #[serde(default)]
    errors: Option<Vec<Value,>,>,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct UserNode
{
    contributions_collection: ContributionsCollection,
}

/// GraphQL client sharing the run's [`GithubSession`].
#[derive(Debug,)]
pub struct GraphQlClient<T,>
{
    session: Arc<GithubSession<T,>,>,
}

impl<T,> Clone for GraphQlClient<T,>
{
    fn clone(&self,) -> Self
    {
        Self {
            session: Arc::clone(&self.session,),
        }
    }
}

impl<T: Transport,> GraphQlClient<T,>
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

    /// Runs `query` with `variables` and returns the `data` object.
    ///
    /// # Errors
    ///
    /// A non-empty `errors` array is reported as [`Error::Api`] without a
    /// status, whatever the HTTP status was. Session errors propagate.
    pub async fn query(&self, query: &str, variables: Value,) -> Result<Value, Error,>
    {
        debug!("executing GraphQL query with variables {}", variables);

        let request = ApiRequest::post(
            self.session.config().graphql_url.clone(),
            json!({ "query": query, "variables": variables }),
        );
        let envelope: Envelope = self.session.fetch_json(request, "GraphQL response",).await?;

        if let Some(errors,) = envelope.errors.filter(|errors| !errors.is_empty(),) {
            let errors = Value::Array(errors,);
            error!("GraphQL errors: {}", errors);
            return Err(Error::api(None, format!("GraphQL query failed: {errors}"),),);
        }

        Ok(envelope.data.unwrap_or(Value::Null,),)
    }

    /// Contributions of `username` between `from` and `to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when GraphQL reports errors or the user does
    /// not exist, [`Error::Decode`] when the collection has an unexpected
    /// shape, and propagates session errors.
    pub async fn contributions(
        &self,
        username: &str,
        from: DateTime<Utc,>,
        to: DateTime<Utc,>,
    ) -> Result<ContributionsCollection, Error,>
    {
        let from = from.to_rfc3339_opts(SecondsFormat::Secs, true,);
        let to = to.to_rfc3339_opts(SecondsFormat::Secs, true,);
        debug!("fetching contributions for {} from {} to {}", username, from, to);

        let data = self
            .query(CONTRIBUTIONS_QUERY, json!({ "login": username, "from": from, "to": to }),)
            .await?;

        let user = match data.get("user",) {
            Some(user,) if !user.is_null() => user.clone(),
            _ => {
                return Err(Error::api(None, format!("GraphQL returned no user for login '{username}'"),),);
            }
        };

        let node: UserNode =
            serde_json::from_value(user,).map_err(|source| Error::decode("contributions collection", source,),)?;
        Ok(node.contributions_collection,)
    }
}
