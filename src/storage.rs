// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Human-facing statistics summary written to `<output>/data/<user>-stats.json`.

use std::{collections::BTreeMap, fs, path::Path};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, cache_io_error, io_error},
    models::{Streak, ViewCounts},
    statistics::Statistics,
};

/// Summary document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct Summary
{
    pub user:                 SummaryUser,
    pub totals:               Totals,
    pub yearly_contributions: BTreeMap<i32, YearTotals,>,
    pub streaks:              Streaks,
    pub languages:            BTreeMap<String, f64,>,
    pub repository_views:     BTreeMap<String, ViewCounts,>,
    pub metadata:             Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct SummaryUser
{
    pub login:        String,
    pub name:         Option<String,>,
    pub avatar_url:   String,
    pub created_at:   DateTime<Utc,>,
    pub bio:          Option<String,>,
    pub location:     Option<String,>,
    pub public_repos: u64,
    pub followers:    u64,
    pub following:    u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Totals
{
    pub stars:         u64,
    pub commits:       u64,
    pub prs:           u64,
    pub issues:        u64,
    pub contributions: u64,
    pub repositories:  usize,
    pub views:         u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct YearTotals
{
    pub total:   u64,
    pub commits: u64,
    pub prs:     u64,
    pub issues:  u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Streaks
{
    pub current: StreakSummary,
    pub longest: StreakSummary,
}

/// A streak, or `days: 0` with null dates when there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct StreakSummary
{
    pub days:  u32,
    pub start: Option<NaiveDate,>,
    pub end:   Option<NaiveDate,>,
}

impl From<Option<Streak,>,> for StreakSummary
{
    fn from(streak: Option<Streak,>,) -> Self
    {
        match streak {
            Some(streak,) => Self {
                days:  streak.days,
                start: Some(streak.start_date,),
                end:   Some(streak.end_date,),
            },
            None => Self {
                days:  0,
                start: None,
                end:   None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Metadata
{
    pub generated_at: DateTime<Utc,>,
    pub version:      String,
}

impl Summary
{
    /// Projects `statistics` into the summary layout, stamped with
    /// `generated_at`.
    pub fn new(statistics: &Statistics, generated_at: DateTime<Utc,>,) -> Self
    {
        let user = &statistics.user;
        Self {
            user:                 SummaryUser {
                login:        user.login.clone(),
                name:         user.name.clone(),
                avatar_url:   user.avatar_url.clone(),
                created_at:   user.created_at,
                bio:          user.bio.clone(),
                location:     user.location.clone(),
                public_repos: user.public_repos,
                followers:    user.followers,
                following:    user.following,
            },
            totals:               Totals {
                stars:         statistics.total_stars(),
                commits:       statistics.total_commits(),
                prs:           statistics.total_prs(),
                issues:        statistics.total_issues(),
                contributions: statistics.total_contributions(),
                repositories:  statistics.repository_count(),
                views:         statistics.total_views(),
            },
            yearly_contributions: statistics
                .yearly_contributions
                .iter()
                .map(|(year, record,)| {
                    (*year, YearTotals {
                        total:   record.total,
                        commits: record.commits,
                        prs:     record.prs,
                        issues:  record.issues,
                    },)
                },)
                .collect(),
            streaks:              Streaks {
                current: statistics.current_streak.into(),
                longest: statistics.longest_streak.into(),
            },
            languages:            statistics.languages.clone(),
            repository_views:     statistics.repository_views.clone(),
            metadata:             Metadata {
                generated_at,
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
        }
    }
}

/// Writes the summary of `statistics` to `path` as pretty JSON, creating
/// parent directories.
///
/// # Errors
///
/// Returns [`Error::Serialize`] when encoding fails and [`Error::CacheIo`]
/// when the file or its directories cannot be written.
pub fn write_summary(statistics: &Statistics, path: &Path,) -> Result<Summary, Error,>
{
    let summary = Summary::new(statistics, Utc::now(),);
    let encoded = serde_json::to_string_pretty(&summary,)?;

    if let Some(parent,) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent,).map_err(|e| cache_io_error(parent, e,),)?;
    }
    fs::write(path, encoded,).map_err(|e| cache_io_error(path, e,),)?;

    info!("statistics saved to {}", path.display());
    Ok(summary,)
}

/// Reads a summary written by [`write_summary`].
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Decode`]
/// when it is not a summary document.
pub fn read_summary(path: &Path,) -> Result<Summary, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|e| io_error(path, e,),)?;
    serde_json::from_str(&contents,).map_err(|source| Error::decode("statistics summary", source,),)
}

#[cfg(test)]
mod tests
{
    use tempfile::tempdir;

    use super::*;
    use crate::{
        models::{User, UserPayload, YearlyContributions},
        test_support::user_json,
    };

    fn statistics() -> Statistics
    {
        let user =
            User::try_from(serde_json::from_value::<UserPayload>(user_json("octocat", "2011-01-25T18:44:36Z",),).unwrap(),)
                .unwrap();
        Statistics {
            user,
            repositories: Vec::new(),
            yearly_contributions: BTreeMap::from([(2024, YearlyContributions {
                year:    2024,
                total:   12,
                commits: 9,
                prs:     2,
                issues:  1,
            },),],),
            daily_contributions: Vec::new(),
            current_streak: None,
            longest_streak: Some(
                Streak::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1,).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 1, 4,).unwrap(),
                    4,
                )
                .unwrap(),
            ),
            languages: BTreeMap::from([("Rust".to_owned(), 100.0,),],),
            repository_stars: BTreeMap::from([("alpha".to_owned(), 3,),],),
            repository_views: BTreeMap::from([("alpha".to_owned(), ViewCounts {
                total:   8,
                uniques: 2,
            },),],),
        }
    }

    #[test]
    fn summary_layout()
    {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output/data/octocat-stats.json",);
        write_summary(&statistics(), &path,).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path,).unwrap(),).unwrap();
        assert_eq!(value["user"]["login"], "octocat");
        assert_eq!(value["totals"]["stars"], 3);
        assert_eq!(value["totals"]["commits"], 9);
        assert_eq!(value["totals"]["views"], 8);
        assert_eq!(value["totals"]["repositories"], 0);
        assert_eq!(value["yearly_contributions"]["2024"]["total"], 12);
        assert_eq!(value["streaks"]["current"]["days"], 0);
        assert!(value["streaks"]["current"]["start"].is_null());
        assert_eq!(value["streaks"]["longest"]["start"], "2024-01-01");
        assert_eq!(value["streaks"]["longest"]["end"], "2024-01-04");
        assert_eq!(value["languages"]["Rust"], 100.0);
        assert_eq!(value["repository_views"]["alpha"]["count"], 8);
        assert_eq!(value["metadata"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn summary_reads_back()
    {
        let dir = tempdir().unwrap();
        let path = dir.path().join("octocat-stats.json",);
        let written = write_summary(&statistics(), &path,).unwrap();
        assert_eq!(read_summary(&path).unwrap(), written);
    }

    #[test]
    fn missing_summary_is_io_error()
    {
        let dir = tempdir().unwrap();
        let error = read_summary(&dir.path().join("absent.json",),).unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }
}
