// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Domain records produced by the collectors.
//!
//! Records are plain serde structs so the cache can persist them directly.
//! API payloads are decoded into the `*Payload` wire types first and
//! converted through [`TryFrom`], which runs the record's `validate()`.
//! Cached records are validated again after being read back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Year GitHub launched; no contribution can predate it.
pub const GITHUB_FOUNDING_YEAR: i32 = 2008;

/// Authenticated GitHub account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct User
{
    pub login:        String,
    pub id:           u64,
    pub name:         Option<String,>,
    pub avatar_url:   String,
    pub created_at:   DateTime<Utc,>,
    pub bio:          Option<String,>,
    pub location:     Option<String,>,
    pub company:      Option<String,>,
    pub email:        Option<String,>,
    pub blog:         String,
    pub public_repos: u64,
    pub followers:    u64,
    pub following:    u64,
}

impl User
{
    /// Checks the login and id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty login or a zero id.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.login.trim().is_empty() {
            return Err(Error::validation("user login cannot be empty",),);
        }
        if self.id == 0 {
            return Err(Error::validation(format!("invalid user id for {}", self.login),),);
        }
        Ok((),)
    }

    /// Name when set, login otherwise.
    pub fn display_name(&self,) -> &str
    {
        self.name.as_deref().filter(|name| !name.is_empty(),).unwrap_or(&self.login,)
    }

    /// Possessive form of the login: `octocat's`, `james'`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gitstats::models::User;
    /// # let mut user: User = serde_json::from_str(r#"{"login":"octocat","id":1,"name":null,
    /// #   "avatar_url":"","created_at":"2011-01-25T18:44:36Z","bio":null,"location":null,
    /// #   "company":null,"email":null,"blog":"","public_repos":0,"followers":0,"following":0}"#,)
    /// #   .unwrap();
    /// assert_eq!(user.possessive_label(), "octocat's");
    /// user.login = "james".to_owned();
    /// assert_eq!(user.possessive_label(), "james'");
    /// ```
    pub fn possessive_label(&self,) -> String
    {
        if self.login.ends_with('s',) {
            format!("{}'", self.login)
        } else {
            format!("{}'s", self.login)
        }
    }
}

/// `GET /user` response body.
#[derive(Debug, Clone, Deserialize,)]
pub struct UserPayload
{
    pub login:        String,
    pub id:           u64,
    #[serde(default)]
    pub name:         Option<String,>,
    #[serde(default)]
    pub avatar_url:   String,
    pub created_at:   DateTime<Utc,>,
    #[serde(default)]
    pub bio:          Option<String,>,
    #[serde(default)]
    pub location:     Option<String,>,
    #[serde(default)]
    pub company:      Option<String,>,
    #[serde(default)]
    pub email:        Option<String,>,
    #[serde(default)]
    pub blog:         Option<String,>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers:    u64,
    #[serde(default)]
    pub following:    u64,
}

impl TryFrom<UserPayload,> for User
{
    type Error = Error;

    fn try_from(payload: UserPayload,) -> Result<Self, Self::Error,>
    {
        let user = Self {
            login:        payload.login,
            id:           payload.id,
            name:         payload.name,
            avatar_url:   payload.avatar_url,
            created_at:   payload.created_at,
            bio:          payload.bio,
            location:     payload.location,
            company:      payload.company,
            email:        payload.email,
            blog:         payload.blog.unwrap_or_default(),
            public_repos: payload.public_repos,
            followers:    payload.followers,
            following:    payload.following,
        };
        user.validate()?;
        Ok(user,)
    }
}

/// Repository owned by or accessible to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Repository
{
    pub id:          u64,
    pub name:        String,
    /// `owner/name`.
    pub full_name:   String,
    pub description: Option<String,>,
    pub language:    Option<String,>,
    pub stars:       u64,
    pub forks:       u64,
    pub open_issues: u64,
    /// Size in KiB as reported by GitHub.
    pub size:        u64,
    pub created_at:  DateTime<Utc,>,
    pub updated_at:  DateTime<Utc,>,
    pub private:     bool,
    pub fork:        bool,
    pub archived:    bool,
}

impl Repository
{
    /// Checks the name and the `owner/name` shape of `full_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when either is malformed.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.name.trim().is_empty() {
            return Err(Error::validation("repository name cannot be empty",),);
        }
        match self.full_name.split_once('/',) {
            Some((owner, name,),) if !owner.is_empty() && !name.is_empty() && !name.contains('/',) => {
                Ok((),)
            }
            _ => Err(Error::validation(format!(
                "repository full name '{}' is not owner/name",
                self.full_name
            ),),),
        }
    }
}

/// Element of the `GET /user/repos` response array.
#[derive(Debug, Clone, Deserialize,)]
pub struct RepositoryPayload
{
    pub id:                u64,
    pub name:              String,
    pub full_name:         String,
    #[serde(default)]
    pub description:       Option<String,>,
    #[serde(default)]
    pub language:          Option<String,>,
    #[serde(default)]
    pub stargazers_count:  u64,
    #[serde(default)]
    pub forks_count:       u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub size:              u64,
    pub created_at:        DateTime<Utc,>,
    pub updated_at:        DateTime<Utc,>,
    #[serde(default)]
    pub private:           bool,
    #[serde(default)]
    pub fork:              bool,
    #[serde(default)]
    pub archived:          bool,
}

impl TryFrom<RepositoryPayload,> for Repository
{
    type Error = Error;

    fn try_from(payload: RepositoryPayload,) -> Result<Self, Self::Error,>
    {
        let repository = Self {
            id:          payload.id,
            name:        payload.name,
            full_name:   payload.full_name,
            description: payload.description,
            language:    payload.language,
            stars:       payload.stargazers_count,
            forks:       payload.forks_count,
            open_issues: payload.open_issues_count,
            size:        payload.size,
            created_at:  payload.created_at,
            updated_at:  payload.updated_at,
            private:     payload.private,
            fork:        payload.fork,
            archived:    payload.archived,
        };
        repository.validate()?;
        Ok(repository,)
    }
}

/// Contributions made on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ContributionDay
{
    pub date:  NaiveDate,
    pub count: u32,
}

impl ContributionDay
{
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a date before GitHub existed.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        use chrono::Datelike;

        if self.date.year() < GITHUB_FOUNDING_YEAR {
            return Err(Error::validation(format!("contribution dated {} predates GitHub", self.date),),);
        }
        Ok((),)
    }
}

/// Contribution totals for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct YearlyContributions
{
    pub year:    i32,
    pub total:   u64,
    pub commits: u64,
    pub prs:     u64,
    pub issues:  u64,
}

impl YearlyContributions
{
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a year before [`GITHUB_FOUNDING_YEAR`].
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.year < GITHUB_FOUNDING_YEAR {
            return Err(Error::validation(format!("invalid contribution year {}", self.year),),);
        }
        Ok((),)
    }
}

/// Bytes of code written in one language across the collected repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct LanguageBytes
{
    pub name:  String,
    pub bytes: u64,
}

impl LanguageBytes
{
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty language name.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.name.trim().is_empty() {
            return Err(Error::validation("language name cannot be empty",),);
        }
        Ok((),)
    }
}

/// Traffic counters for one repository over the last 14 days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepositoryViews
{
    pub name:    String,
    pub uniques: u64,
    pub total:   u64,
}

impl RepositoryViews
{
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty repository name.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.name.trim().is_empty() {
            return Err(Error::validation("repository views need a repository name",),);
        }
        Ok((),)
    }

    /// Counters without the repository name.
    pub fn counts(&self,) -> ViewCounts
    {
        ViewCounts {
            total:   self.total,
            uniques: self.uniques,
        }
    }
}

/// `GET /repos/{full_name}/traffic/views` body, also stored per repository
/// in [`crate::Statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,)]
pub struct ViewCounts
{
    #[serde(rename = "count", alias = "total", default)]
    pub total:   u64,
    #[serde(default)]
    pub uniques: u64,
}

/// Run of consecutive days with at least one contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Streak
{
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
    pub days:       u32,
}

impl Streak
{
    /// Builds a streak, checking that `days` matches the date range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `end < start`, `days == 0` or
    /// `days` differs from `end - start + 1`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, days: u32,) -> Result<Self, Error,>
    {
        let streak = Self {
            start_date,
            end_date,
            days,
        };
        streak.validate()?;
        Ok(streak,)
    }

    /// # Errors
    ///
    /// See [`Streak::new`].
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.days == 0 {
            return Err(Error::validation("streak must span at least one day",),);
        }
        if self.end_date < self.start_date {
            return Err(Error::validation("streak end date cannot be before its start date",),);
        }
        let span = (self.end_date - self.start_date).num_days() + 1;
        if span != i64::from(self.days,) {
            return Err(Error::validation(format!(
                "streak from {} to {} spans {span} days, not {}",
                self.start_date, self.end_date, self.days
            ),),);
        }
        Ok((),)
    }

    /// Whether the streak is still running on `today`.
    pub fn is_current(&self, today: NaiveDate,) -> bool
    {
        self.end_date == today
    }

    /// Short range label such as `Jan 1 - Jan 3`.
    pub fn date_range_label(&self,) -> String
    {
        format!("{} - {}", self.start_date.format("%b %-d"), self.end_date.format("%b %-d"))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::test_support::{repository_json, user_json};

    fn date(y: i32, m: u32, d: u32,) -> NaiveDate
    {
        NaiveDate::from_ymd_opt(y, m, d,).unwrap()
    }

    #[test]
    fn user_converts_from_payload()
    {
        let payload: UserPayload =
            serde_json::from_value(user_json("octocat", "2011-01-25T18:44:36Z",),).unwrap();
        let user = User::try_from(payload,).expect("valid user",);

        assert_eq!(user.login, "octocat");
        assert_eq!(user.display_name(), "The Octocat");
        assert_eq!(user.possessive_label(), "octocat's");
        assert_eq!(user.blog, "https://github.blog");
        assert_eq!(user.created_at.to_rfc3339(), "2011-01-25T18:44:36+00:00");
    }

    #[test]
    fn user_null_blog_becomes_empty()
    {
        let mut json = user_json("octocat", "2011-01-25T18:44:36Z",);
        json["blog"] = serde_json::Value::Null;
        json["name"] = serde_json::Value::Null;
        let user = User::try_from(serde_json::from_value::<UserPayload>(json,).unwrap(),).unwrap();
        assert_eq!(user.blog, "");
        assert_eq!(user.display_name(), "octocat");
    }

    #[test]
    fn user_rejects_empty_login_and_zero_id()
    {
        let mut json = user_json("", "2011-01-25T18:44:36Z",);
        assert!(User::try_from(serde_json::from_value::<UserPayload>(json.clone()).unwrap()).is_err());

        json["login"] = "octocat".into();
        json["id"] = 0.into();
        assert!(User::try_from(serde_json::from_value::<UserPayload>(json).unwrap()).is_err());
    }

    #[test]
    fn possessive_label_for_trailing_s()
    {
        let mut json = user_json("james", "2011-01-25T18:44:36Z",);
        json["name"] = serde_json::Value::Null;
        let user = User::try_from(serde_json::from_value::<UserPayload>(json,).unwrap(),).unwrap();
        assert_eq!(user.possessive_label(), "james'");
    }

    #[test]
    fn repository_maps_counters()
    {
        let payload: RepositoryPayload =
            serde_json::from_value(repository_json("octocat", "hello-world", 42,),).unwrap();
        let repository = Repository::try_from(payload,).unwrap();
        assert_eq!(repository.stars, 42);
        assert_eq!(repository.full_name, "octocat/hello-world");
        assert_eq!(repository.forks, 1);
        assert!(!repository.fork);
    }

    #[test]
    fn repository_rejects_malformed_names()
    {
        for (name, full_name,) in [("", "octocat/x",), ("x", "x",), ("x", "/x",), ("x", "a/b/c",),] {
            let mut json = repository_json("octocat", "x", 1,);
            json["name"] = name.into();
            json["full_name"] = full_name.into();
            let payload: RepositoryPayload = serde_json::from_value(json,).unwrap();
            assert!(Repository::try_from(payload).is_err(), "{name} / {full_name} accepted");
        }
    }

    #[test]
    fn yearly_contributions_reject_years_before_github()
    {
        let record = YearlyContributions {
            year:    2007,
            total:   1,
            commits: 1,
            prs:     0,
            issues:  0,
        };
        assert!(record.validate().is_err());
        assert!(YearlyContributions { year: 2008, ..record }.validate().is_ok());
    }

    #[test]
    fn view_counts_read_traffic_payload()
    {
        let counts: ViewCounts =
            serde_json::from_str(r#"{"count": 14, "uniques": 3, "views": []}"#,).unwrap();
        assert_eq!(counts.total, 14);
        assert_eq!(counts.uniques, 3);
    }

    #[test]
    fn streak_checks_day_count()
    {
        let streak = Streak::new(date(2024, 1, 1,), date(2024, 1, 3,), 3,).unwrap();
        assert_eq!(streak.date_range_label(), "Jan 1 - Jan 3");
        assert!(streak.is_current(date(2024, 1, 3)));
        assert!(!streak.is_current(date(2024, 1, 4)));

        assert!(Streak::new(date(2024, 1, 1), date(2024, 1, 3), 2).is_err());
        assert!(Streak::new(date(2024, 1, 3), date(2024, 1, 1), 3).is_err());
        assert!(Streak::new(date(2024, 1, 1), date(2024, 1, 1), 0).is_err());
        assert!(Streak::new(date(2024, 1, 1), date(2024, 1, 1), 1).is_ok());
    }
}
