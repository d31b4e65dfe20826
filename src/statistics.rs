// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Aggregate root handed to renderers.
//!
//! [`Statistics`] stores only what was collected or calculated; every total
//! and ranking is derived on demand so it can never drift from the records.

use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::models::{ContributionDay, Repository, Streak, User, ViewCounts, YearlyContributions};

/// Everything a stats card needs about one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct Statistics
{
    pub user:                 User,
    pub repositories:         Vec<Repository,>,
    pub yearly_contributions: BTreeMap<i32, YearlyContributions,>,
    pub daily_contributions:  Vec<ContributionDay,>,
    pub current_streak:       Option<Streak,>,
    pub longest_streak:       Option<Streak,>,
    /// Language name to share of bytes, in percent.
    pub languages:            BTreeMap<String, f64,>,
    /// Repository name to stargazers.
    pub repository_stars:     BTreeMap<String, u64,>,
    /// Repository name to traffic counters.
    pub repository_views:     BTreeMap<String, ViewCounts,>,
}

impl Statistics
{
    pub fn total_commits(&self,) -> u64
    {
        self.yearly_contributions.values().map(|year| year.commits,).sum()
    }

    pub fn total_prs(&self,) -> u64
    {
        self.yearly_contributions.values().map(|year| year.prs,).sum()
    }

    pub fn total_issues(&self,) -> u64
    {
        self.yearly_contributions.values().map(|year| year.issues,).sum()
    }

    pub fn total_contributions(&self,) -> u64
    {
        self.yearly_contributions.values().map(|year| year.total,).sum()
    }

    pub fn total_stars(&self,) -> u64
    {
        self.repository_stars.values().sum()
    }

    pub fn total_views(&self,) -> u64
    {
        self.repository_views.values().map(|views| views.total,).sum()
    }

    pub fn repository_count(&self,) -> usize
    {
        self.repositories.len()
    }

    /// The `n` largest language shares, largest first, ties by name.
    pub fn top_languages(&self, n: usize,) -> Vec<(&str, f64,),>
    {
        let mut languages: Vec<(&str, f64,),> =
            self.languages.iter().map(|(name, share,)| (name.as_str(), *share,),).collect();
        languages.sort_by(|a, b| b.1.partial_cmp(&a.1,).unwrap_or(Ordering::Equal,).then_with(|| a.0.cmp(b.0,),),);
        languages.truncate(n,);
        languages
    }

    /// The `n` most viewed repositories, ties by name.
    pub fn top_repositories_by_views(&self, n: usize,) -> Vec<(&str, ViewCounts,),>
    {
        let mut views: Vec<(&str, ViewCounts,),> =
            self.repository_views.iter().map(|(name, counts,)| (name.as_str(), *counts,),).collect();
        views.sort_by(|a, b| b.1.total.cmp(&a.1.total,).then_with(|| a.0.cmp(b.0,),),);
        views.truncate(n,);
        views
    }

    /// The `n` most starred repositories, ties by name.
    pub fn top_repositories_by_stars(&self, n: usize,) -> Vec<(&str, u64,),>
    {
        let mut stars: Vec<(&str, u64,),> =
            self.repository_stars.iter().map(|(name, stars,)| (name.as_str(), *stars,),).collect();
        stars.sort_by(|a, b| b.1.cmp(&a.1,).then_with(|| a.0.cmp(b.0,),),);
        stars.truncate(n,);
        stars
    }
}
