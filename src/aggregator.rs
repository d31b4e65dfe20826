// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Builds [`Statistics`] from a collected payload.

use chrono::NaiveDate;
use tracing::info;

use crate::{
    languages::LanguageCalculator, orchestrator::StatisticsPayload, stars::StarsCalculator,
    statistics::Statistics, streak::StreakCalculator,
};

/// Runs the streak, stars and language calculators over a payload.
#[derive(Debug, Clone,)]
pub struct StatisticsAggregator
{
    streaks:   StreakCalculator,
    stars:     StarsCalculator,
    languages: LanguageCalculator,
}

impl StatisticsAggregator
{
    /// `today` anchors streaks; `excluded` languages are left out of the
    /// percentages.
    pub fn new<I, S,>(today: NaiveDate, excluded: I,) -> Self
    where
        I: IntoIterator<Item = S,>,
        S: AsRef<str,>,
    {
        Self {
            streaks:   StreakCalculator::new(today,),
            stars:     StarsCalculator,
            languages: LanguageCalculator::new(excluded,),
        }
    }

    pub fn aggregate(&self, payload: &StatisticsPayload,) -> Statistics
    {
        info!("aggregating statistics for {}", payload.user.login);

        let statistics = Statistics {
            user:                 payload.user.clone(),
            repositories:         payload.repositories.clone(),
            yearly_contributions: payload.yearly_contributions.clone(),
            daily_contributions:  payload.daily_contributions.clone(),
            current_streak:       self.streaks.current(&payload.daily_contributions,),
            longest_streak:       self.streaks.longest(&payload.daily_contributions,),
            languages:            self.languages.percentages(&payload.languages,),
            repository_stars:     self.stars.calculate(&payload.repositories,),
            repository_views:     payload
                .repository_views
                .iter()
                .map(|views| (views.name.clone(), views.counts(),),)
                .collect(),
        };

        info!(
            "aggregated {} contributions across {} repositories",
            statistics.total_contributions(),
            statistics.repository_count()
        );
        statistics
    }
}
