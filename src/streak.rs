// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Contribution streak detection.
//!
//! A run is a maximal sequence of calendar-consecutive days with at least one
//! contribution. Runs longer than one day are always recorded. A single-day
//! run is recorded only when it is the final run and falls on `today`, so a
//! streak that started today is reported as current.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{ContributionDay, Streak};

/// Derives streaks from daily contributions relative to a fixed `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct StreakCalculator
{
    today: NaiveDate,
}

impl StreakCalculator
{
    pub fn new(today: NaiveDate,) -> Self
    {
        Self {
            today,
        }
    }

    /// Every recorded streak in chronological order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use gitstats::{models::ContributionDay, streak::StreakCalculator};
    ///
    /// let day = |d| ContributionDay { date: NaiveDate::from_ymd_opt(2024, 1, d,).unwrap(), count: 1, };
    /// let calculator = StreakCalculator::new(NaiveDate::from_ymd_opt(2024, 1, 5,).unwrap(),);
    /// let streaks = calculator.all(&[day(1,), day(2,), day(3,), day(5,),],);
    /// assert_eq!(streaks.iter().map(|s| s.days,).collect::<Vec<_,>>(), [3, 1]);
    /// ```
    pub fn all(&self, days: &[ContributionDay],) -> Vec<Streak,>
    {
        let runs = runs(days,);
        let mut streaks: Vec<Streak,> = runs.iter().filter(|run| run.days > 1,).copied().collect();

        if let Some(last,) = runs.last() {
            if last.days == 1 && last.end_date == self.today {
                streaks.push(*last,);
            }
        }

        debug!("found {} streaks", streaks.len());
        streaks
    }

    /// The recorded streak that ends today, if any.
    pub fn current(&self, days: &[ContributionDay],) -> Option<Streak,>
    {
        self.all(days,).into_iter().find(|streak| streak.is_current(self.today,),)
    }

    /// The longest recorded streak; the earliest wins ties.
    pub fn longest(&self, days: &[ContributionDay],) -> Option<Streak,>
    {
        self.all(days,).into_iter().fold(None, |best: Option<Streak,>, streak| match best {
            Some(best,) if best.days >= streak.days => Some(best,),
            _ => Some(streak,),
        },)
    }
}

/// Groups positive days into maximal runs of consecutive dates.
///
/// Days are sorted first; a repeated date neither extends nor breaks a run.
fn runs(days: &[ContributionDay],) -> Vec<Streak,>
{
    let mut dates: Vec<NaiveDate,> = days.iter().filter(|day| day.count > 0,).map(|day| day.date,).collect();
    dates.sort_unstable();
    dates.dedup();

    let mut runs: Vec<Streak,> = Vec::new();
    for date in dates {
        match runs.last_mut() {
            Some(run,) if run.end_date.succ_opt() == Some(date,) => {
                run.end_date = date;
                run.days += 1;
            }
            _ => runs.push(Streak {
                start_date: date,
                end_date:   date,
                days:       1,
            },),
        }
    }
    runs
}

#[cfg(test)]
mod tests
{
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    fn date(month: u32, day: u32,) -> NaiveDate
    {
        NaiveDate::from_ymd_opt(2024, month, day,).unwrap()
    }

    fn active(month: u32, day: u32,) -> ContributionDay
    {
        ContributionDay {
            date:  date(month, day,),
            count: 1,
        }
    }

    #[test]
    fn empty_input_has_no_streaks()
    {
        let calculator = StreakCalculator::new(date(1, 5,),);
        assert!(calculator.all(&[]).is_empty());
        assert_eq!(calculator.current(&[]), None);
        assert_eq!(calculator.longest(&[]), None);
    }

    #[test]
    fn multi_day_run_and_today_single_day()
    {
        let days = [active(1, 1,), active(1, 2,), active(1, 3,), active(1, 5,),];
        let calculator = StreakCalculator::new(date(1, 5,),);

        let longest = calculator.longest(&days,).unwrap();
        assert_eq!((longest.start_date, longest.end_date, longest.days), (date(1, 1), date(1, 3), 3));

        let current = calculator.current(&days,).unwrap();
        assert_eq!((current.start_date, current.end_date, current.days), (date(1, 5), date(1, 5), 1));
    }

    #[test]
    fn single_past_day_is_not_a_streak()
    {
        let days = [active(1, 4,),];
        assert!(StreakCalculator::new(date(1, 5)).all(&days).is_empty());
        assert_eq!(StreakCalculator::new(date(1, 5)).longest(&days), None);

        let today = StreakCalculator::new(date(1, 4,),);
        assert_eq!(today.current(&days).map(|streak| streak.days), Some(1));
        assert_eq!(today.longest(&days).map(|streak| streak.days), Some(1));
    }

    #[test]
    fn isolated_days_in_the_middle_are_skipped()
    {
        let days = [active(1, 1,), active(1, 3,), active(1, 4,), active(1, 6,),];
        let streaks = StreakCalculator::new(date(2, 1,),).all(&days,);
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].start_date, date(1, 3));
    }

    #[test]
    fn run_ending_yesterday_is_recorded_but_not_current()
    {
        let days = [active(1, 3,), active(1, 4,),];
        let calculator = StreakCalculator::new(date(1, 5,),);
        assert_eq!(calculator.all(&days).len(), 1);
        assert_eq!(calculator.current(&days), None);
    }

    #[test]
    fn unsorted_duplicate_and_idle_days_are_normalized()
    {
        let days = [
            active(1, 3,),
            active(1, 1,),
            active(1, 2,),
            active(1, 2,),
            ContributionDay {
                date:  date(1, 4,),
                count: 0,
            },
            active(1, 5,),
            active(1, 6,),
        ];
        let streaks = StreakCalculator::new(date(3, 1,),).all(&days,);
        let lengths: Vec<u32,> = streaks.iter().map(|streak| streak.days,).collect();
        assert_eq!(lengths, [3, 2]);
    }

    #[test]
    fn longest_prefers_the_earliest_on_ties()
    {
        let days = [active(1, 1,), active(1, 2,), active(1, 10,), active(1, 11,),];
        let longest = StreakCalculator::new(date(3, 1,),).longest(&days,).unwrap();
        assert_eq!(longest.start_date, date(1, 1));
    }

    #[test]
    fn streaks_cross_year_boundaries()
    {
        let days = [
            ContributionDay {
                date:  NaiveDate::from_ymd_opt(2023, 12, 31,).unwrap(),
                count: 2,
            },
            active(1, 1,),
        ];
        let longest = StreakCalculator::new(date(1, 1,),).longest(&days,).unwrap();
        assert_eq!(longest.days, 2);
        assert!(longest.validate().is_ok());
    }

    fn true_max_run(dates: &BTreeSet<NaiveDate,>,) -> u32
    {
        let mut best = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate,> = None;
        for date in dates {
            run = match previous {
                Some(previous,) if previous.succ_opt() == Some(*date,) => run + 1,
                _ => 1,
            };
            best = best.max(run,);
            previous = Some(*date,);
        }
        best
    }

    proptest! {
        #[test]
        fn longest_matches_true_maximum_run(
            entries in proptest::collection::vec((0u32..120, 0u32..4), 0..80),
            today_offset in 0u32..150,
        ) {
            let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
            let days: Vec<ContributionDay> = entries
                .iter()
                .map(|(offset, count)| ContributionDay {
                    date: base + chrono::Days::new(u64::from(*offset)),
                    count: *count,
                })
                .collect();
            let today = base + chrono::Days::new(u64::from(today_offset));
            let positive: BTreeSet<NaiveDate> =
                days.iter().filter(|day| day.count > 0).map(|day| day.date).collect();
            let expected = true_max_run(&positive);

            let calculator = StreakCalculator::new(today);
            let longest = calculator.longest(&days);

            if expected > 1 {
                prop_assert_eq!(longest.map(|streak| streak.days), Some(expected));
            } else if positive.last() == Some(&today) {
                prop_assert_eq!(longest.map(|streak| streak.days), Some(1));
            } else {
                prop_assert_eq!(longest, None);
            }

            for streak in calculator.all(&days) {
                prop_assert!(streak.validate().is_ok());
            }
        }
    }
}
