// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rate-limit bookkeeping derived from GitHub response headers.
//!
//! Every response carries `x-ratelimit-remaining` and `x-ratelimit-reset`.
//! [`RateLimitSnapshot`] captures both and [`RateLimitSnapshot::decide`]
//! turns them into an action for the session: continue, wait for the reset,
//! or give up because the reset is too far away.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;

/// Header reporting how many requests remain in the current window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// Header reporting the window reset as a Unix timestamp.
pub const RESET_HEADER: &str = "x-ratelimit-reset";
/// Longest reset horizon the session is willing to sleep through.
pub const MAX_WAIT: Duration = Duration::from_secs(3600,);
/// Slack added on top of the reported reset.
const WAIT_SLACK: Duration = Duration::from_secs(1,);

/// Rate-limit headers observed on a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default,)]
pub struct RateLimitSnapshot
{
    /// Remaining requests; `None` when the header is absent or malformed.
    pub remaining: Option<u64,>,
    /// Reset timestamp in seconds since the epoch.
    pub reset:     Option<u64,>,
}

/// What the session should do after reading a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum RateLimitAction
{
    /// Quota left, nothing to do.
    Proceed,
    /// Quota exhausted; sleep for the given duration before continuing.
    Wait(Duration,),
    /// Quota exhausted and the reset is further away than [`MAX_WAIT`].
    Exhausted
    {
        /// Seconds until the reset.
        wait: Duration,
    },
}

impl RateLimitSnapshot
{
    /// Reads the rate-limit headers from `headers`.
    pub fn from_headers(headers: &HeaderMap,) -> Self
    {
        Self {
            remaining: header_u64(headers, REMAINING_HEADER,),
            reset:     header_u64(headers, RESET_HEADER,),
        }
    }

    /// Whether the snapshot reports an exhausted quota.
    pub fn is_exhausted(&self,) -> bool
    {
        self.remaining == Some(0,)
    }

    /// Decides how to proceed given the current Unix time in seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use gitstats::rate_limit::{RateLimitAction, RateLimitSnapshot};
    ///
    /// let snapshot = RateLimitSnapshot { remaining: Some(0,), reset: Some(1_030,), };
    /// assert_eq!(snapshot.decide(1_000), RateLimitAction::Wait(Duration::from_secs(31)));
    /// ```
    pub fn decide(&self, now_epoch_secs: u64,) -> RateLimitAction
    {
        if !self.is_exhausted() {
            return RateLimitAction::Proceed;
        }

        let wait = Duration::from_secs(self.reset.unwrap_or(0,).saturating_sub(now_epoch_secs,),);
        if wait > MAX_WAIT {
            RateLimitAction::Exhausted {
                wait,
            }
        } else {
            RateLimitAction::Wait(wait + WAIT_SLACK,)
        }
    }
}

/// Current Unix time in whole seconds.
pub fn now_epoch_secs() -> u64
{
    SystemTime::now().duration_since(UNIX_EPOCH,).map(|elapsed| elapsed.as_secs(),).unwrap_or(0,)
}

fn header_u64(headers: &HeaderMap, name: &str,) -> Option<u64,>
{
    headers.get(name,)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests
{
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(remaining: &str, reset: &str,) -> HeaderMap
    {
        let mut map = HeaderMap::new();
        map.insert(REMAINING_HEADER, HeaderValue::from_str(remaining,).unwrap(),);
        map.insert(RESET_HEADER, HeaderValue::from_str(reset,).unwrap(),);
        map
    }

    #[test]
    fn parses_headers()
    {
        let snapshot = RateLimitSnapshot::from_headers(&headers("42", "1700000000",),);
        assert_eq!(snapshot.remaining, Some(42));
        assert_eq!(snapshot.reset, Some(1_700_000_000));
        assert!(!snapshot.is_exhausted());
    }

    #[test]
    fn missing_or_malformed_headers_mean_no_limit()
    {
        let snapshot = RateLimitSnapshot::from_headers(&HeaderMap::new(),);
        assert_eq!(snapshot, RateLimitSnapshot::default());
        assert_eq!(snapshot.decide(0), RateLimitAction::Proceed);

        let malformed = RateLimitSnapshot::from_headers(&headers("many", "soon",),);
        assert_eq!(malformed.decide(0), RateLimitAction::Proceed);
    }

    #[test]
    fn remaining_quota_proceeds()
    {
        let snapshot = RateLimitSnapshot {
            remaining: Some(1,),
            reset:     Some(2_000,),
        };
        assert_eq!(snapshot.decide(1_000), RateLimitAction::Proceed);
    }

    #[test]
    fn exhausted_quota_waits_for_reset_plus_one_second()
    {
        let snapshot = RateLimitSnapshot {
            remaining: Some(0,),
            reset:     Some(1_030,),
        };
        assert_eq!(snapshot.decide(1_000), RateLimitAction::Wait(Duration::from_secs(31)));
    }

    #[test]
    fn reset_in_the_past_waits_only_the_slack()
    {
        let snapshot = RateLimitSnapshot {
            remaining: Some(0,),
            reset:     Some(500,),
        };
        assert_eq!(snapshot.decide(1_000), RateLimitAction::Wait(Duration::from_secs(1)));
    }

    #[test]
    fn reset_exactly_one_hour_away_still_waits()
    {
        let snapshot = RateLimitSnapshot {
            remaining: Some(0,),
            reset:     Some(4_600,),
        };
        assert_eq!(snapshot.decide(1_000), RateLimitAction::Wait(Duration::from_secs(3601)));
    }

    #[test]
    fn reset_beyond_one_hour_is_exhausted()
    {
        let snapshot = RateLimitSnapshot {
            remaining: Some(0,),
            reset:     Some(8_200,),
        };
        assert_eq!(
            snapshot.decide(1_000),
            RateLimitAction::Exhausted {
                wait: Duration::from_secs(7200),
            }
        );
    }
}
