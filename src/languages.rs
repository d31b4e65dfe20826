// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Language shares as percentages of the collected bytes.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::models::LanguageBytes;

/// Turns per-language byte counts into percentages.
#[derive(Debug, Clone, Default,)]
pub struct LanguageCalculator
{
    excluded: HashSet<String,>,
}

impl LanguageCalculator
{
    /// `excluded` is matched against lowercased language names.
    pub fn new<I, S,>(excluded: I,) -> Self
    where
        I: IntoIterator<Item = S,>,
        S: AsRef<str,>,
    {
        Self {
            excluded: excluded.into_iter().map(|name| name.as_ref().to_lowercase(),).collect(),
        }
    }

    /// Each non-excluded language's share of the remaining bytes.
    ///
    /// Returns an empty map when nothing is left to divide. Otherwise the
    /// shares are non-negative and sum to 100.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitstats::{languages::LanguageCalculator, models::LanguageBytes};
    ///
    /// let bytes = [
    ///     LanguageBytes { name: "Rust".into(), bytes: 750, },
    ///     LanguageBytes { name: "HTML".into(), bytes: 9_000, },
    ///     LanguageBytes { name: "Python".into(), bytes: 250, },
    /// ];
    /// let shares = LanguageCalculator::new(["html",],).percentages(&bytes,);
    /// assert_eq!(shares["Rust"], 75.0);
    /// assert!(!shares.contains_key("HTML"));
    /// ```
    pub fn percentages(&self, languages: &[LanguageBytes],) -> BTreeMap<String, f64,>
    {
        let mut kept: BTreeMap<String, u64,> = BTreeMap::new();
        for language in languages {
            if !self.excluded.contains(&language.name.to_lowercase(),) {
                *kept.entry(language.name.clone(),).or_default() += language.bytes;
            }
        }

        let total: u64 = kept.values().sum();
        if total == 0 {
            return BTreeMap::new();
        }

        debug!("calculated percentages for {} languages", kept.len());
        kept.into_iter().map(|(name, bytes,)| (name, bytes as f64 / total as f64 * 100.0,),).collect()
    }
}
