// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Star counts per repository.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::Repository;

/// Projects repositories onto their stargazer counts.
#[derive(Debug, Clone, Copy, Default,)]
pub struct StarsCalculator;

impl StarsCalculator
{
    /// Maps repository name to stars.
    pub fn calculate(&self, repositories: &[Repository],) -> BTreeMap<String, u64,>
    {
        debug!("collecting stars from {} repositories", repositories.len());
        repositories.iter().map(|repository| (repository.name.clone(), repository.stars,),).collect()
    }
}
