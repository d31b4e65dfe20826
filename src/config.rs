// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Configuration document consumed by the collection pipeline.
//!
//! The types mirror the YAML file accepted by the CLI. Every section carries
//! serde defaults so a minimal document only needs `github.username`; the
//! token is usually supplied through the environment. Values are validated
//! once through [`AppConfig::validate`] before any client is constructed.

use std::{
    collections::HashSet,
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    retry::RetryPolicy,
    session::ClientConfig,
};

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_CACHE_SUBDIR: &str = ".cache";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_TTL_HOURS: u64 = 24;
const DEFAULT_CONCURRENCY: usize = 4;
/// Public REST API root.
pub const GITHUB_REST_API_BASE: &str = "https://api.github.com";
/// Public GraphQL endpoint.
pub const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use gitstats::{AppConfig, Visibility};
///
/// let yaml = r#"
/// github:
///   username: octocat
///   token: ghp_example
///   visibility: public
/// "#;
/// let config: AppConfig = serde_yaml::from_str(yaml,).expect("valid configuration",);
/// assert_eq!(config.github.visibility, Visibility::Public);
/// assert!(config.collection.include_views);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct AppConfig
{
    /// Account and credential settings.
    pub github:     GithubConfig,
    /// Collection options forwarded to the collectors.
    #[serde(default)]
    pub collection: CollectionOptions,
    /// HTTP session tuning.
    #[serde(default)]
    pub client:     ClientSettings,
    /// Cache location and TTL.
    #[serde(default)]
    pub cache:      CacheSettings,
    /// Output location for the statistics summary.
    #[serde(default)]
    pub output:     OutputSettings,
}

/// GitHub account configuration.
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct GithubConfig
{
    /// Login of the account whose statistics are collected.
    #[serde(default)]
    pub username:   String,
    /// Personal access token. Usually provided through `GITHUB_TOKEN`.
    #[serde(default, skip_serializing)]
    pub token:      String,
    /// Repository visibility filter.
    #[serde(default)]
    pub visibility: Visibility,
}

/// Repository visibility filter accepted by `GET /user/repos`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Visibility
{
    /// Public and private repositories.
    #[default]
    All,
    /// Public repositories only.
    Public,
    /// Private repositories only.
    Private,
}

impl Visibility
{
    /// Query parameter value understood by the REST API.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::All => "all",
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.as_str(),)
    }
}

/// Options that shape what the collectors fetch.
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct CollectionOptions
{
    /// Languages skipped when aggregating byte counts (case-insensitive).
    #[serde(default = "default_excluded_languages")]
    pub excluded_languages: Vec<String,>,
    /// Whether traffic views are collected at all.
    #[serde(default = "default_true")]
    pub include_views:      bool,
    /// Optional cap on the number of repositories collected.
    #[serde(default)]
    pub max_repositories:   Option<usize,>,
    /// Upper bound of in-flight per-repository requests.
    #[serde(default = "default_concurrency")]
    pub concurrency:        usize,
}

impl Default for CollectionOptions
{
    fn default() -> Self
    {
        Self {
            excluded_languages: default_excluded_languages(),
            include_views:      true,
            max_repositories:   None,
            concurrency:        DEFAULT_CONCURRENCY,
        }
    }
}

impl CollectionOptions
{
    /// Returns the exclusion list lowercased and deduplicated.
    pub fn excluded_set(&self,) -> HashSet<String,>
    {
        self.excluded_languages
            .iter()
            .map(|language| language.trim().to_lowercase(),)
            .filter(|language| !language.is_empty(),)
            .collect()
    }
}

/// HTTP session tuning.
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct ClientSettings
{
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs:   u64,
    /// Maximum number of retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries:    u32,
    /// Base backoff delay in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// REST API root, overridable for GitHub Enterprise.
    #[serde(default = "default_rest_base_url")]
    pub rest_base_url:  String,
    /// GraphQL endpoint, overridable for GitHub Enterprise.
    #[serde(default = "default_graphql_url")]
    pub graphql_url:    String,
}

impl Default for ClientSettings
{
    fn default() -> Self
    {
        Self {
            timeout_secs:   DEFAULT_TIMEOUT_SECS,
            max_retries:    DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            rest_base_url:  default_rest_base_url(),
            graphql_url:    default_graphql_url(),
        }
    }
}

/// Cache location and TTL.
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct CacheSettings
{
    /// Cache directory. Defaults to `<output>/.cache`.
    #[serde(default)]
    pub directory: Option<PathBuf,>,
    /// Time-to-live of cached entries in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for CacheSettings
{
    fn default() -> Self
    {
        Self {
            directory: None, ttl_hours: DEFAULT_TTL_HOURS,
        }
    }
}

/// Output location for generated files.
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct OutputSettings
{
    /// Root directory for generated files.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputSettings
{
    fn default() -> Self
    {
        Self {
            directory: default_output_dir(),
        }
    }
}

impl AppConfig
{
    /// Builds a configuration for `username` with every other value defaulted.
    pub fn new(username: impl Into<String,>, token: impl Into<String,>,) -> Self
    {
        Self {
            github:     GithubConfig {
                username:   username.into(),
                token:      token.into(),
                visibility: Visibility::default(),
            },
            collection: CollectionOptions::default(),
            client:     ClientSettings::default(),
            cache:      CacheSettings::default(),
            output:     OutputSettings::default(),
        }
    }

    /// Checks the invariants every downstream component relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.github.username.trim().is_empty() {
            return Err(Error::validation("github.username is required",),);
        }
        if self.github.token.trim().is_empty() {
            return Err(Error::validation("github.token is required",),);
        }
        if self.collection.concurrency == 0 {
            return Err(Error::validation("collection.concurrency must be at least 1",),);
        }
        if self.collection.max_repositories == Some(0,) {
            return Err(Error::validation("collection.max_repositories must be at least 1",),);
        }
        if self.client.timeout_secs == 0 {
            return Err(Error::validation("client.timeout_secs must be at least 1",),);
        }
        if self.cache.ttl_hours == 0 {
            return Err(Error::validation("cache.ttl_hours must be at least 1",),);
        }
        Ok((),)
    }

    /// Directory holding cache entries.
    pub fn cache_dir(&self,) -> PathBuf
    {
        self.cache
            .directory
            .clone()
            .unwrap_or_else(|| self.output.directory.join(DEFAULT_CACHE_SUBDIR,),)
    }

    /// TTL applied to cache entries.
    pub fn cache_ttl(&self,) -> Duration
    {
        Duration::from_secs(self.cache.ttl_hours.saturating_mul(3600,),)
    }

    /// Location of the statistics summary for the configured user.
    pub fn summary_path(&self,) -> PathBuf
    {
        self.output
            .directory
            .join("data",)
            .join(format!("{}-stats.json", self.github.username),)
    }

    /// Session configuration derived from the client settings.
    pub fn client_config(&self,) -> ClientConfig
    {
        let retry = RetryPolicy {
            max_retries: self.client.max_retries,
            base_delay: Duration::from_millis(self.client.retry_delay_ms,),
            ..RetryPolicy::default()
        };

        ClientConfig {
            token: self.github.token.clone(),
            timeout: Duration::from_secs(self.client.timeout_secs,),
            retry,
            rest_base_url: self.client.rest_base_url.trim_end_matches('/',).to_owned(),
            graphql_url: self.client.graphql_url.clone(),
            ..ClientConfig::default()
        }
    }
}

/// Loads a configuration document from the provided YAML file path.
///
/// The returned document is not validated yet: callers typically merge CLI
/// and environment overrides first and then call [`AppConfig::validate`].
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when the YAML cannot be decoded.
pub fn load_config(path: &Path,) -> Result<AppConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses a configuration document from a YAML string.
///
/// # Errors
///
/// Propagates [`Error::Parse`] when the YAML cannot be decoded.
pub fn parse_config(contents: &str,) -> Result<AppConfig, Error,>
{
    let mut config: AppConfig = serde_yaml::from_str(contents,)?;
    config.collection.excluded_languages = config
        .collection
        .excluded_languages
        .iter()
        .map(|language| language.trim().to_lowercase(),)
        .collect();
    Ok(config,)
}

fn default_excluded_languages() -> Vec<String,>
{
    vec!["html".to_owned(), "css".to_owned()]
}

fn default_true() -> bool
{
    true
}

fn default_concurrency() -> usize
{
    DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64
{
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32
{
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64
{
    DEFAULT_RETRY_DELAY_MS
}

fn default_rest_base_url() -> String
{
    GITHUB_REST_API_BASE.to_owned()
}

fn default_graphql_url() -> String
{
    GITHUB_GRAPHQL_ENDPOINT.to_owned()
}

fn default_ttl_hours() -> u64
{
    DEFAULT_TTL_HOURS
}

fn default_output_dir() -> PathBuf
{
    PathBuf::from(DEFAULT_OUTPUT_DIR,)
}
